use std::collections::HashMap;
use std::io::Write;

use crate::Result;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;

/// A `SegmentEncoder` that writes one WebVTT cue per timed segment.
///
/// The cue identifier is the segment's anchor tag (suffixed with a counter when a kind
/// repeats, e.g. `news_item-2`); the payload is the segment transcript as voice-tagged
/// lines. Segments without a start or with an unresolved end are skipped.
pub struct VttEncoder<W: Write> {
    w: W,

    /// Whether we've written the `WEBVTT` header.
    started: bool,

    closed: bool,

    /// Cues written so far per anchor.
    anchors: HashMap<&'static str, usize>,
}

impl<W: Write> VttEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            closed: false,
            anchors: HashMap::new(),
        }
    }

    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            // WebVTT files begin with a mandatory header line followed by a blank line.
            self.w.write_all(b"WEBVTT\n\n")?;
            self.started = true;
        }
        Ok(())
    }

    fn cue_id(&mut self, anchor: &'static str) -> String {
        let seen = self.anchors.entry(anchor).or_insert(0);
        *seen += 1;
        match *seen {
            1 => anchor.to_string(),
            n => format!("{anchor}-{n}"),
        }
    }
}

impl<W: Write> SegmentEncoder for VttEncoder<W> {
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg("cannot write segment: encoder is already closed"));
        }

        let Some(start) = seg.start_time else {
            return Ok(());
        };
        if !seg.has_resolved_end() {
            return Ok(());
        }

        self.start_if_needed()?;

        let id = self.cue_id(seg.kind().anchor());
        writeln!(&mut self.w, "{id}")?;
        writeln!(
            &mut self.w,
            "{} --> {}",
            format_timestamp_vtt(start),
            format_timestamp_vtt(seg.end_time)
        )?;

        if seg.transcript.is_empty() {
            writeln!(&mut self.w, "{}", seg.title())?;
        }
        for chunk in &seg.transcript {
            writeln!(&mut self.w, "<v {}>{}", chunk.speaker, chunk.text.trim())?;
        }

        // Blank line separates cues.
        writeln!(&mut self.w)?;
        self.w.flush()?;

        Ok(())
    }

    /// Flush the underlying writer. Idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}

/// Format seconds into a WebVTT timestamp (`HH:MM:SS.mmm`), rounded to the millisecond.
fn format_timestamp_vtt(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;

    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;

    let s = total_s % 60;
    let total_m = total_s / 60;

    let m = total_m % 60;
    let h = total_m / 60;

    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::{IntroSegment, NewsItem, OutroSegment};
    use crate::transcript::chunk;

    fn news(n: u32, start: f64, end: f64) -> Segment {
        let mut seg = Segment::new(NewsItem {
            item_number: n,
            topic: format!("Story {n}"),
            url: None,
        });
        seg.start_time = Some(start);
        seg.end_time = end;
        seg
    }

    #[test]
    fn vtt_close_without_segments_emits_nothing() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "");
        Ok(())
    }

    #[test]
    fn vtt_writes_voice_tagged_cues() -> anyhow::Result<()> {
        let mut intro = Segment::new(IntroSegment);
        intro.start_time = Some(0.0);
        intro.end_time = 61.2;
        intro.transcript = vec![
            chunk(0.0, 30.0, "Steve", " Hello and welcome "),
            chunk(30.0, 61.2, "Bob", "hi"),
        ];

        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.write_segment(&intro)?;
        enc.close()?;

        let s = std::str::from_utf8(&out)?;
        assert_eq!(
            s,
            "WEBVTT\n\nintro\n00:00:00.000 --> 00:01:01.200\n<v Steve>Hello and welcome\n<v Bob>hi\n\n"
        );
        Ok(())
    }

    #[test]
    fn vtt_repeated_kinds_get_unique_ids() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.write_segment(&news(1, 0.0, 10.0))?;
        enc.write_segment(&news(2, 10.0, 20.0))?;
        enc.close()?;

        let s = std::str::from_utf8(&out)?;
        assert!(s.contains("news_item\n00:00:00.000 --> 00:00:10.000\nStory 1\n\n"));
        assert!(s.contains("news_item-2\n00:00:10.000 --> 00:00:20.000\nStory 2\n\n"));
        Ok(())
    }

    #[test]
    fn vtt_skips_untimed_segments() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.write_segment(&Segment::new(OutroSegment))?;
        enc.close()?;
        assert_eq!(std::str::from_utf8(&out)?, "");
        Ok(())
    }

    #[test]
    fn vtt_format_timestamp_rounds_to_nearest_millisecond() {
        assert_eq!(format_timestamp_vtt(0.0004), "00:00:00.000");
        assert_eq!(format_timestamp_vtt(0.0005), "00:00:00.001");
        assert_eq!(format_timestamp_vtt(1.9995), "00:00:02.000");
        assert_eq!(format_timestamp_vtt(3725.5), "01:02:05.500");
    }

    #[test]
    fn vtt_write_after_close_errors() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = VttEncoder::new(&mut out);
        enc.close()?;
        let err = enc.write_segment(&news(1, 0.0, 1.0)).unwrap_err();
        assert!(err.to_string().contains("already closed"));
        Ok(())
    }
}
