use std::io::Write;

use crate::Result;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;
use crate::transcript::TranscriptChunk;

/// A `SegmentEncoder` that writes a human-readable transcript.
///
/// Each segment becomes a heading line with its time range, followed by one paragraph per
/// speaker turn:
///
/// ```text
/// ## Intro [00:00 - 01:30]
///
/// Steve: Hello and welcome.
///
/// Bob: Hi everyone.
/// ```
pub struct TextEncoder<W: Write> {
    w: W,
    first: bool,
    closed: bool,
}

impl<W: Write> TextEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            first: true,
            closed: false,
        }
    }
}

impl<W: Write> SegmentEncoder for TextEncoder<W> {
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg("cannot write segment: encoder is already closed"));
        }

        if !self.first {
            writeln!(&mut self.w)?;
        }
        self.first = false;

        let end = seg.has_resolved_end().then_some(seg.end_time);
        writeln!(
            &mut self.w,
            "## {} [{} - {}]",
            seg.title(),
            format_time(seg.start_time),
            format_time(end)
        )?;

        for turn in join_speaker_turns(&seg.transcript) {
            writeln!(&mut self.w)?;
            writeln!(&mut self.w, "{}: {}", turn.speaker, turn.text)?;
        }

        self.w.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;
        Ok(())
    }
}

/// Format seconds as `h:mm:ss`, or `mm:ss` under an hour. `???` when unknown.
pub fn format_time(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|s| s.is_finite()) else {
        return "???".to_string();
    };

    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = total / 60 % 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

/// Trim chunk text and merge consecutive chunks from the same speaker.
pub fn join_speaker_turns(transcript: &[TranscriptChunk]) -> Vec<TranscriptChunk> {
    let mut turns: Vec<TranscriptChunk> = Vec::new();

    for chunk in transcript {
        let text = chunk.text.trim();
        match turns.last_mut() {
            Some(turn) if turn.speaker == chunk.speaker => {
                if !text.is_empty() {
                    if !turn.text.is_empty() {
                        turn.text.push(' ');
                    }
                    turn.text.push_str(text);
                }
                turn.end = chunk.end;
            }
            _ => turns.push(TranscriptChunk {
                text: text.to_string(),
                ..chunk.clone()
            }),
        }
    }

    turns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::{IntroSegment, QuoteSegment};
    use crate::transcript::chunk;

    #[test]
    fn format_time_switches_to_hours() {
        assert_eq!(format_time(None), "???");
        assert_eq!(format_time(Some(f64::INFINITY)), "???");
        assert_eq!(format_time(Some(0.0)), "00:00");
        assert_eq!(format_time(Some(65.9)), "01:05");
        assert_eq!(format_time(Some(3725.0)), "1:02:05");
    }

    #[test]
    fn consecutive_speaker_chunks_are_joined() {
        let transcript = [
            chunk(0.0, 1.0, "Steve", " Hello "),
            chunk(1.0, 2.0, "Steve", "and welcome."),
            chunk(2.0, 3.0, "Bob", "Hi."),
            chunk(3.0, 4.0, "Steve", "Let's begin."),
        ];
        let turns = join_speaker_turns(&transcript);

        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].text, "Hello and welcome.");
        assert_eq!(turns[0].end, 2.0);
        assert_eq!(turns[2].speaker, "Steve");
    }

    #[test]
    fn text_output_has_heading_and_turns() -> anyhow::Result<()> {
        let mut intro = Segment::new(IntroSegment);
        intro.start_time = Some(0.0);
        intro.end_time = 90.0;
        intro.transcript = vec![
            chunk(0.0, 45.0, "Steve", "Hello"),
            chunk(45.0, 90.0, "Bob", "Hi"),
        ];
        let quote = Segment::new(QuoteSegment {
            quote: "q".to_string(),
            attribution: "a".to_string(),
        });

        let mut out = Vec::new();
        let mut enc = TextEncoder::new(&mut out);
        enc.write_segment(&intro)?;
        enc.write_segment(&quote)?;
        enc.close()?;

        assert_eq!(
            std::str::from_utf8(&out)?,
            "## Intro [00:00 - 01:30]\n\nSteve: Hello\n\nBob: Hi\n\n## Skeptical Quote of the Week [??? - ???]\n"
        );
        Ok(())
    }
}
