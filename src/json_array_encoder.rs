use std::io::Write;

use serde::Serialize;

use crate::Result;
use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;

/// A `SegmentEncoder` that writes segments as a single JSON array.
///
/// Output is streamed to the writer as segments arrive. Each element is the segment's
/// `type` tag, its variant fields, its times and transcript, plus a derived `duration` in
/// minutes. Unresolved end times are written as `null`.
///
/// Example output:
/// ```json
/// [
///   { "type": "intro", "start_time": 0.0, "end_time": 30.0, "transcript": [...], "duration": 0.5 },
///   { "type": "quote", "quote": "...", "attribution": "...", "start_time": 30.0, ... }
/// ]
/// ```
pub struct JsonArrayEncoder<W: Write> {
    w: W,

    /// Whether we have written the opening `[` of the JSON array.
    started: bool,

    /// Whether the next element is the first one (no leading comma).
    first: bool,

    closed: bool,
}

#[derive(Serialize)]
struct SegmentRecord<'a> {
    #[serde(flatten)]
    segment: &'a Segment,
    duration: f64,
}

impl<W: Write> JsonArrayEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            started: false,
            first: true,
            closed: false,
        }
    }

    /// Open the array lazily so an empty run still yields `[]`.
    fn start_if_needed(&mut self) -> Result<()> {
        if !self.started {
            self.w.write_all(b"[")?;
            self.started = true;
        }
        Ok(())
    }
}

impl<W: Write> SegmentEncoder for JsonArrayEncoder<W> {
    fn write_segment(&mut self, seg: &Segment) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg("cannot write segment: encoder is already closed"));
        }

        self.start_if_needed()?;

        if !self.first {
            self.w.write_all(b",")?;
        }
        self.first = false;

        let record = SegmentRecord {
            segment: seg,
            duration: seg.duration(),
        };
        serde_json::to_writer(&mut self.w, &record)?;
        self.w.flush()?;

        Ok(())
    }

    /// Finalize the JSON array. Idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.start_if_needed()?;
        self.w.write_all(b"]")?;
        self.w.flush()?;

        self.closed = true;
        Ok(())
    }
}
