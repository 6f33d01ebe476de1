use crate::Result;
use crate::segments::Segment;

/// A streaming sink for aligned segments.
///
/// Callers write segments in episode order and call `close` exactly once at the end;
/// `close` must be idempotent.
pub trait SegmentEncoder {
    fn write_segment(&mut self, seg: &Segment) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
