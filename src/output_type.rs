/// The supported output formats for aligned segments.
///
/// Each variant maps to a concrete `SegmentEncoder` implementation. With the `cli`
/// feature the enum doubles as a `clap` value for `--output-type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputType {
    /// One JSON array of segment records.
    #[default]
    Json,

    /// One WebVTT cue per timed segment.
    Vtt,

    /// A readable transcript grouped by segment and speaker.
    Text,
}
