use std::path::PathBuf;

use crate::output_type::OutputType;

/// Default length of the transcript window searched for each boundary: 30 minutes.
pub const DEFAULT_WINDOW_SECONDS: f64 = 30.0 * 60.0;

/// Default number of leading window chunks hidden from the boundary search.
pub const DEFAULT_WINDOW_SKIP_CHUNKS: usize = 2;

/// Options that control how an episode is segmented.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI maps user input into this type so other frontends (tests, batch jobs) can
/// construct options programmatically.
#[derive(Debug, Clone)]
pub struct Opts {
    /// How far past the previous segment's start to look for the next transition.
    pub window_seconds: f64,

    /// Chunks skipped at the head of each window.
    ///
    /// The previous segment's own introduction usually sits there and would otherwise
    /// match the next segment's keywords.
    pub window_skip_chunks: usize,

    /// The desired output format for aligned segments.
    pub output_type: OutputType,

    /// Episode number; partitions the oracle answer cache.
    pub episode_number: u32,

    /// Where oracle answers are cached between runs. `None` keeps them in memory only.
    pub cache_dir: Option<PathBuf>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            window_seconds: DEFAULT_WINDOW_SECONDS,
            window_skip_chunks: DEFAULT_WINDOW_SKIP_CHUNKS,
            output_type: OutputType::Json,
            episode_number: 0,
            cache_dir: None,
        }
    }
}
