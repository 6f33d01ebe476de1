//! Turn each raw episode source into candidate segments.
//!
//! The three parsers are independent; the merger reconciles their outputs.

pub mod lyrics;
pub mod show_notes;
pub mod summary;

pub use lyrics::{parse_lyrics, split_lyric_chunks};
pub use show_notes::{ShowNotesBlock, ShowNotesElement, parse_show_notes};
pub use summary::parse_summary_text;
