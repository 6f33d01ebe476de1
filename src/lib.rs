//! `showscribe`: split a podcast episode into timed, transcribed segments.
//!
//! This crate provides:
//! - A closed taxonomy of segment variants and parsers for the episode's lyrics outline,
//!   show-notes page and RSS summary
//! - A merger that reconciles the three sources into one narrative order
//! - A fuser that attributes transcription text to diarized speakers
//! - An aligner that times every segment, falling back to a language-model oracle
//! - Pluggable output encoders (JSON, VTT, plain text)
//!
//! Most consumers should start with [`Segmenter`].

// High-level API (most consumers should start here).
pub mod opts;
pub mod pipeline;

// Errors shared across the crate.
pub mod error;

// Segment data structures and their source parsers.
pub mod parsers;
pub mod segments;

// Pipeline stages.
pub mod aligner;
pub mod fuser;
pub mod merger;
pub mod oracle;
pub mod transcript;

// Output selection and encoder interfaces.
pub mod output_type;
pub mod segment_encoder;

// Output encoders that serialize segments into various formats.
pub mod json_array_encoder;
pub mod text_encoder;
pub mod vtt_encoder;

// Logging configuration for binaries.
#[cfg(feature = "logging")]
pub mod logging;

mod text;

pub use error::{Error, Result};
pub use opts::Opts;
pub use output_type::OutputType;
pub use pipeline::{EpisodeSources, Segmenter};
pub use segments::{Segment, SegmentData, SegmentKind};
