use std::error::Error as StdError;

use thiserror::Error;

use crate::segments::SegmentKind;

/// Showscribe's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Showscribe's crate-wide error type.
///
/// Recoverable data-quality problems (unclassifiable text, unresolved boundaries) never show
/// up here; they are logged and the pipeline keeps going. Everything in this enum aborts the
/// current episode.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    /// A lyric chunk matched a variant that cannot be built from lyrics.
    #[error("lyrics chunk matched {kind} but {kind} cannot be parsed from lyrics: {text:?}")]
    CapabilityMismatch { kind: SegmentKind, text: String },

    /// The show notes no longer have the structure we rely on.
    #[error("show notes are missing expected structure: {0}")]
    MissingStructure(String),

    #[error("failed to extract {what} from: {text:?}")]
    StringMatch { what: &'static str, text: String },

    #[error("cannot align segments against an empty transcript")]
    EmptyTranscript,

    #[error("oracle request failed: {0}")]
    Oracle(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub(crate) fn string_match(what: &'static str, text: impl Into<String>) -> Self {
        Self::StringMatch {
            what,
            text: text.into(),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

#[cfg(feature = "llm")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Oracle(err.to_string())
    }
}
