//! Timed text as it flows through the pipeline.
//!
//! The transcription and diarization backends are external; these types are the contract we
//! expect their outputs to satisfy once deserialized.

use serde::{Deserialize, Serialize};

/// One entry of the raw speech-recognition output. No speaker attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionEntry {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// One interval of the diarization output.
///
/// Intervals may overlap each other and need not line up with transcription boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiarizationInterval {
    pub start: f64,
    pub end: f64,
    pub speaker: String,
}

/// A piece of the fused transcript: timed text attributed to a speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptChunk {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub speaker: String,
}

/// Time-ordered, non-overlapping chunks produced by [`crate::fuser::fuse`].
pub type DiarizedTranscript = Vec<TranscriptChunk>;

/// Chunks whose own start falls inside `[start, end)`.
pub fn between_times(transcript: &[TranscriptChunk], start: f64, end: f64) -> DiarizedTranscript {
    transcript
        .iter()
        .filter(|c| start <= c.start && c.start < end)
        .cloned()
        .collect()
}

/// Like [`between_times`] but drops the first `skip` chunks of the result.
pub fn window(transcript: &[TranscriptChunk], skip: usize, start: f64, end: f64) -> DiarizedTranscript {
    transcript
        .iter()
        .filter(|c| start <= c.start && c.start < end)
        .skip(skip)
        .cloned()
        .collect()
}

#[cfg(test)]
pub(crate) fn chunk(start: f64, end: f64, speaker: &str, text: &str) -> TranscriptChunk {
    TranscriptChunk {
        start,
        end,
        text: text.to_string(),
        speaker: speaker.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript() -> DiarizedTranscript {
        vec![
            chunk(0.0, 5.0, "Steve", "a"),
            chunk(5.0, 10.0, "Bob", "b"),
            chunk(10.0, 15.0, "Cara", "c"),
            chunk(15.0, 20.0, "Jay", "d"),
        ]
    }

    #[test]
    fn between_times_is_half_open() {
        let got = between_times(&transcript(), 5.0, 15.0);
        let texts: Vec<_> = got.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["b", "c"]);
    }

    #[test]
    fn window_skips_leading_chunks() {
        let got = window(&transcript(), 2, 0.0, 100.0);
        let texts: Vec<_> = got.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["c", "d"]);
    }

    #[test]
    fn window_skip_larger_than_range_is_empty() {
        assert!(window(&transcript(), 2, 0.0, 6.0).is_empty());
    }

    #[test]
    fn chunks_round_trip_through_json() -> anyhow::Result<()> {
        let json = r#"[{"start":1.5,"end":2.0,"text":"hi","speaker":"Evan"}]"#;
        let parsed: DiarizedTranscript = serde_json::from_str(json)?;
        assert_eq!(parsed, vec![chunk(1.5, 2.0, "Evan", "hi")]);
        Ok(())
    }
}
