//! Fuse a speaker-less transcription with a text-less diarization.
//!
//! Each transcription entry is attributed to the speaker that talks the most during it,
//! measured as summed overlap across every diarization interval for that speaker.

use tracing::debug;

use crate::transcript::{DiarizationInterval, DiarizedTranscript, TranscriptChunk, TranscriptionEntry};

/// Speaker assigned when no diarization interval overlaps a transcription entry.
pub const UNKNOWN_SPEAKER: &str = "UNKNOWN";

/// Label given to the anonymous cold-open narration track.
pub const VOICE_OVER_SPEAKER: &str = "Voice-over";

/// Marker of the diarization backend's auto-generated speaker ids (`SPEAKER_00`, ...).
const GENERATED_SPEAKER_MARKER: &str = "SPEAKER_";

/// Merge `transcription` and `diarization` into one diarized transcript.
///
/// Entries with empty text are dropped. The output keeps transcription order.
pub fn fuse(transcription: &[TranscriptionEntry], diarization: &[DiarizationInterval]) -> DiarizedTranscript {
    debug!(
        entries = transcription.len(),
        intervals = diarization.len(),
        "merging transcript and diarization"
    );

    let mut fused: DiarizedTranscript = transcription
        .iter()
        .filter(|entry| !entry.text.is_empty())
        .map(|entry| TranscriptChunk {
            start: entry.start,
            end: entry.end,
            text: entry.text.clone(),
            speaker: dominant_speaker(entry.start, entry.end, diarization)
                .unwrap_or(UNKNOWN_SPEAKER)
                .to_string(),
        })
        .collect();

    adjust_for_voice_over(&mut fused);
    fused
}

/// The speaker with the greatest summed overlap with `[start, end)`.
///
/// Ties go to the speaker seen first in `diarization`.
pub fn dominant_speaker(start: f64, end: f64, diarization: &[DiarizationInterval]) -> Option<&str> {
    // Small per-entry speaker counts; a Vec keeps first-seen order for tie breaking.
    let mut totals: Vec<(&str, f64)> = Vec::new();

    for interval in diarization {
        let overlap = end.min(interval.end) - start.max(interval.start);
        if overlap <= 0.0 {
            continue;
        }

        match totals.iter_mut().find(|(speaker, _)| *speaker == interval.speaker) {
            Some((_, total)) => *total += overlap,
            None => totals.push((interval.speaker.as_str(), overlap)),
        }
    }

    let mut best: Option<(&str, f64)> = None;
    for (speaker, total) in totals {
        match best {
            Some((_, best_total)) if total <= best_total => {}
            _ => best = Some((speaker, total)),
        }
    }

    best.map(|(speaker, _)| speaker)
}

/// Relabel the cold-open narration.
///
/// When the first chunk carries an auto-generated speaker id, every chunk with that exact
/// label becomes [`VOICE_OVER_SPEAKER`].
pub fn adjust_for_voice_over(transcript: &mut [TranscriptChunk]) {
    let Some(first) = transcript.first() else {
        return;
    };

    if !first.speaker.contains(GENERATED_SPEAKER_MARKER) {
        return;
    }

    let voice_over = first.speaker.clone();
    for chunk in transcript.iter_mut().filter(|c| c.speaker == voice_over) {
        chunk.speaker = VOICE_OVER_SPEAKER.to_string();
    }
}
