//! Assign every segment a start, an end and its slice of the diarized transcript.
//!
//! Boundaries are resolved pairwise: for each adjacent `(left, right)` pair we look for
//! `right`'s opening inside a window that starts where `left` starts. Keyword heuristics go
//! first; the oracle is only consulted when they come up empty.

use serde::Serialize;
use tracing::{debug, warn};

use crate::opts::Opts;
use crate::oracle::{OracleRequest, StartTimeOracle};
use crate::segments::{IntroSegment, OutroSegment, Segment, SegmentKind};
use crate::transcript::{self, TranscriptChunk};
use crate::{Error, Result};

/// Progress of one boundary through the resolution pipeline.
///
/// `Unresolved → HeuristicAttempted → OracleAttempted → Resolved | Failed`; a heuristic
/// hit goes straight to `Resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryState {
    Unresolved,
    HeuristicAttempted,
    OracleAttempted,
    Resolved,
    Failed,
}

impl BoundaryState {
    fn can_advance_to(self, next: BoundaryState) -> bool {
        use BoundaryState::*;
        matches!(
            (self, next),
            (Unresolved, HeuristicAttempted)
                | (HeuristicAttempted, OracleAttempted | Resolved | Failed)
                | (OracleAttempted, Resolved | Failed)
        )
    }
}

/// What resolved a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundarySource {
    Heuristic,
    Oracle,
}

/// The transition between two adjacent segments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Boundary {
    pub left: SegmentKind,
    pub right: SegmentKind,
    pub state: BoundaryState,
    pub source: Option<BoundarySource>,
    pub time: Option<f64>,
}

impl Boundary {
    fn new(left: SegmentKind, right: SegmentKind) -> Self {
        Self {
            left,
            right,
            state: BoundaryState::Unresolved,
            source: None,
            time: None,
        }
    }

    fn advance(&mut self, next: BoundaryState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal boundary transition {:?} -> {next:?}",
            self.state
        );
        self.state = next;
    }

    fn resolve(&mut self, time: f64, source: BoundarySource) {
        self.advance(BoundaryState::Resolved);
        self.time = Some(time);
        self.source = Some(source);
    }
}

/// Per-boundary outcome of one alignment run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlignmentReport {
    pub boundaries: Vec<Boundary>,
}

impl AlignmentReport {
    pub fn resolved(&self) -> usize {
        self.count(BoundaryState::Resolved)
    }

    pub fn failed(&self) -> usize {
        self.count(BoundaryState::Failed)
    }

    fn count(&self, state: BoundaryState) -> usize {
        self.boundaries.iter().filter(|b| b.state == state).count()
    }
}

/// Time-bounded segments plus the report of how each boundary was found.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSegments {
    pub segments: Vec<Segment>,
    pub report: AlignmentReport,
}

/// Bracket `segments` with an intro and an outro, then time every boundary against
/// `transcript`.
///
/// Unresolved boundaries are logged and leave the left segment's end open; only an empty
/// transcript or an oracle failure is an error.
pub fn align_segments<O: StartTimeOracle + ?Sized>(
    segments: Vec<Segment>,
    transcript: &[TranscriptChunk],
    oracle: &mut O,
    opts: &Opts,
) -> Result<AlignedSegments> {
    let Some(last_chunk) = transcript.last() else {
        return Err(Error::EmptyTranscript);
    };
    let episode_end = last_chunk.end;

    let mut intro = Segment::new(IntroSegment);
    intro.start_time = Some(0.0);
    let mut outro = Segment::new(OutroSegment);
    outro.end_time = episode_end;

    let mut segments: Vec<Segment> = std::iter::once(intro)
        .chain(segments)
        .chain(std::iter::once(outro))
        .collect();

    let mut report = AlignmentReport::default();
    let mut last_start = 0.0;

    for idx in 0..segments.len() - 1 {
        let left_start = *segments[idx].start_time.get_or_insert(last_start);
        let window_end = left_start + opts.window_seconds;
        let window = transcript::window(transcript, opts.window_skip_chunks, left_start, window_end);

        let (left, right) = (&segments[idx], &segments[idx + 1]);
        let mut boundary = Boundary::new(left.kind(), right.kind());

        boundary.advance(BoundaryState::HeuristicAttempted);
        if let Some(time) = right.get_start_time(&window) {
            boundary.resolve(time, BoundarySource::Heuristic);
        } else if window.is_empty() {
            boundary.advance(BoundaryState::Failed);
        } else {
            boundary.advance(BoundaryState::OracleAttempted);

            let prompt = right.llm_prompt();
            let request = OracleRequest {
                kind: right.kind(),
                prompt: &prompt,
                transcript: &window,
            };

            match oracle.find_start_time(&request)? {
                Some(time) if left_start <= time && time < window_end && time <= episode_end => {
                    boundary.resolve(time, BoundarySource::Oracle);
                }
                Some(time) => {
                    warn!(kind = %boundary.right, time, left_start, window_end, "oracle answer outside the search window; ignoring");
                    boundary.advance(BoundaryState::Failed);
                }
                None => boundary.advance(BoundaryState::Failed),
            }
        }

        match boundary.time {
            Some(time) => {
                segments[idx].end_time = time;
                segments[idx + 1].start_time = Some(time);
                last_start = time;
            }
            None => {
                warn!(left = %boundary.left, right = %boundary.right, "could not find segment start");
            }
        }

        report.boundaries.push(boundary);
    }

    for segment in &mut segments {
        let start = *segment.start_time.get_or_insert(last_start);

        if !segment.has_resolved_end() {
            warn!(kind = %segment.kind(), title = %segment.title(), "segment end is unresolved; no transcript attached");
            continue;
        }

        segment.transcript = transcript::between_times(transcript, start, segment.end_time);
        if segment.transcript.is_empty() {
            warn!(kind = %segment.kind(), title = %segment.title(), "segment has an empty transcript");
        }

        debug!(
            kind = %segment.kind(),
            start_time = start,
            end_time = segment.end_time,
            chunks = segment.transcript.len(),
            "aligned segment"
        );
    }

    Ok(AlignedSegments { segments, report })
}
