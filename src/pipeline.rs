//! High-level API for segmenting an episode.
//!
//! [`Segmenter`] wires the whole pipeline together: parse the three sources, merge them,
//! fuse transcription with diarization, align, and encode. Each stage is also exposed on
//! its own so callers can inspect intermediate results.

use std::io::{BufWriter, Write};

use tracing::debug;

use crate::aligner::{AlignedSegments, AlignmentReport, align_segments};
use crate::fuser::fuse;
use crate::json_array_encoder::JsonArrayEncoder;
use crate::merger::merge_segments;
use crate::opts::Opts;
use crate::oracle::{CachedOracle, NullOracle, StartTimeOracle};
use crate::output_type::OutputType;
use crate::parsers::{parse_lyrics, parse_show_notes, parse_summary_text};
use crate::segment_encoder::SegmentEncoder;
use crate::segments::Segment;
use crate::text_encoder::TextEncoder;
use crate::transcript::{DiarizationInterval, DiarizedTranscript, TranscriptionEntry};
use crate::vtt_encoder::VttEncoder;
use crate::{Error, Result};

/// The raw textual descriptions of one episode.
#[derive(Debug, Clone, Default)]
pub struct EpisodeSources {
    /// The MP3 lyrics tag.
    pub lyrics: String,
    /// The episode page HTML, as fetched.
    pub show_notes: Vec<u8>,
    /// The RSS item summary.
    pub summary: String,
}

/// The main segmentation entry point.
///
/// `Segmenter` owns the oracle (wrapped in an answer cache) and the options. Alignment takes
/// `&mut self` because the cache is updated as answers come in.
pub struct Segmenter<O: StartTimeOracle = NullOracle> {
    oracle: CachedOracle<O>,
    opts: Opts,
}

impl Segmenter<NullOracle> {
    /// A segmenter that relies on keyword heuristics alone.
    pub fn heuristics_only(opts: Opts) -> Result<Self> {
        Self::new(NullOracle, opts)
    }
}

impl<O: StartTimeOracle> Segmenter<O> {
    /// Wrap `oracle` in a cache: on disk under `opts.cache_dir` when set, in memory otherwise.
    pub fn new(oracle: O, opts: Opts) -> Result<Self> {
        let oracle = match &opts.cache_dir {
            Some(dir) => CachedOracle::open(oracle, dir, opts.episode_number)?,
            None => CachedOracle::in_memory(oracle),
        };

        Ok(Self { oracle, opts })
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Parse all three sources and merge them into one ordered, untimed segment list.
    pub fn extract_segments(&self, sources: &EpisodeSources) -> Result<Vec<Segment>> {
        let lyric_segments = parse_lyrics(&sources.lyrics)?;
        let show_note_segments = parse_show_notes(&sources.show_notes)?;
        let summary_segments = parse_summary_text(&sources.summary);

        debug!(
            lyrics = lyric_segments.len(),
            show_notes = show_note_segments.len(),
            summary = summary_segments.len(),
            "parsed episode sources"
        );

        Ok(merge_segments(lyric_segments, &show_note_segments, &summary_segments))
    }

    pub fn fuse(&self, transcription: &[TranscriptionEntry], diarization: &[DiarizationInterval]) -> DiarizedTranscript {
        fuse(transcription, diarization)
    }

    /// Time `segments` against `transcript`, bracketing them with an intro and an outro.
    pub fn align(&mut self, segments: Vec<Segment>, transcript: &DiarizedTranscript) -> Result<AlignedSegments> {
        align_segments(segments, transcript, &mut self.oracle, &self.opts)
    }

    /// Run every stage and return the aligned segments.
    pub fn process(
        &mut self,
        sources: &EpisodeSources,
        transcription: &[TranscriptionEntry],
        diarization: &[DiarizationInterval],
    ) -> Result<AlignedSegments> {
        let segments = self.extract_segments(sources)?;
        let transcript = self.fuse(transcription, diarization);
        self.align(segments, &transcript)
    }

    /// Run every stage and encode the result to `w` in `opts.output_type`.
    pub fn process_to_writer<W: Write>(
        &mut self,
        sources: &EpisodeSources,
        transcription: &[TranscriptionEntry],
        diarization: &[DiarizationInterval],
        w: W,
    ) -> Result<AlignmentReport> {
        let aligned = self.process(sources, transcription, diarization)?;
        write_segments(&aligned.segments, self.opts.output_type, w)?;
        Ok(aligned.report)
    }
}

/// Encode `segments` to `w` in the requested format.
pub fn write_segments<W: Write>(segments: &[Segment], output_type: OutputType, w: W) -> Result<()> {
    // Buffer output for efficiency (especially important for stdout).
    let writer = BufWriter::new(w);

    match output_type {
        OutputType::Json => {
            let mut encoder = JsonArrayEncoder::new(writer);
            let run_res = write_all(&mut encoder, segments);
            merge_run_and_close(run_res, encoder.close())
        }
        OutputType::Vtt => {
            let mut encoder = VttEncoder::new(writer);
            let run_res = write_all(&mut encoder, segments);
            merge_run_and_close(run_res, encoder.close())
        }
        OutputType::Text => {
            let mut encoder = TextEncoder::new(writer);
            let run_res = write_all(&mut encoder, segments);
            merge_run_and_close(run_res, encoder.close())
        }
    }
}

fn write_all<E: SegmentEncoder>(encoder: &mut E, segments: &[Segment]) -> Result<()> {
    for segment in segments {
        encoder.write_segment(segment)?;
    }
    Ok(())
}

fn merge_run_and_close(run_res: Result<()>, close_res: Result<()>) -> Result<()> {
    match (run_res, close_res) {
        (Ok(()), Ok(())) => Ok(()),
        (Ok(()), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => Err(Error::msg(format!("{close_err}: {err}"))),
    }
}
