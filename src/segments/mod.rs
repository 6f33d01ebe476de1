//! The closed taxonomy of episode segments.
//!
//! Every concrete variant is a plain struct that implements [`SegmentBehavior`] (what the
//! aligner needs at runtime). Variants that can be recognized in source text also implement
//! [`Classifiable`] plus one or more of the capability traits [`FromLyrics`],
//! [`FromShowNotes`] and [`FromSummary`]. The parsers never look at concrete types; they go
//! through the descriptor table in [`registry`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::parsers::show_notes::ShowNotesBlock;
use crate::transcript::{DiarizedTranscript, TranscriptChunk};

pub mod news;
pub mod registry;
pub mod science_or_fiction;
pub mod simple;

pub use news::{NewsItem, NewsMetaSegment};
pub use science_or_fiction::{ScienceOrFictionItem, ScienceOrFictionSegment};
pub use simple::{
    DumbestThingOfTheWeekSegment, EmailSegment, ForgottenSuperheroesOfScienceSegment, InterviewSegment,
    IntroSegment, LogicalFallacySegment, NoisySegment, OutroSegment, QuickieSegment, QuoteSegment,
    SwindlersListSegment, TikTokSegment, UnknownSegment, WhatsTheWordSegment,
};

/// Runtime behavior shared by every variant.
pub trait SegmentBehavior {
    fn kind(&self) -> SegmentKind;

    /// A prompt describing the transition into this segment, for the language-model oracle.
    fn llm_prompt(&self) -> String;

    /// Scan `transcript` for this segment's characteristic phrasing.
    fn get_start_time(&self, transcript: &[TranscriptChunk]) -> Option<f64>;

    /// Human-readable heading.
    fn title(&self) -> String;
}

/// A variant that can be recognized from a line of source text.
pub trait Classifiable: SegmentBehavior + Into<SegmentData> + Sized {
    const KIND: SegmentKind;

    fn match_string(lowercase_text: &str) -> bool;
}

/// Variants that can be built from a chunk of the embedded lyrics.
pub trait FromLyrics: Classifiable {
    fn from_lyrics(text: &str) -> Result<Self>;
}

/// Variants that can be built from a heading block of the show notes.
pub trait FromShowNotes: Classifiable {
    fn from_show_notes(block: &ShowNotesBlock) -> Result<Self>;
}

/// Variants that can be built from a clause of the RSS summary.
pub trait FromSummary: Classifiable {
    fn from_summary_text(text: &str) -> Result<Self>;
}

/// Discriminant of [`SegmentData`], used for logging, caching and classification results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Intro,
    Outro,
    Unknown,
    NewsItem,
    NewsMeta,
    LogicalFallacy,
    Quickie,
    WhatsTheWord,
    TikTok,
    DumbestThingOfTheWeek,
    Noisy,
    Quote,
    ScienceOrFiction,
    Interview,
    Email,
    ForgottenSuperheroesOfScience,
    SwindlersList,
}

impl SegmentKind {
    /// Stable snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            SegmentKind::Intro => "intro",
            SegmentKind::Outro => "outro",
            SegmentKind::Unknown => "unknown",
            SegmentKind::NewsItem => "news_item",
            SegmentKind::NewsMeta => "news_meta",
            SegmentKind::LogicalFallacy => "logical_fallacy",
            SegmentKind::Quickie => "quickie",
            SegmentKind::WhatsTheWord => "whats_the_word",
            SegmentKind::TikTok => "tik_tok",
            SegmentKind::DumbestThingOfTheWeek => "dumbest_thing_of_the_week",
            SegmentKind::Noisy => "noisy",
            SegmentKind::Quote => "quote",
            SegmentKind::ScienceOrFiction => "science_or_fiction",
            SegmentKind::Interview => "interview",
            SegmentKind::Email => "email",
            SegmentKind::ForgottenSuperheroesOfScience => "forgotten_superheroes_of_science",
            SegmentKind::SwindlersList => "swindlers_list",
        }
    }

    /// Short anchor used by renderers to link to the segment.
    pub fn anchor(self) -> &'static str {
        match self {
            SegmentKind::Intro => "intro",
            SegmentKind::Outro => "outro",
            SegmentKind::Unknown => "unknown",
            SegmentKind::NewsItem => "news_item",
            SegmentKind::NewsMeta => "news_meta",
            SegmentKind::LogicalFallacy => "ntlf",
            SegmentKind::Quickie => "quickie",
            SegmentKind::WhatsTheWord => "wtw",
            SegmentKind::TikTok => "tiktok",
            SegmentKind::DumbestThingOfTheWeek => "dumbest",
            SegmentKind::Noisy => "wtn",
            SegmentKind::Quote => "qow",
            SegmentKind::ScienceOrFiction => "theme",
            SegmentKind::Interview => "interview",
            SegmentKind::Email => "email",
            SegmentKind::ForgottenSuperheroesOfScience => "fss",
            SegmentKind::SwindlersList => "swindlers",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Variant-specific payload of a [`Segment`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentData {
    Intro(IntroSegment),
    Outro(OutroSegment),
    Unknown(UnknownSegment),
    NewsItem(NewsItem),
    NewsMeta(NewsMetaSegment),
    LogicalFallacy(LogicalFallacySegment),
    Quickie(QuickieSegment),
    WhatsTheWord(WhatsTheWordSegment),
    TikTok(TikTokSegment),
    DumbestThingOfTheWeek(DumbestThingOfTheWeekSegment),
    Noisy(NoisySegment),
    Quote(QuoteSegment),
    ScienceOrFiction(ScienceOrFictionSegment),
    Interview(InterviewSegment),
    Email(EmailSegment),
    ForgottenSuperheroesOfScience(ForgottenSuperheroesOfScienceSegment),
    SwindlersList(SwindlersListSegment),
}

impl SegmentData {
    pub fn behavior(&self) -> &dyn SegmentBehavior {
        match self {
            SegmentData::Intro(s) => s,
            SegmentData::Outro(s) => s,
            SegmentData::Unknown(s) => s,
            SegmentData::NewsItem(s) => s,
            SegmentData::NewsMeta(s) => s,
            SegmentData::LogicalFallacy(s) => s,
            SegmentData::Quickie(s) => s,
            SegmentData::WhatsTheWord(s) => s,
            SegmentData::TikTok(s) => s,
            SegmentData::DumbestThingOfTheWeek(s) => s,
            SegmentData::Noisy(s) => s,
            SegmentData::Quote(s) => s,
            SegmentData::ScienceOrFiction(s) => s,
            SegmentData::Interview(s) => s,
            SegmentData::Email(s) => s,
            SegmentData::ForgottenSuperheroesOfScience(s) => s,
            SegmentData::SwindlersList(s) => s,
        }
    }

    /// Title for the "other" column of an episode listing; `None` for news and recurring
    /// structural segments.
    pub fn non_news_title(&self) -> Option<String> {
        match self {
            SegmentData::LogicalFallacy(_)
            | SegmentData::WhatsTheWord(_)
            | SegmentData::DumbestThingOfTheWeek(_)
            | SegmentData::ForgottenSuperheroesOfScience(_)
            | SegmentData::SwindlersList(_) => Some(self.behavior().title()),
            SegmentData::Quickie(s) => Some(s.title.clone()),
            _ => None,
        }
    }
}

macro_rules! impl_into_segment_data {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for SegmentData {
                fn from(value: $ty) -> Self {
                    SegmentData::$variant(value)
                }
            }
        )*
    };
}

impl_into_segment_data! {
    Intro => IntroSegment,
    Outro => OutroSegment,
    Unknown => UnknownSegment,
    NewsItem => NewsItem,
    NewsMeta => NewsMetaSegment,
    LogicalFallacy => LogicalFallacySegment,
    Quickie => QuickieSegment,
    WhatsTheWord => WhatsTheWordSegment,
    TikTok => TikTokSegment,
    DumbestThingOfTheWeek => DumbestThingOfTheWeekSegment,
    Noisy => NoisySegment,
    Quote => QuoteSegment,
    ScienceOrFiction => ScienceOrFictionSegment,
    Interview => InterviewSegment,
    Email => EmailSegment,
    ForgottenSuperheroesOfScience => ForgottenSuperheroesOfScienceSegment,
    SwindlersList => SwindlersListSegment,
}

/// One structural part of an episode.
///
/// Parsers create segments, the merger backfills their fields and the aligner is the only
/// writer of `start_time`, `end_time` and `transcript`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    #[serde(flatten)]
    pub data: SegmentData,

    pub start_time: Option<f64>,

    /// `f64::INFINITY` until a following boundary is resolved (serialized as `null`).
    pub end_time: f64,

    pub transcript: DiarizedTranscript,
}

impl Segment {
    pub fn new(data: impl Into<SegmentData>) -> Self {
        Self {
            data: data.into(),
            start_time: None,
            end_time: f64::INFINITY,
            transcript: Vec::new(),
        }
    }

    pub fn kind(&self) -> SegmentKind {
        self.data.behavior().kind()
    }

    pub fn title(&self) -> String {
        self.data.behavior().title()
    }

    pub fn llm_prompt(&self) -> String {
        self.data.behavior().llm_prompt()
    }

    pub fn get_start_time(&self, transcript: &[TranscriptChunk]) -> Option<f64> {
        self.data.behavior().get_start_time(transcript)
    }

    /// Whether a following boundary has been found for this segment.
    pub fn has_resolved_end(&self) -> bool {
        self.end_time.is_finite()
    }

    /// Duration in minutes, or 0 when either bound is unresolved.
    pub fn duration(&self) -> f64 {
        match self.start_time {
            Some(start) if self.has_resolved_end() => (self.end_time - start) / 60.0,
            _ => 0.0,
        }
    }
}

/// Index of the first segment of `kind` in `segments`.
pub fn position_of_kind(segments: &[Segment], kind: SegmentKind) -> Option<usize> {
    segments.iter().position(|s| s.kind() == kind)
}

/// First chunk (in order) whose lowercased text satisfies `pred`.
pub(crate) fn first_chunk_start(
    transcript: &[TranscriptChunk],
    mut pred: impl FnMut(&TranscriptChunk, &str) -> bool,
) -> Option<f64> {
    transcript
        .iter()
        .find(|chunk| pred(chunk, &chunk.text.to_lowercase()))
        .map(|chunk| chunk.start)
}
