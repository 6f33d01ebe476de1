//! Static descriptor table used by the parsers to classify and construct segments.
//!
//! Order matters: classification takes the first descriptor whose matcher accepts the text.

use super::{
    Classifiable, DumbestThingOfTheWeekSegment, EmailSegment, ForgottenSuperheroesOfScienceSegment,
    FromLyrics, FromShowNotes, FromSummary, InterviewSegment, LogicalFallacySegment, NewsMetaSegment,
    NoisySegment, QuickieSegment, QuoteSegment, ScienceOrFictionSegment, SegmentData, SegmentKind,
    SwindlersListSegment, TikTokSegment, WhatsTheWordSegment,
};
use crate::Result;
use crate::parsers::show_notes::ShowNotesBlock;

/// The source a parser reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Lyrics,
    ShowNotes,
    Summary,
}

pub type TextConstructor = fn(&str) -> Result<SegmentData>;
pub type ShowNotesConstructor = fn(&ShowNotesBlock) -> Result<SegmentData>;

/// Everything a parser needs to know about one variant.
#[derive(Clone, Copy)]
pub struct VariantDescriptor {
    pub kind: SegmentKind,
    pub matches: fn(&str) -> bool,
    pub from_lyrics: Option<TextConstructor>,
    pub from_show_notes: Option<ShowNotesConstructor>,
    pub from_summary: Option<TextConstructor>,
}

impl VariantDescriptor {
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Lyrics => self.from_lyrics.is_some(),
            Capability::ShowNotes => self.from_show_notes.is_some(),
            Capability::Summary => self.from_summary.is_some(),
        }
    }

    const fn lyrics<T: FromLyrics>() -> Self {
        Self {
            kind: T::KIND,
            matches: T::match_string,
            from_lyrics: Some(lyrics_ctor::<T>),
            from_show_notes: None,
            from_summary: None,
        }
    }

    const fn lyrics_and_show_notes<T: FromLyrics + FromShowNotes>() -> Self {
        Self {
            kind: T::KIND,
            matches: T::match_string,
            from_lyrics: Some(lyrics_ctor::<T>),
            from_show_notes: Some(show_notes_ctor::<T>),
            from_summary: None,
        }
    }

    const fn lyrics_and_summary<T: FromLyrics + FromSummary>() -> Self {
        Self {
            kind: T::KIND,
            matches: T::match_string,
            from_lyrics: Some(lyrics_ctor::<T>),
            from_show_notes: None,
            from_summary: Some(summary_ctor::<T>),
        }
    }
}

impl std::fmt::Debug for VariantDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariantDescriptor")
            .field("kind", &self.kind)
            .field("lyrics", &self.from_lyrics.is_some())
            .field("show_notes", &self.from_show_notes.is_some())
            .field("summary", &self.from_summary.is_some())
            .finish()
    }
}

fn lyrics_ctor<T: FromLyrics>(text: &str) -> Result<SegmentData> {
    T::from_lyrics(text).map(Into::into)
}

fn show_notes_ctor<T: FromShowNotes>(block: &ShowNotesBlock) -> Result<SegmentData> {
    T::from_show_notes(block).map(Into::into)
}

fn summary_ctor<T: FromSummary>(text: &str) -> Result<SegmentData> {
    T::from_summary_text(text).map(Into::into)
}

/// Every parser-constructible variant, in classification order.
pub static REGISTRY: [VariantDescriptor; 13] = [
    VariantDescriptor::lyrics::<LogicalFallacySegment>(),
    VariantDescriptor::lyrics::<QuickieSegment>(),
    VariantDescriptor::lyrics::<WhatsTheWordSegment>(),
    VariantDescriptor::lyrics::<TikTokSegment>(),
    VariantDescriptor::lyrics::<DumbestThingOfTheWeekSegment>(),
    VariantDescriptor::lyrics_and_show_notes::<NoisySegment>(),
    VariantDescriptor::lyrics::<QuoteSegment>(),
    VariantDescriptor::lyrics_and_show_notes::<ScienceOrFictionSegment>(),
    VariantDescriptor::lyrics::<NewsMetaSegment>(),
    VariantDescriptor::lyrics_and_show_notes::<InterviewSegment>(),
    VariantDescriptor::lyrics_and_show_notes::<EmailSegment>(),
    VariantDescriptor::lyrics_and_summary::<ForgottenSuperheroesOfScienceSegment>(),
    VariantDescriptor::lyrics_and_summary::<SwindlersListSegment>(),
];

/// Outcome of classifying one piece of source text.
#[derive(Debug, Clone, Copy)]
pub enum Classification {
    /// First descriptor that matches and can be built from the requested source.
    Found(&'static VariantDescriptor),
    /// Something matched, but none of the matches support the requested source.
    WrongCapability(SegmentKind),
    NoMatch,
}

/// Walk [`REGISTRY`] in order looking for a variant constructible from `capability`.
pub fn classify(lowercase_text: &str, capability: Capability) -> Classification {
    let mut wrong_capability = None;

    for descriptor in &REGISTRY {
        if !(descriptor.matches)(lowercase_text) {
            continue;
        }

        if descriptor.supports(capability) {
            return Classification::Found(descriptor);
        }

        wrong_capability.get_or_insert(descriptor.kind);
    }

    match wrong_capability {
        Some(kind) => Classification::WrongCapability(kind),
        None => Classification::NoMatch,
    }
}
