//! Recurring segments whose payload is a handful of strings.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{error, warn};

use super::{
    Classifiable, FromLyrics, FromShowNotes, FromSummary, SegmentBehavior, SegmentKind, first_chunk_start,
};
use crate::parsers::show_notes::ShowNotesBlock;
use crate::text::{contains_all, is_url, non_empty_lines, optional_url, padded_lines};
use crate::transcript::TranscriptChunk;
use crate::{Error, Result};

/// Speaker label of the show's host; several transitions are always introduced by him.
pub const HOST_SPEAKER: &str = "Steve";

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid segment regex"))
}

fn lowercase_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// All words of `phrase` appear in the chunk. An empty phrase never matches.
fn words_in_chunk(words: &[String], lowercase_text: &str) -> bool {
    !words.is_empty() && contains_all(words, lowercase_text)
}

fn warn_extra_lines(kind: SegmentKind, extra: &[&str]) {
    if !extra.is_empty() {
        warn!(%kind, ?extra, "unexpected extra lines in segment");
    }
}

// ---------------------------------------------------------------------------
// Synthesized segments
// ---------------------------------------------------------------------------

/// The opening banter between the rogues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IntroSegment;

impl SegmentBehavior for IntroSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Intro
    }

    fn llm_prompt(&self) -> String {
        "Please identify the start of the introduction.".to_string()
    }

    fn get_start_time(&self, _transcript: &[TranscriptChunk]) -> Option<f64> {
        Some(0.0)
    }

    fn title(&self) -> String {
        "Intro".to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OutroSegment;

impl SegmentBehavior for OutroSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Outro
    }

    fn llm_prompt(&self) -> String {
        "Please find the start of the outro. This is typically where Steve says \
         'Skeptics' Guide to the Universe is produced by SGU Productions'"
            .to_string()
    }

    fn get_start_time(&self, transcript: &[TranscriptChunk]) -> Option<f64> {
        const SIGN_OFF: [&str; 9] = [
            "skeptic",
            "guide",
            "to",
            "the",
            "universe",
            "produced",
            "by",
            "sgu",
            "productions",
        ];
        first_chunk_start(transcript, |_, text| contains_all(&SIGN_OFF, text))
    }

    fn title(&self) -> String {
        "Outro".to_string()
    }
}

/// A lyric chunk or show-notes heading that matched no known variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnknownSegment {
    pub title: String,
    pub extra_text: String,
    pub url: Option<String>,
}

impl UnknownSegment {
    /// Split free-form text into a title line, URL lines and everything else.
    pub fn create(text: &str) -> Self {
        let lines = non_empty_lines(text);
        let title = lines.first().copied().unwrap_or_default().to_string();

        let mut extra = Vec::new();
        let mut url = None;
        for line in lines.iter().skip(1) {
            if is_url(line) {
                url = Some(line.to_string());
            } else {
                extra.push(*line);
            }
        }

        Self {
            title,
            extra_text: extra.join(" "),
            url,
        }
    }
}

impl SegmentBehavior for UnknownSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Unknown
    }

    fn llm_prompt(&self) -> String {
        format!(
            "Please identify the start of the segment whose title is: {}, {}",
            self.title, self.extra_text
        )
    }

    fn get_start_time(&self, transcript: &[TranscriptChunk]) -> Option<f64> {
        let title = lowercase_words(&self.title);
        let extra = lowercase_words(&self.extra_text);
        first_chunk_start(transcript, |_, text| {
            words_in_chunk(&title, text) || words_in_chunk(&extra, text)
        })
    }

    fn title(&self) -> String {
        self.title.clone()
    }
}

// ---------------------------------------------------------------------------
// Lyrics-only segments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalFallacySegment {
    pub topic: String,
}

impl SegmentBehavior for LogicalFallacySegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::LogicalFallacy
    }

    fn llm_prompt(&self) -> String {
        "Please identify the start of the 'name that logical fallacy' segment.".to_string()
    }

    fn get_start_time(&self, transcript: &[TranscriptChunk]) -> Option<f64> {
        first_chunk_start(transcript, |_, text| contains_all(&["name", "logical", "fallacy"], text))
    }

    fn title(&self) -> String {
        "Name That Logical Fallacy".to_string()
    }
}

impl Classifiable for LogicalFallacySegment {
    const KIND: SegmentKind = SegmentKind::LogicalFallacy;

    fn match_string(lowercase_text: &str) -> bool {
        lowercase_text.contains("name that logical fallacy")
    }
}

impl FromLyrics for LogicalFallacySegment {
    fn from_lyrics(text: &str) -> Result<Self> {
        let lines = padded_lines(text, 2);
        Ok(Self {
            topic: lines[1..].join(" ").trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickieSegment {
    pub title: String,
    pub subject: String,
    pub url: String,
}

impl SegmentBehavior for QuickieSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Quickie
    }

    fn llm_prompt(&self) -> String {
        format!(
            "Please find the start of the 'quickie' segment: {}. The subject is: {}",
            self.title, self.subject
        )
    }

    fn get_start_time(&self, transcript: &[TranscriptChunk]) -> Option<f64> {
        let subject = lowercase_words(&self.subject);
        first_chunk_start(transcript, |_, text| {
            contains_all(&["quickie", "with"], text) || words_in_chunk(&subject, text)
        })
    }

    fn title(&self) -> String {
        self.title.clone()
    }
}

impl Classifiable for QuickieSegment {
    const KIND: SegmentKind = SegmentKind::Quickie;

    fn match_string(lowercase_text: &str) -> bool {
        lowercase_text.starts_with("quickie with")
    }
}

impl FromLyrics for QuickieSegment {
    fn from_lyrics(text: &str) -> Result<Self> {
        let lines = padded_lines(text, 3);
        warn_extra_lines(Self::KIND, &lines[3..]);

        Ok(Self {
            title: lines[0].to_string(),
            subject: lines[1].to_string(),
            url: lines[2].to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhatsTheWordSegment {
    pub word: String,
}

impl SegmentBehavior for WhatsTheWordSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::WhatsTheWord
    }

    fn llm_prompt(&self) -> String {
        "Please find the start of the 'what's the word' segment. \
         This is typically introduced by Steve asking Cara for the word."
            .to_string()
    }

    fn get_start_time(&self, transcript: &[TranscriptChunk]) -> Option<f64> {
        static INTRO: OnceLock<Regex> = OnceLock::new();
        let intro = regex(&INTRO, r"^what.?s the word");
        let word = self.word.to_lowercase();

        first_chunk_start(transcript, |_, text| {
            intro.is_match(text) || (!word.is_empty() && text.contains(&word))
        })
    }

    fn title(&self) -> String {
        "What's the Word?".to_string()
    }
}

impl Classifiable for WhatsTheWordSegment {
    const KIND: SegmentKind = SegmentKind::WhatsTheWord;

    fn match_string(lowercase_text: &str) -> bool {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        regex(&MATCH, r"^what.s the word").is_match(lowercase_text)
    }
}

impl FromLyrics for WhatsTheWordSegment {
    fn from_lyrics(text: &str) -> Result<Self> {
        let lines = padded_lines(text, 2);
        warn_extra_lines(Self::KIND, &lines[2..]);

        if lines[1].is_empty() {
            return Err(Error::string_match("word", text));
        }

        Ok(Self {
            word: lines[1].to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TikTokSegment {
    pub title: String,
    pub url: String,
}

impl SegmentBehavior for TikTokSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::TikTok
    }

    fn llm_prompt(&self) -> String {
        format!(
            "Please identify the start of the 'from tiktok' segment. The topic is: {}",
            self.title
        )
    }

    fn get_start_time(&self, transcript: &[TranscriptChunk]) -> Option<f64> {
        let title = lowercase_words(&self.title);
        first_chunk_start(transcript, |_, text| words_in_chunk(&title, text))
    }

    fn title(&self) -> String {
        self.title.clone()
    }
}

impl Classifiable for TikTokSegment {
    const KIND: SegmentKind = SegmentKind::TikTok;

    fn match_string(lowercase_text: &str) -> bool {
        lowercase_text.starts_with("from tiktok")
    }
}

impl FromLyrics for TikTokSegment {
    fn from_lyrics(text: &str) -> Result<Self> {
        let lines = padded_lines(text, 3);
        warn_extra_lines(Self::KIND, &lines[3..]);

        let (title, url) = (lines[1], lines[2]);
        if title.is_empty() {
            return Err(Error::string_match("title", text));
        }

        if !is_url(url) {
            error!(text, "failed to extract valid url from tiktok segment");
        }

        Ok(Self {
            title: title.to_string(),
            url: url.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DumbestThingOfTheWeekSegment {
    pub topic: String,
    pub url: String,
}

impl SegmentBehavior for DumbestThingOfTheWeekSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::DumbestThingOfTheWeek
    }

    fn llm_prompt(&self) -> String {
        format!(
            "Please identify the start of the 'dumbest thing of the week' segment. \
             This segment is about: {}",
            self.topic
        )
    }

    fn get_start_time(&self, transcript: &[TranscriptChunk]) -> Option<f64> {
        first_chunk_start(transcript, |_, text| {
            contains_all(&["dumb", "thing", "of", "the", "week"], text)
        })
    }

    fn title(&self) -> String {
        "Dumbest Thing of the Week".to_string()
    }
}

impl Classifiable for DumbestThingOfTheWeekSegment {
    const KIND: SegmentKind = SegmentKind::DumbestThingOfTheWeek;

    fn match_string(lowercase_text: &str) -> bool {
        lowercase_text.starts_with("dumbest thing of the week")
    }
}

impl FromLyrics for DumbestThingOfTheWeekSegment {
    fn from_lyrics(text: &str) -> Result<Self> {
        let lines = padded_lines(text, 3);
        warn_extra_lines(Self::KIND, &lines[3..]);

        Ok(Self {
            topic: lines[1].to_string(),
            url: lines[2].to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteSegment {
    pub quote: String,
    pub attribution: String,
}

impl SegmentBehavior for QuoteSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Quote
    }

    fn llm_prompt(&self) -> String {
        "Please identify the start of the 'quote' segment. \
         This is usually Steve asking Evan for the quote."
            .to_string()
    }

    fn get_start_time(&self, transcript: &[TranscriptChunk]) -> Option<f64> {
        first_chunk_start(transcript, |chunk, text| {
            text.contains("quote") && chunk.speaker == HOST_SPEAKER
        })
    }

    fn title(&self) -> String {
        "Skeptical Quote of the Week".to_string()
    }
}

impl Classifiable for QuoteSegment {
    const KIND: SegmentKind = SegmentKind::Quote;

    fn match_string(lowercase_text: &str) -> bool {
        lowercase_text.starts_with("skeptical quote of the week")
    }
}

impl FromLyrics for QuoteSegment {
    fn from_lyrics(text: &str) -> Result<Self> {
        let lines = padded_lines(text, 3);
        // First line is the segment name, last is the attribution.
        let quote_parts = &lines[1..lines.len() - 1];
        let attribution = lines[lines.len() - 1];

        if quote_parts.iter().all(|part| part.is_empty()) {
            warn!(text, "unable to extract quote from lyrics");
        }

        Ok(Self {
            quote: quote_parts.join(" ").trim().to_string(),
            attribution: attribution.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Segments that also appear in the show notes
// ---------------------------------------------------------------------------

/// "Who's That Noisy". The lyrics only name the segment; last week's answer comes from the
/// show notes and is merged in afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoisySegment {
    pub last_week_answer: String,
}

impl NoisySegment {
    pub const MISSING_ANSWER: &'static str = "<!-- Failed to extract last week's answer -->";
    const SPLITTERS: [char; 2] = [':', '-'];
}

impl Default for NoisySegment {
    fn default() -> Self {
        Self {
            last_week_answer: Self::MISSING_ANSWER.to_string(),
        }
    }
}

impl SegmentBehavior for NoisySegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Noisy
    }

    fn llm_prompt(&self) -> String {
        "Please identify the start of the 'who's that noisy' segment.".to_string()
    }

    fn get_start_time(&self, transcript: &[TranscriptChunk]) -> Option<f64> {
        first_chunk_start(transcript, |_, text| contains_all(&["who", "that", "noisy"], text))
    }

    fn title(&self) -> String {
        "Who's That Noisy".to_string()
    }
}

impl Classifiable for NoisySegment {
    const KIND: SegmentKind = SegmentKind::Noisy;

    fn match_string(lowercase_text: &str) -> bool {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        regex(&MATCH, r"who.s that noisy").is_match(lowercase_text)
    }
}

impl FromLyrics for NoisySegment {
    fn from_lyrics(_text: &str) -> Result<Self> {
        Ok(Self::default())
    }
}

impl FromShowNotes for NoisySegment {
    fn from_show_notes(block: &ShowNotesBlock) -> Result<Self> {
        let Some(answer_element) = block.siblings.first() else {
            return Ok(Self::default());
        };

        for splitter in Self::SPLITTERS {
            if let Some(answer) = answer_element.text.split(splitter).nth(1) {
                return Ok(Self {
                    last_week_answer: answer.trim().to_string(),
                });
            }
        }

        Ok(Self::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewSegment {
    pub name: String,
    pub url: String,
}

impl SegmentBehavior for InterviewSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Interview
    }

    fn llm_prompt(&self) -> String {
        format!("Please identify the beginning of the interview with {}.", self.name)
    }

    fn get_start_time(&self, transcript: &[TranscriptChunk]) -> Option<f64> {
        first_chunk_start(transcript, |_, text| contains_all(&["go", "to", "interview"], text))
    }

    fn title(&self) -> String {
        format!("Interview with {}", self.name)
    }
}

impl Classifiable for InterviewSegment {
    const KIND: SegmentKind = SegmentKind::Interview;

    fn match_string(lowercase_text: &str) -> bool {
        lowercase_text.starts_with("interview with")
    }
}

impl FromLyrics for InterviewSegment {
    fn from_lyrics(text: &str) -> Result<Self> {
        let lines = padded_lines(text, 2);
        warn_extra_lines(Self::KIND, &lines[2..]);

        Ok(Self {
            name: lines[0].replace("Interview with", "").trim().to_string(),
            url: lines[1].to_string(),
        })
    }
}

impl FromShowNotes for InterviewSegment {
    fn from_show_notes(block: &ShowNotesBlock) -> Result<Self> {
        static WITH: OnceLock<Regex> = OnceLock::new();
        let with = regex(&WITH, r"(?i)with");

        let heading = block.heading.as_str();
        let name = with.splitn(heading, 2).nth(1).unwrap_or(heading);

        Ok(Self {
            name: name.trim_matches([':', '-', ' ']).to_string(),
            url: String::new(),
        })
    }
}

/// Listener questions and emails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailSegment {
    pub items: Vec<String>,
}

impl SegmentBehavior for EmailSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Email
    }

    fn llm_prompt(&self) -> String {
        "Please identify the start of the 'email' segment.".to_string()
    }

    fn get_start_time(&self, transcript: &[TranscriptChunk]) -> Option<f64> {
        first_chunk_start(transcript, |chunk, text| {
            text.contains("mail") && chunk.speaker == HOST_SPEAKER
        })
    }

    fn title(&self) -> String {
        "Your Questions and E-mails".to_string()
    }
}

impl Classifiable for EmailSegment {
    const KIND: SegmentKind = SegmentKind::Email;

    fn match_string(lowercase_text: &str) -> bool {
        lowercase_text.starts_with("question #")
            || contains_all(&["your", "question", "mail"], lowercase_text)
    }
}

impl FromLyrics for EmailSegment {
    fn from_lyrics(text: &str) -> Result<Self> {
        let mut items = Vec::new();
        let mut question: Vec<&str> = Vec::new();

        for line in non_empty_lines(text).into_iter().skip(1) {
            let lower = line.to_lowercase();
            let starts_item = lower.starts_with("question #") || lower.starts_with("email #");
            if starts_item && !question.is_empty() {
                items.push(question.join("\n"));
                question.clear();
            }
            question.push(line);
        }

        if !question.is_empty() {
            items.push(question.join("\n"));
        }

        Ok(Self { items })
    }
}

impl FromShowNotes for EmailSegment {
    fn from_show_notes(block: &ShowNotesBlock) -> Result<Self> {
        let heading = block.heading.as_str();
        if !heading.contains(": ") {
            return Ok(Self { items: Vec::new() });
        }

        let items = heading
            .split(':')
            .nth(1)
            .unwrap_or_default()
            .split(',')
            .map(|item| item.trim().to_string())
            .collect();

        Ok(Self { items })
    }
}

// ---------------------------------------------------------------------------
// Segments that also appear in the RSS summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForgottenSuperheroesOfScienceSegment {
    pub subject: String,
    pub description: String,
}

impl ForgottenSuperheroesOfScienceSegment {
    pub const MISSING_SUBJECT: &'static str = "N/A<!-- Failed to extract subject -->";
    pub const MISSING_DESCRIPTION: &'static str = "N/A<!-- Failed to extract description -->";

    fn with_subject(subject: &str) -> Self {
        let mut segment = Self::default();
        if !subject.is_empty() {
            segment.subject = subject.to_string();
        }
        segment
    }
}

impl Default for ForgottenSuperheroesOfScienceSegment {
    fn default() -> Self {
        Self {
            subject: Self::MISSING_SUBJECT.to_string(),
            description: Self::MISSING_DESCRIPTION.to_string(),
        }
    }
}

impl SegmentBehavior for ForgottenSuperheroesOfScienceSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::ForgottenSuperheroesOfScience
    }

    fn llm_prompt(&self) -> String {
        "Please identify the start of the 'forgotten superheroes of science' segment.".to_string()
    }

    fn get_start_time(&self, transcript: &[TranscriptChunk]) -> Option<f64> {
        first_chunk_start(transcript, |_, text| contains_all(&["forgotten", "hero", "science"], text))
    }

    fn title(&self) -> String {
        "Forgotten Superheroes of Science".to_string()
    }
}

impl Classifiable for ForgottenSuperheroesOfScienceSegment {
    const KIND: SegmentKind = SegmentKind::ForgottenSuperheroesOfScience;

    fn match_string(lowercase_text: &str) -> bool {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        regex(&MATCH, r"^(forgotten superhero(es)? of science|fsos)").is_match(lowercase_text)
    }
}

impl FromLyrics for ForgottenSuperheroesOfScienceSegment {
    fn from_lyrics(text: &str) -> Result<Self> {
        let lines = padded_lines(text, 2);
        warn_extra_lines(Self::KIND, &lines[2..]);
        Ok(Self::with_subject(lines[1]))
    }
}

impl FromSummary for ForgottenSuperheroesOfScienceSegment {
    fn from_summary_text(text: &str) -> Result<Self> {
        let lines = padded_lines(text, 1);
        Ok(Self::with_subject(lines[0]))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwindlersListSegment {
    pub topic: String,
    pub url: Option<String>,
}

impl SwindlersListSegment {
    pub const MISSING_TOPIC: &'static str = "N/A<!-- Failed to extract topic -->";
}

impl SegmentBehavior for SwindlersListSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::SwindlersList
    }

    fn llm_prompt(&self) -> String {
        format!(
            "Please identify the start of the 'swindler's list' segment. The topic is: {}",
            self.topic
        )
    }

    fn get_start_time(&self, transcript: &[TranscriptChunk]) -> Option<f64> {
        first_chunk_start(transcript, |_, text| contains_all(&["swindler", "list"], text))
    }

    fn title(&self) -> String {
        "Swindler's List".to_string()
    }
}

impl Classifiable for SwindlersListSegment {
    const KIND: SegmentKind = SegmentKind::SwindlersList;

    fn match_string(lowercase_text: &str) -> bool {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        regex(&MATCH, r"^swindler.s list").is_match(lowercase_text)
    }
}

impl FromLyrics for SwindlersListSegment {
    fn from_lyrics(text: &str) -> Result<Self> {
        let lines = padded_lines(text, 3);
        warn_extra_lines(Self::KIND, &lines[3..]);

        let topic = if lines[1].is_empty() {
            Self::MISSING_TOPIC
        } else {
            lines[1]
        };

        Ok(Self {
            topic: topic.to_string(),
            url: optional_url(lines[2]),
        })
    }
}

impl FromSummary for SwindlersListSegment {
    fn from_summary_text(text: &str) -> Result<Self> {
        let topic = text
            .split(':')
            .nth(1)
            .map(str::trim)
            .filter(|topic| !topic.is_empty())
            .unwrap_or(Self::MISSING_TOPIC);

        Ok(Self {
            topic: topic.to_string(),
            url: None,
        })
    }
}
