//! Science or Fiction: the rogues guess which of several news items is made up.
//!
//! The lyrics only carry the theme; the items themselves come from the show-notes markup
//! and are kept as raw HTML until someone asks for [`ScienceOrFictionSegment::items`].

use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde::Serialize;

use super::{Classifiable, FromLyrics, FromShowNotes, SegmentBehavior, SegmentKind, first_chunk_start};
use crate::parsers::show_notes::ShowNotesBlock;
use crate::text::{non_empty_lines, url_host};
use crate::transcript::TranscriptChunk;
use crate::{Error, Result};

/// One claim presented to the rogues.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScienceOrFictionItem {
    pub number: u32,
    pub name: String,
    /// Empty when the item links no article.
    pub article_url: String,
    pub article_publication: Option<String>,
    /// `science1`, `science2`, ... for true items, `fiction` for the made-up one.
    pub sof_result: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScienceOrFictionSegment {
    pub theme: Option<String>,
    /// Outer HTML of each item element under the show-notes heading.
    pub raw_items: Vec<String>,
}

impl ScienceOrFictionSegment {
    /// Parse [`Self::raw_items`] into structured items.
    pub fn items(&self) -> Result<Vec<ScienceOrFictionItem>> {
        let title_sel = selector("span.science-fiction__item-title")?;
        let p_sel = selector("p")?;
        let link_sel = selector("a")?;
        let answer_sel = selector("span.quiz__answer")?;

        let mut items = Vec::with_capacity(self.raw_items.len());
        let mut science_items = 1;

        for raw in &self.raw_items {
            let fragment = Html::parse_fragment(raw);
            let root = fragment.root_element();

            let title = single_text(root, &title_sel, "item title", raw)?;
            let number = item_number(&title)?;

            let p = root
                .select(&p_sel)
                .next()
                .ok_or_else(|| Error::string_match("item description", raw.as_str()))?;
            let name = description(p);

            let answer = single_text(root, &answer_sel, "item answer", raw)?;

            let article_url = p
                .select(&link_sel)
                .next()
                .and_then(|a| a.value().attr("href"))
                .unwrap_or_default()
                .to_string();
            let article_publication = url_host(&article_url).map(str::to_string);

            let sof_result = if answer.eq_ignore_ascii_case("science") {
                let label = format!("science{science_items}");
                science_items += 1;
                label
            } else {
                "fiction".to_string()
            };

            items.push(ScienceOrFictionItem {
                number,
                name,
                article_url,
                article_publication,
                sof_result,
            });
        }

        Ok(items)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| Error::msg(format!("invalid selector {css:?}: {err:?}")))
}

fn single_text(root: ElementRef<'_>, sel: &Selector, what: &'static str, raw: &str) -> Result<String> {
    root.select(sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .ok_or_else(|| Error::string_match(what, raw))
}

fn item_number(title: &str) -> Result<u32> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = NUMBER.get_or_init(|| Regex::new(r"(\d+)").expect("valid item number regex"));

    re.captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| Error::string_match("item number", title))
}

/// The description is the paragraph's leading node; trailing links and notes are dropped.
fn description(p: ElementRef<'_>) -> String {
    let leading = p.first_child().and_then(|node| match node.value() {
        Node::Text(text) => Some(text.trim().to_string()),
        Node::Element(_) => ElementRef::wrap(node).map(|el| el.text().collect::<String>().trim().to_string()),
        _ => None,
    });

    match leading {
        Some(text) if !text.is_empty() => text,
        _ => p.text().collect::<String>().trim().to_string(),
    }
}

impl SegmentBehavior for ScienceOrFictionSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::ScienceOrFiction
    }

    fn llm_prompt(&self) -> String {
        "Please identify the start of the 'science or fiction' segment.".to_string()
    }

    fn get_start_time(&self, transcript: &[TranscriptChunk]) -> Option<f64> {
        first_chunk_start(transcript, |_, text| text.contains("time for science or fiction"))
    }

    fn title(&self) -> String {
        match &self.theme {
            Some(theme) => format!("Science or Fiction: {theme}"),
            None => "Science or Fiction".to_string(),
        }
    }
}

impl Classifiable for ScienceOrFictionSegment {
    const KIND: SegmentKind = SegmentKind::ScienceOrFiction;

    fn match_string(lowercase_text: &str) -> bool {
        lowercase_text.contains("science or fiction")
    }
}

impl FromLyrics for ScienceOrFictionSegment {
    fn from_lyrics(text: &str) -> Result<Self> {
        let theme = non_empty_lines(text)
            .into_iter()
            .find(|line| line.to_lowercase().starts_with("theme:"))
            .and_then(|line| line.split(':').nth(1))
            .map(|theme| theme.trim().to_string());

        Ok(Self {
            theme,
            raw_items: Vec::new(),
        })
    }
}

impl FromShowNotes for ScienceOrFictionSegment {
    fn from_show_notes(block: &ShowNotesBlock) -> Result<Self> {
        let raw_items = block
            .siblings
            .first()
            .map(|list| list.children.clone())
            .unwrap_or_default();

        Ok(Self { theme: None, raw_items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_item(number: u32, body: &str, answer: &str) -> String {
        format!(
            r#"<div class="science-fiction__item"><span class="science-fiction__item-title">Item #{number}</span><p>{body}</p><span class="quiz__answer">{answer}</span></div>"#
        )
    }

    #[test]
    fn theme_comes_from_theme_line() -> anyhow::Result<()> {
        let segment = ScienceOrFictionSegment::from_lyrics("Science or Fiction\nTheme: Space\nItem 1")?;
        assert_eq!(segment.theme.as_deref(), Some("Space"));
        assert!(segment.raw_items.is_empty());

        let no_theme = ScienceOrFictionSegment::from_lyrics("Science or Fiction")?;
        assert_eq!(no_theme.theme, None);
        Ok(())
    }

    #[test]
    fn items_are_labelled_in_order() -> anyhow::Result<()> {
        let segment = ScienceOrFictionSegment {
            theme: None,
            raw_items: vec![
                raw_item(
                    1,
                    r#"Scientists find water on Mars. <a href="https://www.nature.com/articles/1">link</a>"#,
                    "Science",
                ),
                raw_item(2, "Bees can count to twenty.", "Fiction"),
                raw_item(3, "Octopuses dream.", "science"),
            ],
        };

        let items = segment.items()?;
        assert_eq!(items.len(), 3);

        assert_eq!(items[0].number, 1);
        assert_eq!(items[0].name, "Scientists find water on Mars.");
        assert_eq!(items[0].article_url, "https://www.nature.com/articles/1");
        assert_eq!(items[0].article_publication.as_deref(), Some("www.nature.com"));
        assert_eq!(items[0].sof_result, "science1");

        assert_eq!(items[1].sof_result, "fiction");
        assert_eq!(items[1].article_url, "");
        assert_eq!(items[1].article_publication, None);

        assert_eq!(items[2].sof_result, "science2");
        Ok(())
    }

    #[test]
    fn item_without_number_is_an_error() {
        let segment = ScienceOrFictionSegment {
            theme: None,
            raw_items: vec![
                r#"<div><span class="science-fiction__item-title">Item</span><p>x</p><span class="quiz__answer">Science</span></div>"#
                    .to_string(),
            ],
        };
        assert!(matches!(
            segment.items(),
            Err(Error::StringMatch { what: "item number", .. })
        ));
    }

    #[test]
    fn heuristic_looks_for_host_cue() {
        let transcript = [
            crate::transcript::chunk(0.0, 1.0, "Steve", "science or fiction is next"),
            crate::transcript::chunk(1.0, 2.0, "Steve", "It's time for Science or Fiction."),
        ];
        assert_eq!(ScienceOrFictionSegment::default().get_start_time(&transcript), Some(1.0));
    }
}
