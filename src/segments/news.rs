//! News items. The lyrics list all of an episode's news under one chunk; the merger later
//! flattens that [`NewsMetaSegment`] into one [`NewsItem`] per story.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::{Classifiable, FromLyrics, SegmentBehavior, SegmentKind};
use crate::text::{is_url, non_empty_lines};
use crate::transcript::TranscriptChunk;
use crate::{Error, Result};

/// A single news story.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
    pub item_number: u32,
    pub topic: String,
    pub url: Option<String>,
}

impl SegmentBehavior for NewsItem {
    fn kind(&self) -> SegmentKind {
        SegmentKind::NewsItem
    }

    fn llm_prompt(&self) -> String {
        format!(
            "Please identify the start of the news segment whose topic is: {}",
            self.topic
        )
    }

    // News transitions are too varied to spot from keywords; always defer to the oracle.
    fn get_start_time(&self, _transcript: &[TranscriptChunk]) -> Option<f64> {
        None
    }

    fn title(&self) -> String {
        self.topic.clone()
    }
}

/// Container for every news item of an episode. Never reaches the aligner.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewsMetaSegment {
    pub news_items: Vec<NewsItem>,
}

impl SegmentBehavior for NewsMetaSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::NewsMeta
    }

    fn llm_prompt(&self) -> String {
        "Please identify the start of the news segment.".to_string()
    }

    fn get_start_time(&self, _transcript: &[TranscriptChunk]) -> Option<f64> {
        None
    }

    fn title(&self) -> String {
        "News Items".to_string()
    }
}

impl Classifiable for NewsMetaSegment {
    const KIND: SegmentKind = SegmentKind::NewsMeta;

    fn match_string(lowercase_text: &str) -> bool {
        lowercase_text.starts_with("news item")
    }
}

impl FromLyrics for NewsMetaSegment {
    fn from_lyrics(text: &str) -> Result<Self> {
        static TOPIC: OnceLock<Regex> = OnceLock::new();
        let topic_re = TOPIC.get_or_init(|| {
            Regex::new(r"(?i)news items? ?[#$]?\d+\s*.\s*(.+)").expect("valid news item regex")
        });

        let lines = non_empty_lines(text);
        let mut news_items = Vec::new();

        for (idx, line) in lines.iter().enumerate() {
            if !line.to_lowercase().contains("news item") {
                continue;
            }

            let Some(topic) = topic_re.captures(line).and_then(|caps| caps.get(1)) else {
                // A bare "News Items" header carries no story of its own.
                if !line.chars().any(|c| c.is_ascii_digit()) {
                    debug!(line, "skipping news header line");
                    continue;
                }
                return Err(Error::string_match("news item topic", *line));
            };

            let url = lines
                .get(idx + 1)
                .filter(|next| is_url(next))
                .map(|next| next.to_string());

            news_items.push(NewsItem {
                item_number: news_items.len() as u32 + 1,
                topic: topic.as_str().trim().to_string(),
                url,
            });
        }

        Ok(Self { news_items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbered_items_with_following_urls() -> anyhow::Result<()> {
        let text = "News Items\n\
                    News Item #1 - Foo\n\
                    http://x.test\n\
                    News Item #2: Bar Baz\n\
                    News Item 3 – Qux";
        let meta = NewsMetaSegment::from_lyrics(text)?;

        assert_eq!(
            meta.news_items,
            vec![
                NewsItem {
                    item_number: 1,
                    topic: "Foo".to_string(),
                    url: Some("http://x.test".to_string()),
                },
                NewsItem {
                    item_number: 2,
                    topic: "Bar Baz".to_string(),
                    url: None,
                },
                NewsItem {
                    item_number: 3,
                    topic: "Qux".to_string(),
                    url: None,
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn first_line_may_itself_be_an_item() -> anyhow::Result<()> {
        let meta = NewsMetaSegment::from_lyrics("News Item #1 - Foo\nhttp://x.test")?;
        assert_eq!(meta.news_items.len(), 1);
        assert_eq!(meta.news_items[0].topic, "Foo");
        Ok(())
    }

    #[test]
    fn numbered_line_without_topic_is_an_error() {
        let err = NewsMetaSegment::from_lyrics("News Items\nNews Item #4").unwrap_err();
        assert!(matches!(err, Error::StringMatch { .. }));
    }

    #[test]
    fn news_items_never_match_heuristically() {
        let item = NewsItem {
            item_number: 1,
            topic: "Foo".to_string(),
            url: None,
        };
        let transcript = [crate::transcript::chunk(0.0, 1.0, "Steve", "foo news item")];
        assert_eq!(item.get_start_time(&transcript), None);
        assert!(item.llm_prompt().ends_with("topic is: Foo"));
    }
}
