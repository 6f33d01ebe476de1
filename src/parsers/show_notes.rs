//! The episode page published on the show's website.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::segments::registry::{Capability, Classification, classify};
use crate::segments::{Segment, SegmentData, UnknownSegment};
use crate::{Error, Result};

const MAIN_SELECTOR: &str = "main.podcast-main";
const HEADING_TAG: &str = "h3";

/// An `h3` heading and the sibling elements that follow it, up to the next heading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowNotesBlock {
    /// Trimmed heading text.
    pub heading: String,
    pub siblings: Vec<ShowNotesElement>,
}

/// Owned snapshot of one element of the show-notes markup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowNotesElement {
    /// Tag name, e.g. `p` or `ul`.
    pub name: String,
    pub text: String,
    /// Outer HTML.
    pub html: String,
    /// Outer HTML of each child element, in order.
    pub children: Vec<String>,
}

impl ShowNotesElement {
    fn from_element(el: ElementRef<'_>) -> Self {
        Self {
            name: el.value().name().to_string(),
            text: el.text().collect(),
            html: el.html(),
            children: el.children().filter_map(ElementRef::wrap).map(|c| c.html()).collect(),
        }
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| Error::msg(format!("invalid selector {css:?}: {err:?}")))
}

/// Parse the show-notes page into segments, in page order.
///
/// Fails when the page lacks its main region or has no headings at all.
pub fn parse_show_notes(show_notes: &[u8]) -> Result<Vec<Segment>> {
    let html = String::from_utf8_lossy(show_notes);
    let blocks = extract_blocks(&html)?;

    Ok(blocks.iter().filter_map(segment_from_block).collect())
}

/// Group the main region's headings with their trailing sibling elements.
pub fn extract_blocks(html: &str) -> Result<Vec<ShowNotesBlock>> {
    let document = Html::parse_document(html);

    let main_sel = selector(MAIN_SELECTOR)?;
    let mut mains = document.select(&main_sel);
    let main = match (mains.next(), mains.next()) {
        (Some(main), None) => main,
        (None, _) => return Err(Error::MissingStructure(format!("no {MAIN_SELECTOR} element"))),
        (Some(_), Some(_)) => {
            return Err(Error::MissingStructure(format!("more than one {MAIN_SELECTOR} element")));
        }
    };

    let heading_sel = selector(HEADING_TAG)?;
    let blocks: Vec<ShowNotesBlock> = main
        .select(&heading_sel)
        .filter_map(|heading| {
            let text: String = heading.text().collect();
            let text = text.trim();
            if text.is_empty() {
                return None;
            }

            let siblings = heading
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .take_while(|el| el.value().name() != HEADING_TAG)
                .map(ShowNotesElement::from_element)
                .collect();

            Some(ShowNotesBlock {
                heading: text.to_string(),
                siblings,
            })
        })
        .collect();

    if blocks.is_empty() {
        return Err(Error::MissingStructure("no segment headings".to_string()));
    }

    Ok(blocks)
}

fn segment_from_block(block: &ShowNotesBlock) -> Option<Segment> {
    let lowercase = block.heading.to_lowercase();

    let data = match classify(&lowercase, Capability::ShowNotes) {
        Classification::Found(descriptor) => {
            let ctor = descriptor.from_show_notes?;
            match ctor(block) {
                Ok(data) => data,
                Err(err) => {
                    warn!(kind = %descriptor.kind, error = %err, "failed to parse show-notes block; keeping it as unknown");
                    SegmentData::Unknown(UnknownSegment::create(&block.heading))
                }
            }
        }
        Classification::WrongCapability(kind) => {
            debug!(%kind, heading = %block.heading, "heading belongs to another source; skipping");
            return None;
        }
        Classification::NoMatch => SegmentData::Unknown(UnknownSegment::create(&block.heading)),
    };

    Some(Segment::new(data))
}
