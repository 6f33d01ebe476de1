//! The episode outline embedded in the MP3's lyrics tag.
//!
//! The outline is a run of `Segment #N` chunks. Every chunk yields exactly one segment.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::segments::registry::{Capability, Classification, classify};
use crate::segments::{Segment, SegmentData, UnknownSegment};
use crate::{Error, Result};

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"Segment #?\d+").expect("valid segment marker regex"))
}

fn strip_regex() -> &'static Regex {
    static STRIP: OnceLock<Regex> = OnceLock::new();
    STRIP.get_or_init(|| Regex::new(r"(?i)segment #?\d+[-.:;]?").expect("valid segment strip regex"))
}

/// Split normalized lyrics into raw chunks, each starting at a `Segment #N` marker.
///
/// Text before the first marker is dropped. Concatenating the chunks gives back the input
/// from the first marker on.
pub fn split_lyric_chunks(lyrics: &str) -> Vec<&str> {
    let starts: Vec<usize> = marker_regex().find_iter(lyrics).map(|m| m.start()).collect();

    starts
        .iter()
        .enumerate()
        .map(|(idx, &start)| {
            let end = starts.get(idx + 1).copied().unwrap_or(lyrics.len());
            &lyrics[start..end]
        })
        .collect()
}

/// Parse the lyrics outline into segments, in narrative order.
///
/// Fails only when a chunk matches a variant that cannot be built from lyrics.
pub fn parse_lyrics(lyrics: &str) -> Result<Vec<Segment>> {
    let lyrics = lyrics.replace('\r', "\n");

    split_lyric_chunks(&lyrics)
        .into_iter()
        .map(|chunk| segment_from_chunk(chunk.trim()))
        .collect()
}

fn segment_from_chunk(chunk: &str) -> Result<Segment> {
    let text = strip_regex().replace_all(chunk, "");
    let text = text.trim();
    let lowercase = text.to_lowercase();

    let data = match classify(&lowercase, Capability::Lyrics) {
        Classification::Found(descriptor) => {
            let Some(ctor) = descriptor.from_lyrics else {
                return Err(Error::CapabilityMismatch {
                    kind: descriptor.kind,
                    text: text.to_string(),
                });
            };

            match ctor(text) {
                Ok(data) => data,
                Err(err) => {
                    warn!(kind = %descriptor.kind, error = %err, "failed to parse lyric chunk; keeping it as unknown");
                    SegmentData::Unknown(UnknownSegment::create(text))
                }
            }
        }
        Classification::WrongCapability(kind) => {
            return Err(Error::CapabilityMismatch {
                kind,
                text: text.to_string(),
            });
        }
        Classification::NoMatch => SegmentData::Unknown(UnknownSegment::create(text)),
    };

    let segment = Segment::new(data);
    debug!(kind = %segment.kind(), title = %segment.title(), "parsed lyric chunk");
    Ok(segment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::SegmentKind;

    fn kinds(segments: &[Segment]) -> Vec<SegmentKind> {
        segments.iter().map(Segment::kind).collect()
    }

    #[test]
    fn one_segment_per_chunk() -> anyhow::Result<()> {
        let lyrics = "Preamble\rSegment #1\rNews Item #1 - Foo\rhttp://x.test\r\
                      Segment #2\rSkeptical Quote of the Week\rA quote\rSomeone\r\
                      Segment #3: Something brand new\r";
        let segments = parse_lyrics(lyrics)?;

        assert_eq!(
            kinds(&segments),
            [SegmentKind::NewsMeta, SegmentKind::Quote, SegmentKind::Unknown]
        );

        let SegmentData::Unknown(unknown) = &segments[2].data else {
            anyhow::bail!("expected unknown segment");
        };
        assert_eq!(unknown.title, "Something brand new");
        Ok(())
    }

    #[test]
    fn chunks_reconstruct_input_from_first_marker() {
        let lyrics = "intro text\nSegment #1\nfoo\nSegment 2\nbar\nSegment #10 baz";
        let chunks = split_lyric_chunks(lyrics);
        assert_eq!(chunks.len(), 3);

        let first_marker = lyrics.find("Segment").unwrap_or_default();
        assert_eq!(chunks.concat(), &lyrics[first_marker..]);
    }

    #[test]
    fn no_markers_means_no_segments() -> anyhow::Result<()> {
        assert!(parse_lyrics("just some text\nwith no outline")?.is_empty());
        assert!(parse_lyrics("")?.is_empty());
        Ok(())
    }

    #[test]
    fn lowercase_marker_does_not_split() {
        assert_eq!(split_lyric_chunks("Segment #1 a segment 2 b").len(), 1);
    }

    #[test]
    fn failed_constructor_degrades_to_unknown() -> anyhow::Result<()> {
        let segments = parse_lyrics("Segment #1\nFrom TikTok")?;
        assert_eq!(kinds(&segments), [SegmentKind::Unknown]);

        let segments = parse_lyrics("Segment #1\nNews Item #3")?;
        assert_eq!(kinds(&segments), [SegmentKind::Unknown]);
        Ok(())
    }

    #[test]
    fn marker_punctuation_is_stripped() -> anyhow::Result<()> {
        let segments = parse_lyrics("Segment #4- Who's That Noisy?")?;
        assert_eq!(kinds(&segments), [SegmentKind::Noisy]);
        Ok(())
    }
}
