//! Reconcile the three parsed sources into one ordered segment list.
//!
//! The lyrics outline is authoritative for order and membership. The show notes only
//! contribute data the outline never carries.

use tracing::error;

use crate::segments::{Segment, SegmentData};

/// Merge the parsed sources. Output follows the lyrics' narrative order with news flattened.
pub fn merge_segments(lyrics: Vec<Segment>, show_notes: &[Segment], summary: &[Segment]) -> Vec<Segment> {
    for source in [lyrics.as_slice(), show_notes, summary] {
        report_duplicates(source);
    }

    let mut segments = flatten_news(lyrics);
    merge_noisy(&mut segments, show_notes);
    merge_science_or_fiction(&mut segments, show_notes);
    segments
}

/// Log every segment equal to an earlier one in the same list. Nothing is removed.
pub fn report_duplicates(segments: &[Segment]) -> usize {
    let mut duplicates = 0;
    for (idx, segment) in segments.iter().enumerate() {
        if segments[..idx].contains(segment) {
            error!(kind = %segment.kind(), title = %segment.title(), "found duplicate segment");
            duplicates += 1;
        }
    }
    duplicates
}

/// Replace every news container with one segment per news item, in place.
pub fn flatten_news(segments: Vec<Segment>) -> Vec<Segment> {
    let mut flattened = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            Segment {
                data: SegmentData::NewsMeta(meta),
                ..
            } => flattened.extend(meta.news_items.into_iter().map(Segment::new)),
            other => flattened.push(other),
        }
    }
    flattened
}

fn merge_noisy(segments: &mut [Segment], show_notes: &[Segment]) {
    let answer = show_notes.iter().find_map(|s| match &s.data {
        SegmentData::Noisy(noisy) => Some(&noisy.last_week_answer),
        _ => None,
    });
    let target = segments.iter_mut().find_map(|s| match &mut s.data {
        SegmentData::Noisy(noisy) => Some(noisy),
        _ => None,
    });

    if let (Some(target), Some(answer)) = (target, answer) {
        target.last_week_answer = answer.clone();
    }
}

fn merge_science_or_fiction(segments: &mut [Segment], show_notes: &[Segment]) {
    let items = show_notes.iter().find_map(|s| match &s.data {
        SegmentData::ScienceOrFiction(sof) => Some(&sof.raw_items),
        _ => None,
    });
    let target = segments.iter_mut().find_map(|s| match &mut s.data {
        SegmentData::ScienceOrFiction(sof) => Some(sof),
        _ => None,
    });

    if let (Some(target), Some(items)) = (target, items) {
        target.raw_items = items.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::{
        InterviewSegment, NewsItem, NewsMetaSegment, NoisySegment, QuoteSegment, ScienceOrFictionSegment,
        SegmentKind,
    };

    fn news_item(item_number: u32, topic: &str) -> NewsItem {
        NewsItem {
            item_number,
            topic: topic.to_string(),
            url: None,
        }
    }

    fn quote() -> Segment {
        Segment::new(QuoteSegment {
            quote: "q".to_string(),
            attribution: "a".to_string(),
        })
    }

    #[test]
    fn news_is_flattened_in_place() {
        let lyrics = vec![
            Segment::new(NewsMetaSegment {
                news_items: vec![news_item(1, "Foo"), news_item(2, "Bar")],
            }),
            quote(),
        ];

        let merged = merge_segments(lyrics, &[], &[]);
        let kinds: Vec<_> = merged.iter().map(Segment::kind).collect();
        assert_eq!(kinds, [SegmentKind::NewsItem, SegmentKind::NewsItem, SegmentKind::Quote]);
        assert_eq!(merged[1].title(), "Bar");
    }

    #[test]
    fn noisy_answer_is_backfilled_from_show_notes() {
        let lyrics = vec![Segment::new(NoisySegment::default()), quote()];
        let show_notes = vec![Segment::new(NoisySegment {
            last_week_answer: "a loon".to_string(),
        })];

        let merged = merge_segments(lyrics, &show_notes, &[]);
        assert_eq!(merged.len(), 2);
        assert_eq!(
            merged[0].data,
            SegmentData::Noisy(NoisySegment {
                last_week_answer: "a loon".to_string()
            })
        );
    }

    #[test]
    fn science_or_fiction_items_are_backfilled_and_theme_kept() {
        let lyrics = vec![Segment::new(ScienceOrFictionSegment {
            theme: Some("Space".to_string()),
            raw_items: Vec::new(),
        })];
        let show_notes = vec![Segment::new(ScienceOrFictionSegment {
            theme: None,
            raw_items: vec!["<li>1</li>".to_string()],
        })];

        let merged = merge_segments(lyrics, &show_notes, &[]);
        let SegmentData::ScienceOrFiction(sof) = &merged[0].data else {
            panic!("expected science or fiction");
        };
        assert_eq!(sof.theme.as_deref(), Some("Space"));
        assert_eq!(sof.raw_items, ["<li>1</li>"]);
    }

    #[test]
    fn show_notes_only_segments_are_not_added() {
        let show_notes = vec![Segment::new(InterviewSegment {
            name: "Jane".to_string(),
            url: String::new(),
        })];
        let merged = merge_segments(vec![quote()], &show_notes, &[]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn duplicates_are_counted_not_removed() {
        let lyrics = vec![quote(), Segment::new(NoisySegment::default()), quote(), quote()];
        assert_eq!(report_duplicates(&lyrics), 2);
        assert_eq!(merge_segments(lyrics, &[], &[]).len(), 4);
    }
}
