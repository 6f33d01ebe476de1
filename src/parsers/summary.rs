//! The `;`-separated episode summary from the RSS feed.

use tracing::{debug, warn};

use crate::segments::Segment;
use crate::segments::registry::{Capability, Classification, classify};

/// Clauses describing the episode's format rather than a segment.
pub const SPECIAL_SUMMARY_PATTERNS: [&str; 4] = ["guest rogue", "special guest", "live from", "live recording"];

/// Parse the summary into the few segments it can describe. Everything else is dropped.
pub fn parse_summary_text(summary: &str) -> Vec<Segment> {
    summary
        .split(';')
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
        .filter_map(segment_from_clause)
        .collect()
}

fn segment_from_clause(clause: &str) -> Option<Segment> {
    let lowercase = clause.to_lowercase();

    match classify(&lowercase, Capability::Summary) {
        Classification::Found(descriptor) => {
            let ctor = descriptor.from_summary?;
            match ctor(clause) {
                Ok(data) => Some(Segment::new(data)),
                Err(err) => {
                    warn!(kind = %descriptor.kind, error = %err, clause, "failed to parse summary clause");
                    None
                }
            }
        }
        Classification::WrongCapability(kind) => {
            debug!(%kind, clause, "summary clause belongs to another source; skipping");
            None
        }
        Classification::NoMatch => {
            if is_special_summary_text(&lowercase) {
                debug!(clause, "skipping episode format clause");
            }
            None
        }
    }
}

fn is_special_summary_text(lowercase: &str) -> bool {
    SPECIAL_SUMMARY_PATTERNS.iter().any(|pattern| lowercase.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::{SegmentData, SegmentKind};

    #[test]
    fn keeps_only_summary_capable_clauses() -> anyhow::Result<()> {
        let summary = "Guest Rogue: Someone; News Items: foo, bar; \
                       Forgotten Superheroes of Science: Ada Lovelace; \
                       Skeptical Quote of the Week; Swindler's List: Fake Cures; Live from Dragon Con";
        let segments = parse_summary_text(summary);

        let kinds: Vec<_> = segments.iter().map(Segment::kind).collect();
        assert_eq!(
            kinds,
            [SegmentKind::ForgottenSuperheroesOfScience, SegmentKind::SwindlersList]
        );

        let SegmentData::ForgottenSuperheroesOfScience(fsos) = &segments[0].data else {
            anyhow::bail!("expected forgotten superheroes segment");
        };
        assert_eq!(fsos.subject, "Forgotten Superheroes of Science: Ada Lovelace");
        Ok(())
    }

    #[test]
    fn empty_summary_yields_nothing() {
        assert!(parse_summary_text("").is_empty());
        assert!(parse_summary_text(" ; ;").is_empty());
    }

    #[test]
    fn special_patterns_are_detected() {
        assert!(is_special_summary_text("special guest: jane"));
        assert!(!is_special_summary_text("news items"));
    }
}
