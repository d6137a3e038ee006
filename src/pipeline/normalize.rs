//! Per-category rescaling of raw scores into 0-100.

use super::types::{NormalizedItem, ScoredItem};

pub const NORMALIZED_MAX: f64 = 100.0;

/// Rescales raw scores against the category maximum, rounded to one decimal.
///
/// An empty list stays empty; when the maximum is not positive every item is
/// normalized to 0 instead of dividing by zero.
#[must_use]
pub fn normalize(items: Vec<ScoredItem>) -> Vec<NormalizedItem> {
    let max_score = items
        .iter()
        .map(|scored| scored.raw_score)
        .fold(0.0_f64, f64::max);

    items
        .into_iter()
        .map(|scored| {
            let normalized = if max_score > 0.0 {
                round_one_decimal(scored.raw_score / max_score * NORMALIZED_MAX)
                    .clamp(0.0, NORMALIZED_MAX)
            } else {
                0.0
            };
            NormalizedItem::new(scored, normalized)
        })
        .collect()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{AgeSource, ContentItem, Platform, ScoreBreakdown};
    use proptest::prelude::*;

    fn scored(raw_scores: &[f64]) -> Vec<ScoredItem> {
        raw_scores
            .iter()
            .enumerate()
            .map(|(index, raw)| ScoredItem {
                item: ContentItem::new(format!("v{index}"), "t", "l", Platform::Video),
                raw_score: *raw,
                breakdown: ScoreBreakdown {
                    base: *raw,
                    age_hours: 0.0,
                    age_source: AgeSource::Published,
                },
            })
            .collect()
    }

    fn scores(items: &[NormalizedItem]) -> Vec<f64> {
        items.iter().map(|item| item.normalized_score).collect()
    }

    #[test]
    fn empty_category_is_noop() {
        assert!(normalize(Vec::new()).is_empty());
    }

    #[test]
    fn rescales_against_maximum() {
        let normalized = normalize(scored(&[50.0, 200.0, 12.345]));
        assert_eq!(scores(&normalized), vec![25.0, 100.0, 6.2]);
    }

    #[test]
    fn all_zero_scores_normalize_to_zero() {
        let normalized = normalize(scored(&[0.0, 0.0, 0.0]));
        assert_eq!(scores(&normalized), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn keeps_input_order_and_items() {
        let normalized = normalize(scored(&[1.0, 3.0, 2.0]));
        let ids: Vec<&str> = normalized.iter().map(|item| item.item().id()).collect();
        assert_eq!(ids, vec!["v0", "v1", "v2"]);
        assert!((normalized[0].raw_score() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn buckets_follow_normalized_score() {
        use crate::pipeline::types::ScoreBucket;

        let normalized = normalize(scored(&[100.0, 60.0, 10.0]));
        let buckets: Vec<ScoreBucket> = normalized.iter().map(|item| item.bucket).collect();
        assert_eq!(
            buckets,
            vec![ScoreBucket::High, ScoreBucket::Medium, ScoreBucket::Low]
        );
    }

    proptest! {
        #[test]
        fn normalized_scores_are_bounded_with_max_at_100(
            raw in proptest::collection::vec(0.0f64..1e12, 1..50),
        ) {
            let normalized = normalize(scored(&raw));
            let values = scores(&normalized);
            for value in &values {
                prop_assert!((0.0..=100.0).contains(value));
            }

            let max_raw = raw.iter().copied().fold(0.0, f64::max);
            let max_normalized = values.iter().copied().fold(0.0, f64::max);
            if max_raw > 0.0 {
                prop_assert!((max_normalized - 100.0).abs() < f64::EPSILON);
            } else {
                prop_assert!(values.iter().all(|value| *value == 0.0));
            }
        }
    }
}
