//! Time-decayed popularity scoring (Hacker News style gravity).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{AgeSource, ContentItem, ParseOutcome, ScoreBreakdown, ScoredItem};

/// Engagement weights and decay parameters.
///
/// `comment` is kept for parity with the scoring formula, but comment volume
/// is not available from the video details endpoint, so its term is always 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub view: f64,
    pub like: f64,
    pub comment: f64,
    pub gravity: f64,
    pub age_offset_hours: f64,
}

impl ScoreWeights {
    pub const DEFAULT_VIEW: f64 = 1.0;
    pub const DEFAULT_LIKE: f64 = 30.0;
    pub const DEFAULT_COMMENT: f64 = 100.0;
    pub const DEFAULT_GRAVITY: f64 = 1.8;
    pub const DEFAULT_AGE_OFFSET_HOURS: f64 = 2.0;
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            view: Self::DEFAULT_VIEW,
            like: Self::DEFAULT_LIKE,
            comment: Self::DEFAULT_COMMENT,
            gravity: Self::DEFAULT_GRAVITY,
            age_offset_hours: Self::DEFAULT_AGE_OFFSET_HOURS,
        }
    }
}

/// Age in fractional hours, clamped at zero.
///
/// Future timestamps (clock skew) and missing timestamps both count as just
/// published, which gives the item the maximal freshness boost.
#[must_use]
pub fn age_hours(
    published_at: &ParseOutcome<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (f64, AgeSource) {
    let Some(published_at) = published_at.parsed() else {
        return (0.0, AgeSource::MissingTimestamp);
    };

    #[allow(clippy::cast_precision_loss)]
    let hours = (now - *published_at).num_milliseconds() as f64 / 3_600_000.0;
    if hours < 0.0 {
        (0.0, AgeSource::ClampedFuture)
    } else {
        (hours, AgeSource::Published)
    }
}

/// Weighted engagement before decay. The comment count is always zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn base_score(item: &ContentItem, weights: &ScoreWeights) -> f64 {
    let comment_count = 0.0;
    item.view_count() as f64 * weights.view
        + item.like_count() as f64 * weights.like
        + comment_count * weights.comment
}

/// Scores one item: `base / (age_hours + offset) ^ gravity`.
#[must_use]
pub fn score_item(item: ContentItem, weights: &ScoreWeights, now: DateTime<Utc>) -> ScoredItem {
    let base = base_score(&item, weights);
    let (age_hours, age_source) = age_hours(item.published_at(), now);
    let raw_score = base / (age_hours + weights.age_offset_hours).powf(weights.gravity);

    ScoredItem {
        item,
        raw_score,
        breakdown: ScoreBreakdown {
            base,
            age_hours,
            age_source,
        },
    }
}

/// Scores every item in input order.
#[must_use]
pub fn score_items(
    items: Vec<ContentItem>,
    weights: &ScoreWeights,
    now: DateTime<Utc>,
) -> Vec<ScoredItem> {
    items
        .into_iter()
        .map(|item| score_item(item, weights, now))
        .collect()
}
