//! Ordering of a normalized category.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::types::NormalizedItem;

/// Sort key for a ranked category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortMode {
    /// Descending normalized trend score.
    #[default]
    #[serde(rename = "trend")]
    Trend,
    /// Descending raw view count.
    #[serde(rename = "viewCount")]
    ViewCount,
}

impl SortMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trend => "trend",
            Self::ViewCount => "viewCount",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort mode: {0} (expected `trend` or `viewCount`)")]
pub struct UnknownSortMode(pub String);

impl FromStr for SortMode {
    type Err = UnknownSortMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "trend" => Ok(Self::Trend),
            "viewCount" => Ok(Self::ViewCount),
            other => Err(UnknownSortMode(other.to_string())),
        }
    }
}

/// Returns a new ordering of `items` for `mode`.
///
/// The sort is stable and has no secondary key: items with equal keys keep
/// their relative input order.
#[must_use]
pub fn rank(items: &[NormalizedItem], mode: SortMode) -> Vec<NormalizedItem> {
    let mut ranked = items.to_vec();
    rank_in_place(&mut ranked, mode);
    ranked
}

/// In-place variant of [`rank`] for callers that own the list.
pub fn rank_in_place(items: &mut [NormalizedItem], mode: SortMode) {
    match mode {
        SortMode::Trend => {
            items.sort_by(|a, b| b.normalized_score.total_cmp(&a.normalized_score));
        }
        SortMode::ViewCount => {
            items.sort_by(|a, b| b.item().view_count().cmp(&a.item().view_count()));
        }
    }
}
