//! Types flowing through the trend pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{duration::parse_duration, normalize::NORMALIZED_MAX, published::parse_published_at};

/// Result of parsing a field that falls back to a default instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ParseOutcome<T> {
    Parsed(T),
    Defaulted(DefaultReason),
}

/// Why a field fell back to its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultReason {
    /// The source did not provide the field, or it was blank.
    Missing,
    /// The field was present but did not match any accepted format.
    Unrecognized,
}

impl<T> ParseOutcome<T> {
    #[must_use]
    pub fn parsed(&self) -> Option<&T> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Defaulted(_) => None,
        }
    }

    #[must_use]
    pub fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted(_))
    }

    #[must_use]
    pub fn default_reason(&self) -> Option<DefaultReason> {
        match self {
            Self::Parsed(_) => None,
            Self::Defaulted(reason) => Some(*reason),
        }
    }
}

/// Which platform an item was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    Video,
    News,
}

/// A video or news record at the core boundary.
///
/// Identity fields are fixed at construction; scoring produces new values
/// ([`ScoredItem`], [`NormalizedItem`]) instead of mutating the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    id: String,
    title: String,
    link: String,
    #[serde(default)]
    platform: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thumbnail: Option<String>,
    published_at: ParseOutcome<DateTime<Utc>>,
    view_count: u64,
    like_count: u64,
    duration: ParseOutcome<u64>,
}

impl ContentItem {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
        platform: Platform,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            link: link.into(),
            platform,
            thumbnail: None,
            published_at: ParseOutcome::Defaulted(DefaultReason::Missing),
            view_count: 0,
            like_count: 0,
            duration: ParseOutcome::Defaulted(DefaultReason::Missing),
        }
    }

    #[must_use]
    pub fn with_counts(mut self, view_count: u64, like_count: u64) -> Self {
        self.view_count = view_count;
        self.like_count = like_count;
        self
    }

    #[must_use]
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = ParseOutcome::Parsed(published_at);
        self
    }

    /// Parses the publish timestamp from its wire form; see [`parse_published_at`].
    #[must_use]
    pub fn with_published_at_raw(mut self, raw: &str) -> Self {
        self.published_at = parse_published_at(raw);
        self
    }

    #[must_use]
    pub fn with_duration_seconds(mut self, seconds: u64) -> Self {
        self.duration = ParseOutcome::Parsed(seconds);
        self
    }

    /// Parses a `PT#H#M#S` duration; see [`parse_duration`].
    #[must_use]
    pub fn with_duration_raw(mut self, raw: &str) -> Self {
        self.duration = parse_duration(raw);
        self
    }

    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        let thumbnail = thumbnail.into();
        self.thumbnail = (!thumbnail.is_empty()).then_some(thumbnail);
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn link(&self) -> &str {
        &self.link
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }

    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }

    #[must_use]
    pub fn published_at(&self) -> &ParseOutcome<DateTime<Utc>> {
        &self.published_at
    }

    #[must_use]
    pub fn view_count(&self) -> u64 {
        self.view_count
    }

    #[must_use]
    pub fn like_count(&self) -> u64 {
        self.like_count
    }

    #[must_use]
    pub fn duration(&self) -> &ParseOutcome<u64> {
        &self.duration
    }

    /// Effective duration; defaulted durations count as zero seconds.
    #[must_use]
    pub fn duration_seconds(&self) -> u64 {
        self.duration.parsed().copied().unwrap_or(0)
    }
}

/// Loosely typed item as callers submit it over the JSON surface.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawContentItem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub like_count: Option<u64>,
    /// `PT#H#M#S` encoding.
    #[serde(default)]
    pub duration: Option<String>,
}

impl From<RawContentItem> for ContentItem {
    fn from(raw: RawContentItem) -> Self {
        let mut item = ContentItem::new(raw.id, raw.title, raw.link, raw.platform)
            .with_counts(raw.view_count.unwrap_or(0), raw.like_count.unwrap_or(0))
            .with_published_at_raw(raw.published_at.as_deref().unwrap_or_default())
            .with_duration_raw(raw.duration.as_deref().unwrap_or_default());
        if let Some(thumbnail) = raw.thumbnail {
            item = item.with_thumbnail(thumbnail);
        }
        item
    }
}

/// How the age fed into the decay term was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeSource {
    Published,
    /// Publish time lay in the future; treated as just published.
    ClampedFuture,
    /// No usable publish time; treated as just published.
    MissingTimestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    pub age_hours: f64,
    pub age_source: AgeSource,
}

/// Item annotated with its raw decayed score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item: ContentItem,
    pub raw_score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Display emphasis derived from the normalized score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBucket {
    High,
    Medium,
    Low,
}

impl ScoreBucket {
    pub const HIGH_THRESHOLD: f64 = 80.0;
    pub const MEDIUM_THRESHOLD: f64 = 50.0;

    #[must_use]
    pub fn of(normalized_score: f64) -> Self {
        if normalized_score >= Self::HIGH_THRESHOLD {
            Self::High
        } else if normalized_score >= Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Item annotated with its per-category 0-100 score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    pub scored: ScoredItem,
    pub normalized_score: f64,
    pub bucket: ScoreBucket,
}

impl NormalizedItem {
    #[must_use]
    pub fn new(scored: ScoredItem, normalized_score: f64) -> Self {
        Self {
            scored,
            normalized_score,
            bucket: ScoreBucket::of(normalized_score),
        }
    }

    #[must_use]
    pub fn item(&self) -> &ContentItem {
        &self.scored.item
    }

    /// Whether the score lies in 0-100 and the bucket matches it.
    ///
    /// Always true for items built by `new` from a normalized score; items
    /// deserialized from caller input may violate it.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        (0.0..=NORMALIZED_MAX).contains(&self.normalized_score)
            && self.bucket == ScoreBucket::of(self.normalized_score)
    }

    #[must_use]
    pub fn raw_score(&self) -> f64 {
        self.scored.raw_score
    }
}
