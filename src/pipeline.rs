use std::{sync::Arc, time::Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{observability::metrics::Metrics, util::time};

pub mod classify;
pub mod duration;
pub mod keywords;
pub mod normalize;
pub mod published;
pub mod rank;
pub mod score;
pub mod types;

use classify::{SHORT_FORM_MAX_SECONDS, classify};
use normalize::normalize;
use rank::{SortMode, rank, rank_in_place};
use score::{ScoreWeights, score_items};
use types::{ContentItem, NormalizedItem};

/// Tunables of the scoring pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub weights: ScoreWeights,
    pub short_form_max_seconds: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            short_form_max_seconds: SHORT_FORM_MAX_SECONDS,
        }
    }
}

/// How many items fell back to a default per field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultedFields {
    pub duration: usize,
    pub published_at: usize,
}

impl DefaultedFields {
    fn count(items: &[ContentItem]) -> Self {
        items.iter().fold(Self::default(), |mut acc, item| {
            if item.duration().is_defaulted() {
                acc.duration += 1;
            }
            if item.published_at().is_defaulted() {
                acc.published_at += 1;
            }
            acc
        })
    }
}

/// Ranked long-form and short-form lists produced by one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub sort: SortMode,
    pub long_form: Vec<NormalizedItem>,
    pub short_form: Vec<NormalizedItem>,
    #[serde(default)]
    pub defaults: DefaultedFields,
}

impl TrendReport {
    /// Re-ranks both lists without touching their scores.
    #[must_use]
    pub fn resorted(&self, mode: SortMode) -> Self {
        Self {
            sort: mode,
            long_form: rank(&self.long_form, mode),
            short_form: rank(&self.short_form, mode),
            defaults: self.defaults,
        }
    }

    #[must_use]
    pub fn into_resorted(mut self, mode: SortMode) -> Self {
        rank_in_place(&mut self.long_form, mode);
        rank_in_place(&mut self.short_form, mode);
        self.sort = mode;
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.long_form.len() + self.short_form.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.long_form.is_empty() && self.short_form.is_empty()
    }
}

/// Score, classify, normalize and rank, strictly in that order.
///
/// Holds no mutable state; one instance can serve concurrent runs.
#[derive(Debug, Clone, Default)]
pub struct TrendPipeline {
    settings: PipelineSettings,
    metrics: Option<Arc<Metrics>>,
}

impl TrendPipeline {
    #[must_use]
    pub fn new(settings: PipelineSettings) -> Self {
        Self {
            settings,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Runs the pipeline against the current clock.
    #[must_use]
    pub fn run(&self, items: Vec<ContentItem>, mode: SortMode) -> TrendReport {
        self.run_at(items, mode, time::now())
    }

    /// Runs the pipeline with ages measured from `now`.
    #[must_use]
    pub fn run_at(&self, items: Vec<ContentItem>, mode: SortMode, now: DateTime<Utc>) -> TrendReport {
        let started = Instant::now();
        let total = items.len();
        let defaults = DefaultedFields::count(&items);

        let scored = score_items(items, &self.settings.weights, now);
        let partition = classify(scored, self.settings.short_form_max_seconds);
        debug!(
            long_form = partition.long_form.len(),
            short_form = partition.short_form.len(),
            "classified scored items"
        );

        let mut long_form = normalize(partition.long_form);
        let mut short_form = normalize(partition.short_form);
        rank_in_place(&mut long_form, mode);
        rank_in_place(&mut short_form, mode);

        info!(
            items = total,
            long_form = long_form.len(),
            short_form = short_form.len(),
            duration_defaulted = defaults.duration,
            published_at_defaulted = defaults.published_at,
            sort = %mode,
            "trend pipeline completed"
        );

        if let Some(metrics) = &self.metrics {
            metrics.record_pipeline_run(total, defaults, started.elapsed());
        }

        TrendReport {
            sort: mode,
            long_form,
            short_form,
            defaults,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use types::Platform;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn video(id: &str, views: u64, likes: u64, seconds: u64, age_hours: i64) -> ContentItem {
        ContentItem::new(id, id, format!("https://www.youtube.com/watch?v={id}"), Platform::Video)
            .with_counts(views, likes)
            .with_duration_seconds(seconds)
            .with_published_at(now() - Duration::hours(age_hours))
    }

    fn ids(items: &[NormalizedItem]) -> Vec<&str> {
        items.iter().map(|item| item.item().id()).collect()
    }

    #[test]
    fn run_at_splits_normalizes_and_ranks() {
        let pipeline = TrendPipeline::default();
        let items = vec![
            video("short", 1000, 10, 30, 1),
            video("fresh", 1000, 10, 90, 1),
            video("old", 5000, 0, 200, 100),
        ];

        let report = pipeline.run_at(items, SortMode::Trend, now());

        assert_eq!(ids(&report.short_form), vec!["short"]);
        assert_eq!(ids(&report.long_form), vec!["fresh", "old"]);
        assert!((report.long_form[0].normalized_score - 100.0).abs() < f64::EPSILON);
        assert!((report.short_form[0].normalized_score - 100.0).abs() < f64::EPSILON);
        assert_eq!(report.defaults, DefaultedFields::default());
    }

    #[test]
    fn resorted_keeps_scores() {
        let pipeline = TrendPipeline::default();
        let items = vec![video("fresh", 1000, 10, 90, 1), video("old", 5000, 0, 200, 100)];
        let report = pipeline.run_at(items, SortMode::Trend, now());

        let by_views = report.resorted(SortMode::ViewCount);

        assert_eq!(by_views.sort, SortMode::ViewCount);
        assert_eq!(ids(&by_views.long_form), vec!["old", "fresh"]);
        let fresh_score = |r: &TrendReport| {
            r.long_form
                .iter()
                .find(|item| item.item().id() == "fresh")
                .map(|item| item.normalized_score)
        };
        assert_eq!(fresh_score(&report), fresh_score(&by_views));
        assert_eq!(report.clone().into_resorted(SortMode::ViewCount), by_views);
    }

    #[test]
    fn counts_defaulted_fields() {
        let pipeline = TrendPipeline::default();
        let items = vec![
            ContentItem::new("a", "a", "l", Platform::Video)
                .with_duration_raw("bogus")
                .with_published_at_raw("2026-10-18"),
            ContentItem::new("b", "b", "l", Platform::Video)
                .with_duration_raw("PT5M")
                .with_published_at_raw(""),
        ];

        let report = pipeline.run_at(items, SortMode::Trend, now());

        assert_eq!(
            report.defaults,
            DefaultedFields {
                duration: 1,
                published_at: 1
            }
        );
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let report = TrendPipeline::default().run(Vec::new(), SortMode::ViewCount);
        assert!(report.is_empty());
        assert_eq!(report.sort, SortMode::ViewCount);
    }

    #[test]
    fn custom_threshold_moves_items() {
        let pipeline = TrendPipeline::new(PipelineSettings {
            short_form_max_seconds: 180,
            ..PipelineSettings::default()
        });
        let report = pipeline.run_at(vec![video("mid", 10, 0, 120, 1)], SortMode::Trend, now());
        assert_eq!(ids(&report.short_form), vec!["mid"]);
    }
}
