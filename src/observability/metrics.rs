/// Prometheusメトリクス定義。
use std::{sync::Arc, time::Duration};

use prometheus::{
    Counter, Histogram, Registry, register_counter_with_registry,
    register_histogram_with_registry,
};

use crate::pipeline::DefaultedFields;

/// 取得元の外部プラットフォーム。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    YouTube,
    Naver,
}

/// メトリクスコレクター。
#[derive(Debug, Clone)]
pub struct Metrics {
    // カウンター
    pub items_scored: Counter,
    pub duration_defaulted: Counter,
    pub published_at_defaulted: Counter,
    pub keywords_extracted: Counter,
    pub youtube_requests: Counter,
    pub youtube_failures: Counter,
    pub naver_requests: Counter,
    pub naver_failures: Counter,

    // ヒストグラム
    pub pipeline_duration: Histogram,
    pub youtube_fetch_duration: Histogram,
    pub naver_fetch_duration: Histogram,
}

impl Metrics {
    /// 新しいメトリクスコレクターを作成し、`registry` に登録する。
    ///
    /// # Errors
    /// 同名メトリクスが既に登録されている場合はエラーを返す。
    pub fn new(registry: &Arc<Registry>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            items_scored: register_counter_with_registry!(
                "trend_items_scored_total",
                "Total number of content items scored",
                registry
            )?,
            duration_defaulted: register_counter_with_registry!(
                "trend_duration_defaulted_total",
                "Items whose duration fell back to zero seconds",
                registry
            )?,
            published_at_defaulted: register_counter_with_registry!(
                "trend_published_at_defaulted_total",
                "Items whose publish time fell back to just published",
                registry
            )?,
            keywords_extracted: register_counter_with_registry!(
                "trend_keywords_extracted_total",
                "Total number of keyword tokens extracted from titles",
                registry
            )?,
            youtube_requests: register_counter_with_registry!(
                "trend_youtube_requests_total",
                "Total number of YouTube fetch operations",
                registry
            )?,
            youtube_failures: register_counter_with_registry!(
                "trend_youtube_failures_total",
                "Total number of failed YouTube fetch operations",
                registry
            )?,
            naver_requests: register_counter_with_registry!(
                "trend_naver_requests_total",
                "Total number of Naver fetch operations",
                registry
            )?,
            naver_failures: register_counter_with_registry!(
                "trend_naver_failures_total",
                "Total number of failed Naver fetch operations",
                registry
            )?,
            pipeline_duration: register_histogram_with_registry!(
                "trend_pipeline_duration_seconds",
                "Duration of score/classify/normalize/rank runs",
                registry
            )?,
            youtube_fetch_duration: register_histogram_with_registry!(
                "trend_youtube_fetch_duration_seconds",
                "Duration of YouTube fetch operations",
                registry
            )?,
            naver_fetch_duration: register_histogram_with_registry!(
                "trend_naver_fetch_duration_seconds",
                "Duration of Naver fetch operations",
                registry
            )?,
        })
    }

    /// パイプライン1回分の結果を記録する。
    #[allow(clippy::cast_precision_loss)]
    pub fn record_pipeline_run(&self, items: usize, defaults: DefaultedFields, elapsed: Duration) {
        self.items_scored.inc_by(items as f64);
        self.duration_defaulted.inc_by(defaults.duration as f64);
        self.published_at_defaulted
            .inc_by(defaults.published_at as f64);
        self.pipeline_duration.observe(elapsed.as_secs_f64());
    }

    /// 抽出したキーワード数を記録する。
    #[allow(clippy::cast_precision_loss)]
    pub fn record_keywords(&self, tokens: usize) {
        self.keywords_extracted.inc_by(tokens as f64);
    }

    /// 外部取得1回分の結果を記録する。
    pub fn record_fetch(&self, upstream: Upstream, elapsed: Duration, succeeded: bool) {
        let (requests, failures, duration) = match upstream {
            Upstream::YouTube => (
                &self.youtube_requests,
                &self.youtube_failures,
                &self.youtube_fetch_duration,
            ),
            Upstream::Naver => (
                &self.naver_requests,
                &self.naver_failures,
                &self.naver_fetch_duration,
            ),
        };
        requests.inc();
        if !succeeded {
            failures.inc();
        }
        duration.observe(elapsed.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_pipeline_runs() {
        let registry = Arc::new(Registry::new());
        let metrics = Metrics::new(&registry).expect("metrics register");

        metrics.record_pipeline_run(
            3,
            DefaultedFields {
                duration: 1,
                published_at: 2,
            },
            Duration::from_millis(5),
        );

        assert!((metrics.items_scored.get() - 3.0).abs() < f64::EPSILON);
        assert!((metrics.duration_defaulted.get() - 1.0).abs() < f64::EPSILON);
        assert!((metrics.published_at_defaulted.get() - 2.0).abs() < f64::EPSILON);
        assert_eq!(metrics.pipeline_duration.get_sample_count(), 1);
    }

    #[test]
    fn records_fetch_failures_per_upstream() {
        let registry = Arc::new(Registry::new());
        let metrics = Metrics::new(&registry).expect("metrics register");

        metrics.record_fetch(Upstream::Naver, Duration::from_millis(10), false);
        metrics.record_fetch(Upstream::YouTube, Duration::from_millis(10), true);

        assert!((metrics.naver_failures.get() - 1.0).abs() < f64::EPSILON);
        assert!((metrics.youtube_failures.get()).abs() < f64::EPSILON);
        assert!((metrics.youtube_requests.get() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn duplicate_registration_fails() {
        let registry = Arc::new(Registry::new());
        let _first = Metrics::new(&registry).expect("first registration");
        assert!(Metrics::new(&registry).is_err());
    }
}
