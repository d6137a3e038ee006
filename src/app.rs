use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    api,
    clients::{NaverClient, NaverSettings, NewsSource, VideoSource, YouTubeClient, YouTubeSettings},
    config::Config,
    observability::Telemetry,
    pipeline::TrendPipeline,
};

#[derive(Clone)]
pub(crate) struct AppState {
    registry: Arc<ComponentRegistry>,
}

pub struct ComponentRegistry {
    config: Arc<Config>,
    telemetry: Telemetry,
    pipeline: TrendPipeline,
    video_source: Option<Arc<dyn VideoSource>>,
    news_source: Arc<dyn NewsSource>,
}

impl AppState {
    pub(crate) fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub(crate) fn telemetry(&self) -> &Telemetry {
        &self.registry.telemetry
    }

    pub(crate) fn config(&self) -> &Config {
        &self.registry.config
    }

    pub(crate) fn pipeline(&self) -> &TrendPipeline {
        &self.registry.pipeline
    }

    /// YouTube API キー未設定の場合は `None`。
    pub(crate) fn video_source(&self) -> Option<Arc<dyn VideoSource>> {
        self.registry.video_source.clone()
    }

    pub(crate) fn news_source(&self) -> Arc<dyn NewsSource> {
        Arc::clone(&self.registry.news_source)
    }
}

impl ComponentRegistry {
    /// 構成情報から Telemetry・パイプライン・取得クライアントを初期化する。
    ///
    /// # Errors
    /// Telemetry の初期化や HTTP クライアント構築が失敗した場合はエラーを返す。
    pub fn build(config: Config) -> Result<Self> {
        let telemetry = Telemetry::new(&config.tracing_settings())?;

        let video_source: Option<Arc<dyn VideoSource>> = match config.youtube_api_key() {
            Some(api_key) => {
                let client = YouTubeClient::new(YouTubeSettings {
                    base_url: config.youtube_base_url().to_string(),
                    api_key: api_key.to_string(),
                    connect_timeout: config.http_connect_timeout(),
                    total_timeout: config.http_total_timeout(),
                })
                .context("failed to build YouTube client")?
                .with_metrics(telemetry.metrics_arc());
                Some(Arc::new(client))
            }
            None => None,
        };

        let news_client = NaverClient::new(NaverSettings {
            openapi_base_url: config.naver_openapi_base_url().to_string(),
            ranking_url: config.naver_ranking_url().to_string(),
            credentials: config.naver_credentials(),
            connect_timeout: config.http_connect_timeout(),
            total_timeout: config.http_total_timeout(),
        })
        .context("failed to build Naver client")?
        .with_metrics(telemetry.metrics_arc());

        info!(
            youtube_configured = video_source.is_some(),
            naver_search_configured = news_client.search_configured(),
            "trend worker components initialized"
        );

        Ok(Self::assemble(
            config,
            telemetry,
            video_source,
            Arc::new(news_client),
        ))
    }

    /// 取得元を差し替えてレジストリを構築する（テストや再生用）。
    ///
    /// # Errors
    /// Telemetry の初期化に失敗した場合はエラーを返す。
    pub fn with_sources(
        config: Config,
        video_source: Option<Arc<dyn VideoSource>>,
        news_source: Arc<dyn NewsSource>,
    ) -> Result<Self> {
        let telemetry = Telemetry::new(&config.tracing_settings())?;
        Ok(Self::assemble(config, telemetry, video_source, news_source))
    }

    fn assemble(
        config: Config,
        telemetry: Telemetry,
        video_source: Option<Arc<dyn VideoSource>>,
        news_source: Arc<dyn NewsSource>,
    ) -> Self {
        let pipeline =
            TrendPipeline::new(config.pipeline_settings()).with_metrics(telemetry.metrics_arc());
        Self {
            config: Arc::new(config),
            telemetry,
            pipeline,
            video_source,
            news_source,
        }
    }

    #[must_use]
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    #[must_use]
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }
}

pub fn build_router(registry: ComponentRegistry) -> Router {
    let state = AppState::new(registry);
    api::router(state).layer(TraceLayer::new_for_http())
}
