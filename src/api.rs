pub(crate) mod error;
pub(crate) mod health;
pub(crate) mod keywords;
pub(crate) mod metrics;
pub(crate) mod news;
pub(crate) mod videos;

use axum::{
    Router,
    routing::{get, post},
};

use crate::app::AppState;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health/ready", get(health::ready))
        .route("/health/live", get(health::live))
        .route("/metrics", get(metrics::exporter))
        .route("/v1/videos/search", get(videos::search))
        .route("/v1/videos/rank", post(videos::rank))
        .route("/v1/videos/resort", post(videos::resort))
        .route("/v1/trends/videos", get(videos::trending_tags))
        .route("/v1/trends/news", get(news::trending_keywords))
        .route("/v1/news/search", get(news::search))
        .route("/v1/news/ranking", get(news::ranking))
        .route("/v1/keywords", post(keywords::extract))
        .with_state(state)
}
