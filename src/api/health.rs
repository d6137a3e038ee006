use axum::{Json, extract::State};
use serde::Serialize;

use crate::app::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) struct HealthReport {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    platforms: Option<PlatformStatus>,
}

/// どの取得元が利用可能か。
#[derive(Debug, Serialize)]
struct PlatformStatus {
    youtube: bool,
    naver_search: bool,
    naver_ranking: bool,
}

/// 取得元が未設定でも、投入データのランキングは提供できるため常に ready を返す。
pub(crate) async fn ready(State(state): State<AppState>) -> Json<HealthReport> {
    state.telemetry().record_ready_probe();
    Json(HealthReport {
        status: "ready",
        platforms: Some(PlatformStatus {
            youtube: state.video_source().is_some(),
            naver_search: state.news_source().search_configured(),
            naver_ranking: true,
        }),
    })
}

pub(crate) async fn live(State(state): State<AppState>) -> Json<HealthReport> {
    state.telemetry().record_live_probe();
    Json(HealthReport {
        status: "live",
        platforms: None,
    })
}
