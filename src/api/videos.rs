use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ApiError;
use crate::{
    app::AppState,
    clients::{FetchError, PublishedWindow, TrendingVideo, VideoQuery},
    config::MAX_RESULTS_LIMIT,
    pipeline::{
        TrendReport,
        keywords::{KeywordCount, tally_tags},
        rank::SortMode,
        types::{ContentItem, RawContentItem},
    },
    util::time,
};

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    q: Option<String>,
    region: Option<String>,
    #[serde(default)]
    window: PublishedWindow,
    max_results: Option<usize>,
    #[serde(default)]
    sort: SortMode,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchResponse {
    query: String,
    region: String,
    window: PublishedWindow,
    #[serde(flatten)]
    report: TrendReport,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RankRequest {
    items: Vec<RawContentItem>,
    #[serde(default)]
    sort: SortMode,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResortRequest {
    report: TrendReport,
    sort: SortMode,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrendParams {
    region: Option<String>,
    max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TrendingTagsResponse {
    region: String,
    keywords: Vec<KeywordCount>,
    videos: Vec<TrendingVideo>,
}

fn resolve_region(state: &AppState, region: Option<String>) -> String {
    region
        .map(|value| value.trim().to_uppercase())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| state.config().default_region().to_string())
}

fn resolve_max_results(state: &AppState, max_results: Option<usize>) -> Result<usize, ApiError> {
    let value = max_results.unwrap_or_else(|| state.config().max_results());
    if (1..=MAX_RESULTS_LIMIT).contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::bad_request(format!(
            "max_results must be between 1 and {MAX_RESULTS_LIMIT}"
        )))
    }
}

/// 検索して採点・分類・正規化・並び替えまで行う。
pub(crate) async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::bad_request("q must not be blank"));
    }
    let region = resolve_region(&state, params.region);
    let max_results = resolve_max_results(&state, params.max_results)?;
    let source = state
        .video_source()
        .ok_or(FetchError::MissingCredentials("YouTube"))?;

    let video_query =
        VideoQuery::new(query, &region, max_results).with_window(params.window, time::now());
    let items = source.search_videos(&video_query).await?;
    let report = state.pipeline().run(items, params.sort);

    info!(
        query,
        region = %region,
        items = report.len(),
        "video search ranked"
    );

    Ok(Json(SearchResponse {
        query: query.to_string(),
        region,
        window: params.window,
        report,
    }))
}

/// 呼び出し側が渡したアイテムをそのままパイプラインにかける。
pub(crate) async fn rank(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> Json<TrendReport> {
    let items: Vec<ContentItem> = request.items.into_iter().map(ContentItem::from).collect();
    Json(state.pipeline().run(items, request.sort))
}

/// 既存レポートの並び順だけを切り替える。スコアは変わらない。
///
/// 0-100 の範囲外のスコアや、スコアと食い違うバケットを含むレポートは拒否する。
pub(crate) async fn resort(
    Json(request): Json<ResortRequest>,
) -> Result<Json<TrendReport>, ApiError> {
    let report = request.report;
    if let Some(invalid) = report
        .long_form
        .iter()
        .chain(&report.short_form)
        .find(|item| !item.is_consistent())
    {
        return Err(ApiError::bad_request(format!(
            "item {} has an invalid normalized_score {} or bucket",
            invalid.item().id(),
            invalid.normalized_score
        )));
    }
    Ok(Json(report.into_resorted(request.sort)))
}

pub(crate) async fn trending_tags(
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
) -> Result<Json<TrendingTagsResponse>, ApiError> {
    let region = resolve_region(&state, params.region);
    let max_results = resolve_max_results(&state, params.max_results)?;
    let source = state
        .video_source()
        .ok_or(FetchError::MissingCredentials("YouTube"))?;

    let trending = source.trending_tags(&region, max_results).await?;
    let keywords = tally_tags(&trending.tags, state.config().top_keywords());

    Ok(Json(TrendingTagsResponse {
        region,
        keywords,
        videos: trending.videos,
    }))
}
