use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::{
    app::AppState,
    clients::{
        NewsArticle, NewsCategory, NewsSort, RankedHeadline,
        naver::{DEFAULT_RANKING_LIMIT, DEFAULT_SEARCH_DISPLAY, DEFAULT_SEARCH_QUERY, MAX_DISPLAY},
    },
    pipeline::keywords::{KeywordCount, extract_keywords, top_keywords},
};

#[derive(Debug, Deserialize)]
pub(crate) struct NewsTrendParams {
    #[serde(default)]
    category: NewsCategory,
    #[serde(default)]
    sort: NewsSort,
    query: Option<String>,
    max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewsTrendResponse {
    category: NewsCategory,
    query: String,
    keywords: Vec<KeywordCount>,
    articles: Vec<NewsArticle>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewsSearchParams {
    query: Option<String>,
    #[serde(default)]
    sort: NewsSort,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewsSearchResponse {
    query: String,
    articles: Vec<NewsArticle>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RankingParams {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RankingResponse {
    headlines: Vec<RankedHeadline>,
}

/// ニュース検索結果のタイトルから頻出キーワードを集計する。
pub(crate) async fn trending_keywords(
    State(state): State<AppState>,
    Query(params): Query<NewsTrendParams>,
) -> Result<Json<NewsTrendResponse>, ApiError> {
    let query = params.category.resolve_query(params.query.as_deref());
    let display = params.max_results.unwrap_or(DEFAULT_SEARCH_DISPLAY);
    if !(1..=MAX_DISPLAY).contains(&display) {
        return Err(ApiError::bad_request(format!(
            "max_results must be between 1 and {MAX_DISPLAY}"
        )));
    }

    let articles = state
        .news_source()
        .search_news(&query, display, params.sort)
        .await?;

    let tokens = extract_keywords(articles.iter().map(|article| article.title.as_str()));
    state.telemetry().metrics().record_keywords(tokens.len());
    let keywords = top_keywords(&tokens, state.config().top_keywords());

    Ok(Json(NewsTrendResponse {
        category: params.category,
        query,
        keywords,
        articles,
    }))
}

pub(crate) async fn search(
    State(state): State<AppState>,
    Query(params): Query<NewsSearchParams>,
) -> Result<Json<NewsSearchResponse>, ApiError> {
    let query = params
        .query
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_SEARCH_QUERY.to_string());

    let articles = state
        .news_source()
        .search_news(&query, DEFAULT_SEARCH_DISPLAY, params.sort)
        .await?;

    Ok(Json(NewsSearchResponse { query, articles }))
}

pub(crate) async fn ranking(
    State(state): State<AppState>,
    Query(params): Query<RankingParams>,
) -> Result<Json<RankingResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_RANKING_LIMIT);
    let headlines = state.news_source().ranking_news(limit).await?;
    Ok(Json(RankingResponse { headlines }))
}
