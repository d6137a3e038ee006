use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    app::AppState,
    pipeline::keywords::{KeywordCount, extract_keywords, top_keywords},
};

#[derive(Debug, Deserialize)]
pub(crate) struct KeywordRequest {
    #[serde(default)]
    titles: Vec<String>,
    top: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct KeywordResponse {
    tokens: Vec<String>,
    keywords: Vec<KeywordCount>,
}

pub(crate) async fn extract(
    State(state): State<AppState>,
    Json(request): Json<KeywordRequest>,
) -> Json<KeywordResponse> {
    let tokens = extract_keywords(&request.titles);
    state.telemetry().metrics().record_keywords(tokens.len());
    let keywords = top_keywords(
        &tokens,
        request.top.unwrap_or_else(|| state.config().top_keywords()),
    );
    Json(KeywordResponse { tokens, keywords })
}
