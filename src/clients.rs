//! 外部プラットフォーム（YouTube / Naver）からの取得クライアント。
pub mod naver;
pub mod youtube;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::pipeline::types::ContentItem;

pub use naver::{NaverClient, NaverSettings, NewsArticle, NewsCategory, NewsSort, RankedHeadline};
pub use youtube::{
    PublishedWindow, TrendingVideo, TrendingVideos, VideoQuery, YouTubeClient, YouTubeSettings,
};

/// 取得処理の失敗。
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{platform} request failed: {source}")]
    Transport {
        platform: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{platform} returned error status {status}: {body}")]
    Status {
        platform: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("failed to decode {platform} response: {source}")]
    Decode {
        platform: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("{0} credentials are not configured")]
    MissingCredentials(&'static str),
}

impl FetchError {
    pub(crate) fn transport(platform: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { platform, source }
    }

    pub(crate) fn decode(platform: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Decode {
            platform,
            source: source.into(),
        }
    }
}

/// 非成功ステータスを [`FetchError::Status`] に変換する。
pub(crate) async fn ensure_success(
    platform: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(FetchError::Status {
        platform,
        status,
        body,
    })
}

/// 動画の検索と人気動画タグの取得。
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn search_videos(&self, query: &VideoQuery) -> Result<Vec<ContentItem>, FetchError>;

    async fn trending_tags(
        &self,
        region: &str,
        max_results: usize,
    ) -> Result<TrendingVideos, FetchError>;
}

/// ニュース検索とランキング見出しの取得。
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn search_news(
        &self,
        query: &str,
        display: usize,
        sort: NewsSort,
    ) -> Result<Vec<NewsArticle>, FetchError>;

    async fn ranking_news(&self, limit: usize) -> Result<Vec<RankedHeadline>, FetchError>;

    /// 検索 API の認証情報が揃っているか。
    fn search_configured(&self) -> bool;
}
