/// YouTube Data API v3 クライアント。
///
/// 検索 → 詳細取得の2段階で動画を取得し、パイプライン用の [`ContentItem`] に変換します。
use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use reqwest::{Client, Url};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::{FetchError, VideoSource, ensure_success};
use crate::{
    observability::metrics::{Metrics, Upstream},
    pipeline::types::{ContentItem, Platform},
};

const PLATFORM: &str = "YouTube";
/// search / videos どちらも1リクエストあたり最大50件。
const MAX_PAGE_SIZE: usize = 50;
const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// 検索対象とする公開期間。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishedWindow {
    #[default]
    All,
    Week,
    Month,
    Year,
}

impl PublishedWindow {
    /// `now` を基準にした `publishedAfter` の値。`All` は制限なし。
    #[must_use]
    pub fn published_after(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let days = match self {
            Self::All => return None,
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
        };
        Some(now - ChronoDuration::days(days))
    }
}

/// 動画検索の条件。
#[derive(Debug, Clone, PartialEq)]
pub struct VideoQuery {
    pub query: String,
    pub region: String,
    pub max_results: usize,
    pub published_after: Option<DateTime<Utc>>,
}

impl VideoQuery {
    #[must_use]
    pub fn new(query: impl Into<String>, region: impl Into<String>, max_results: usize) -> Self {
        Self {
            query: query.into(),
            region: region.into(),
            max_results,
            published_after: None,
        }
    }

    #[must_use]
    pub fn with_window(mut self, window: PublishedWindow, now: DateTime<Utc>) -> Self {
        self.published_after = window.published_after(now);
        self
    }
}

/// 人気動画1件分のタイトルとタグ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingVideo {
    pub title: String,
    pub tags: Vec<String>,
    pub link: String,
}

/// 人気動画チャートから集めたタグ。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingVideos {
    /// 全動画のタグを出現順に連結したもの。
    pub tags: Vec<String>,
    pub videos: Vec<TrendingVideo>,
}

/// YouTube クライアントの設定。
#[derive(Clone)]
pub struct YouTubeSettings {
    pub base_url: String,
    pub api_key: String,
    pub connect_timeout: Duration,
    pub total_timeout: Duration,
}

impl fmt::Debug for YouTubeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YouTubeSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("total_timeout", &self.total_timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    #[serde(default)]
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
    #[serde(default)]
    content_details: ContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    published_at: Option<String>,
    #[serde(default)]
    thumbnails: Thumbnails,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

/// 統計値は文字列で返ってくる。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

fn watch_url(id: &str) -> String {
    format!("{WATCH_URL_PREFIX}{id}")
}

fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(0)
}

/// `publishedAt` は日付部分（YYYY-MM-DD）だけを使う。
fn publish_date(raw: &str) -> &str {
    raw.get(..10).unwrap_or(raw)
}

impl VideoResource {
    fn into_content_item(self) -> ContentItem {
        let link = watch_url(&self.id);
        let published = self
            .snippet
            .published_at
            .as_deref()
            .map(publish_date)
            .unwrap_or_default();
        let item = ContentItem::new(self.id, self.snippet.title, link, Platform::Video)
            .with_counts(
                parse_count(self.statistics.view_count.as_deref()),
                parse_count(self.statistics.like_count.as_deref()),
            )
            .with_published_at_raw(published)
            .with_duration_raw(self.content_details.duration.as_deref().unwrap_or("PT0S"));
        match self.snippet.thumbnails.medium {
            Some(thumbnail) => item.with_thumbnail(thumbnail.url),
            None => item,
        }
    }
}

/// YouTube Data API との通信を管理するクライアント。
#[derive(Clone)]
pub struct YouTubeClient {
    client: Client,
    search_url: Url,
    videos_url: Url,
    api_key: String,
    metrics: Option<Arc<Metrics>>,
}

impl fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("search_url", &self.search_url.as_str())
            .field("videos_url", &self.videos_url.as_str())
            .finish_non_exhaustive()
    }
}

impl YouTubeClient {
    /// 新しい YouTube クライアントを作成する。
    ///
    /// # Errors
    /// URLのパースまたはHTTPクライアントの構築に失敗した場合はエラーを返します。
    pub fn new(settings: YouTubeSettings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.total_timeout)
            .build()
            .context("failed to build YouTube HTTP client")?;

        let mut base = settings.base_url;
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).context("invalid YouTube base URL")?;
        let search_url = base_url
            .join("search")
            .context("failed to build YouTube search URL")?;
        let videos_url = base_url
            .join("videos")
            .context("failed to build YouTube videos URL")?;

        Ok(Self {
            client,
            search_url,
            videos_url,
            api_key: settings.api_key,
            metrics: None,
        })
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| FetchError::transport(PLATFORM, error))?;
        ensure_success(PLATFORM, response)
            .await?
            .json::<T>()
            .await
            .map_err(|error| FetchError::decode(PLATFORM, error))
    }

    /// 検索 API で動画IDを集める。`nextPageToken` を辿り、重複は除く。
    async fn search_ids(&self, query: &VideoQuery) -> Result<Vec<String>, FetchError> {
        let mut ids = Vec::new();
        let mut seen = FxHashSet::default();
        let mut page_token: Option<String> = None;
        let published_after = query
            .published_after
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true));

        while ids.len() < query.max_results {
            let page_size = (query.max_results - ids.len()).min(MAX_PAGE_SIZE);
            let mut url = self.search_url.clone();
            {
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair("part", "id");
                pairs.append_pair("type", "video");
                pairs.append_pair("q", &query.query);
                pairs.append_pair("maxResults", &page_size.to_string());
                pairs.append_pair("regionCode", &query.region);
                pairs.append_pair("order", "viewCount");
                if let Some(after) = &published_after {
                    pairs.append_pair("publishedAfter", after);
                }
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
                pairs.append_pair("key", &self.api_key);
            }

            let page: SearchResponse = self.get_json(url).await?;
            let before = ids.len();
            for video_id in page.items.into_iter().filter_map(|item| item.id.video_id) {
                if seen.insert(video_id.clone()) {
                    ids.push(video_id);
                }
            }
            debug!(
                fetched = ids.len() - before,
                total = ids.len(),
                "fetched YouTube search page"
            );

            match page.next_page_token {
                Some(token) if ids.len() > before => page_token = Some(token),
                _ => break,
            }
        }

        ids.truncate(query.max_results);
        Ok(ids)
    }

    async fn fetch_details(&self, ids: &[String]) -> Result<Vec<VideoResource>, FetchError> {
        let mut resources = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_PAGE_SIZE) {
            let mut url = self.videos_url.clone();
            url.query_pairs_mut()
                .append_pair("part", "snippet,statistics,contentDetails")
                .append_pair("id", &chunk.join(","))
                .append_pair("key", &self.api_key);
            let page: VideosResponse = self.get_json(url).await?;
            resources.extend(page.items);
        }
        Ok(resources)
    }

    async fn fetch_videos(&self, query: &VideoQuery) -> Result<Vec<ContentItem>, FetchError> {
        let ids = self.search_ids(query).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut details: FxHashMap<String, VideoResource> = self
            .fetch_details(&ids)
            .await?
            .into_iter()
            .map(|resource| (resource.id.clone(), resource))
            .collect();

        // search order wins; ids without details are dropped
        Ok(ids
            .iter()
            .filter_map(|id| details.remove(id))
            .map(VideoResource::into_content_item)
            .collect())
    }

    async fn fetch_trending(
        &self,
        region: &str,
        max_results: usize,
    ) -> Result<TrendingVideos, FetchError> {
        let mut url = self.videos_url.clone();
        url.query_pairs_mut()
            .append_pair("part", "snippet")
            .append_pair("chart", "mostPopular")
            .append_pair("regionCode", region)
            .append_pair(
                "maxResults",
                &max_results.clamp(1, MAX_PAGE_SIZE).to_string(),
            )
            .append_pair("key", &self.api_key);

        let page: VideosResponse = self.get_json(url).await?;
        let mut trending = TrendingVideos::default();
        for resource in page.items {
            trending.tags.extend(resource.snippet.tags.iter().cloned());
            trending.videos.push(TrendingVideo {
                link: watch_url(&resource.id),
                title: resource.snippet.title,
                tags: resource.snippet.tags,
            });
        }
        Ok(trending)
    }

    fn record<T>(&self, started: Instant, result: &Result<T, FetchError>) {
        if let Some(metrics) = &self.metrics {
            metrics.record_fetch(Upstream::YouTube, started.elapsed(), result.is_ok());
        }
    }
}

#[async_trait]
impl VideoSource for YouTubeClient {
    async fn search_videos(&self, query: &VideoQuery) -> Result<Vec<ContentItem>, FetchError> {
        let started = Instant::now();
        let result = self.fetch_videos(query).await;
        self.record(started, &result);
        match &result {
            Ok(items) => debug!(query = %query.query, items = items.len(), "YouTube search completed"),
            Err(error) => warn!(query = %query.query, error = %error, "YouTube search failed"),
        }
        result
    }

    async fn trending_tags(
        &self,
        region: &str,
        max_results: usize,
    ) -> Result<TrendingVideos, FetchError> {
        let started = Instant::now();
        let result = self.fetch_trending(region, max_results).await;
        self.record(started, &result);
        if let Err(error) = &result {
            warn!(region, error = %error, "YouTube trending fetch failed");
        }
        result
    }
}
