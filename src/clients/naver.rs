/// Naver ニュースクライアント。
///
/// 検索 Open API（要認証）とランキングページのスクレイピングを扱います。
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{FetchError, NewsSource, ensure_success};
use crate::{
    config::NaverCredentials,
    observability::metrics::{Metrics, Upstream},
    pipeline::{published::parse_published_at, types::ParseOutcome},
    util::text::strip_markup,
};

const PLATFORM: &str = "Naver";
const CLIENT_ID_HEADER: &str = "X-Naver-Client-Id";
const CLIENT_SECRET_HEADER: &str = "X-Naver-Client-Secret";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
/// 検索 API の `display` 上限。
/// 検索 API が一度に返せる最大件数。
pub const MAX_DISPLAY: usize = 100;

pub const DEFAULT_SEARCH_QUERY: &str = "속보";
pub const DEFAULT_SEARCH_DISPLAY: usize = 100;
pub const DEFAULT_RANKING_LIMIT: usize = 50;

static LIST_TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.list_title").expect("ranking selector parses"));

/// 検索結果の並び順。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsSort {
    /// 新しい順
    #[default]
    Date,
    /// 関連度順
    Sim,
}

impl NewsSort {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Sim => "sim",
        }
    }
}

/// トレンド集計の既定検索語を決めるカテゴリ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    #[default]
    News,
    Sports,
}

impl NewsCategory {
    #[must_use]
    pub fn default_query(self) -> &'static str {
        match self {
            Self::News => "최신",
            Self::Sports => "스포츠",
        }
    }

    /// 空でない `custom` を優先し、無ければカテゴリの既定検索語を使う。
    #[must_use]
    pub fn resolve_query(self, custom: Option<&str>) -> String {
        custom
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .unwrap_or_else(|| self.default_query())
            .to_string()
    }
}

/// 検索 API から得たニュース記事。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub link: String,
    pub published_at: ParseOutcome<DateTime<Utc>>,
}

/// ランキングページの見出し。`rank` は1始まり。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedHeadline {
    pub rank: usize,
    pub title: String,
    pub link: String,
}

/// Naver クライアントの設定。
#[derive(Debug, Clone)]
pub struct NaverSettings {
    pub openapi_base_url: String,
    pub ranking_url: String,
    /// 未設定の場合、検索は [`FetchError::MissingCredentials`] になる。ランキングは利用可能。
    pub credentials: Option<NaverCredentials>,
    pub connect_timeout: Duration,
    pub total_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    originallink: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    pub_date: String,
}

impl From<SearchItem> for NewsArticle {
    fn from(item: SearchItem) -> Self {
        let link = if item.originallink.trim().is_empty() {
            item.link
        } else {
            item.originallink
        };
        Self {
            title: strip_markup(&item.title),
            description: strip_markup(&item.description),
            link,
            published_at: parse_published_at(&item.pub_date),
        }
    }
}

/// ランキングページの HTML から `a.list_title` を抽出する。
///
/// `href` を持つアンカーだけを文書順に最大 `limit` 件返す。
/// `href` のないアンカーは件数上限より先に除外されるため、枠を消費しない。
#[must_use]
pub fn parse_ranking_page(html: &str, limit: usize) -> Vec<RankedHeadline> {
    let document = Html::parse_document(html);
    document
        .select(&LIST_TITLE_SELECTOR)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?.trim();
            if href.is_empty() {
                return None;
            }
            let title = anchor.text().collect::<Vec<_>>().join(" ");
            let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
            Some((title, href.to_string()))
        })
        .take(limit)
        .enumerate()
        .map(|(index, (title, link))| RankedHeadline {
            rank: index + 1,
            title,
            link,
        })
        .collect()
}

/// Naver との通信を管理するクライアント。
#[derive(Debug, Clone)]
pub struct NaverClient {
    client: Client,
    search_url: Url,
    ranking_url: Url,
    credentials: Option<NaverCredentials>,
    metrics: Option<Arc<Metrics>>,
}

impl NaverClient {
    /// 新しい Naver クライアントを作成する。
    ///
    /// # Errors
    /// URLのパースまたはHTTPクライアントの構築に失敗した場合はエラーを返します。
    pub fn new(settings: NaverSettings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.total_timeout)
            .build()
            .context("failed to build Naver HTTP client")?;

        let mut base = settings.openapi_base_url;
        if !base.ends_with('/') {
            base.push('/');
        }
        let search_url = Url::parse(&base)
            .context("invalid Naver Open API base URL")?
            .join("v1/search/news.json")
            .context("failed to build Naver search URL")?;
        let ranking_url =
            Url::parse(&settings.ranking_url).context("invalid Naver ranking URL")?;

        Ok(Self {
            client,
            search_url,
            ranking_url,
            credentials: settings.credentials,
            metrics: None,
        })
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    async fn fetch_search(
        &self,
        query: &str,
        display: usize,
        sort: NewsSort,
    ) -> Result<Vec<NewsArticle>, FetchError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(FetchError::MissingCredentials(PLATFORM))?;

        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("display", &display.clamp(1, MAX_DISPLAY).to_string())
            .append_pair("sort", sort.as_str());

        let response = self
            .client
            .get(url)
            .header(CLIENT_ID_HEADER, &credentials.client_id)
            .header(CLIENT_SECRET_HEADER, &credentials.client_secret)
            .send()
            .await
            .map_err(|error| FetchError::transport(PLATFORM, error))?;

        let page = ensure_success(PLATFORM, response)
            .await?
            .json::<SearchResponse>()
            .await
            .map_err(|error| FetchError::decode(PLATFORM, error))?;

        Ok(page.items.into_iter().map(NewsArticle::from).collect())
    }

    async fn fetch_ranking(&self, limit: usize) -> Result<Vec<RankedHeadline>, FetchError> {
        let response = self
            .client
            .get(self.ranking_url.clone())
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(|error| FetchError::transport(PLATFORM, error))?;

        let html = ensure_success(PLATFORM, response)
            .await?
            .text()
            .await
            .map_err(|error| FetchError::decode(PLATFORM, error))?;

        Ok(parse_ranking_page(&html, limit))
    }

    fn record<T>(&self, started: Instant, result: &Result<T, FetchError>) {
        if let Some(metrics) = &self.metrics {
            metrics.record_fetch(Upstream::Naver, started.elapsed(), result.is_ok());
        }
    }
}

#[async_trait]
impl NewsSource for NaverClient {
    async fn search_news(
        &self,
        query: &str,
        display: usize,
        sort: NewsSort,
    ) -> Result<Vec<NewsArticle>, FetchError> {
        let started = Instant::now();
        let result = self.fetch_search(query, display, sort).await;
        self.record(started, &result);
        match &result {
            Ok(articles) => debug!(query, articles = articles.len(), "Naver news search completed"),
            Err(error) => warn!(query, error = %error, "Naver news search failed"),
        }
        result
    }

    async fn ranking_news(&self, limit: usize) -> Result<Vec<RankedHeadline>, FetchError> {
        let started = Instant::now();
        let result = self.fetch_ranking(limit).await;
        self.record(started, &result);
        match &result {
            Ok(headlines) if headlines.is_empty() => {
                warn!("Naver ranking page yielded no headlines");
            }
            Ok(headlines) => debug!(headlines = headlines.len(), "Naver ranking fetched"),
            Err(error) => warn!(error = %error, "Naver ranking fetch failed"),
        }
        result
    }

    fn search_configured(&self) -> bool {
        self.credentials.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(server: &MockServer, credentials: Option<NaverCredentials>) -> NaverSettings {
        NaverSettings {
            openapi_base_url: server.uri(),
            ranking_url: format!("{}/main/ranking/popularDay.naver", server.uri()),
            credentials,
            connect_timeout: Duration::from_secs(3),
            total_timeout: Duration::from_secs(10),
        }
    }

    fn credentials() -> Option<NaverCredentials> {
        Some(NaverCredentials {
            client_id: "cid".to_string(),
            client_secret: "csecret".to_string(),
        })
    }

    #[rstest]
    #[case(NewsCategory::News, None, "최신")]
    #[case(NewsCategory::Sports, None, "스포츠")]
    #[case(NewsCategory::Sports, Some("   "), "스포츠")]
    #[case(NewsCategory::News, Some(" 야구 "), "야구")]
    fn resolves_category_query(
        #[case] category: NewsCategory,
        #[case] custom: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(category.resolve_query(custom), expected);
    }

    #[test]
    fn ranking_page_keeps_linked_titles_in_order() {
        let html = r#"
            <html><body>
              <div class="rankingnews_box">
                <a class="list_title" href="https://n.news.naver.com/1">  첫 번째
                  기사 </a>
                <a class="list_title">링크 없음</a>
                <a class="list_title" href="https://n.news.naver.com/2">두 번째 기사</a>
                <a class="other" href="https://n.news.naver.com/x">무시</a>
                <a class="list_title" href="https://n.news.naver.com/3">세 번째 기사</a>
              </div>
            </body></html>
        "#;

        let headlines = parse_ranking_page(html, 2);

        assert_eq!(
            headlines,
            vec![
                RankedHeadline {
                    rank: 1,
                    title: "첫 번째 기사".to_string(),
                    link: "https://n.news.naver.com/1".to_string(),
                },
                RankedHeadline {
                    rank: 2,
                    title: "두 번째 기사".to_string(),
                    link: "https://n.news.naver.com/2".to_string(),
                },
            ]
        );
    }

    #[test]
    fn ranking_page_without_matches_is_empty() {
        assert!(parse_ranking_page("<html><body><p>변경된 구조</p></body></html>", 50).is_empty());
    }

    #[tokio::test]
    async fn search_news_sends_credentials_and_cleans_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search/news.json"))
            .and(header(CLIENT_ID_HEADER, "cid"))
            .and(header(CLIENT_SECRET_HEADER, "csecret"))
            .and(query_param("query", "속보"))
            .and(query_param("display", "100"))
            .and(query_param("sort", "sim"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {
                        "title": "<b>속보</b> 오늘 날씨",
                        "originallink": "https://press.example/1",
                        "link": "https://n.news.naver.com/1",
                        "description": "맑음 <b>예상</b>",
                        "pubDate": "Mon, 19 Oct 2026 17:30:00 +0900"
                    },
                    {
                        "title": "두 번째",
                        "originallink": "",
                        "link": "https://n.news.naver.com/2",
                        "description": "",
                        "pubDate": ""
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client = NaverClient::new(settings(&server, credentials())).expect("client should build");
        let articles = client
            .search_news("속보", 500, NewsSort::Sim)
            .await
            .expect("search should succeed");

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "속보 오늘 날씨");
        assert_eq!(articles[0].description, "맑음 예상");
        assert_eq!(articles[0].link, "https://press.example/1");
        assert_eq!(
            articles[0].published_at,
            ParseOutcome::Parsed(Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap())
        );
        assert_eq!(articles[1].link, "https://n.news.naver.com/2");
        assert!(articles[1].published_at.is_defaulted());
    }

    #[tokio::test]
    async fn search_news_without_credentials_fails_fast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = NaverClient::new(settings(&server, None)).expect("client should build");
        assert!(!client.search_configured());

        let error = client
            .search_news("속보", 10, NewsSort::Date)
            .await
            .expect_err("should fail");

        assert!(matches!(error, FetchError::MissingCredentials("Naver")));
    }

    #[tokio::test]
    async fn ranking_news_uses_browser_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/main/ranking/popularDay.naver"))
            .and(|request: &wiremock::Request| {
                request
                    .headers
                    .get("user-agent")
                    .and_then(|value| value.to_str().ok())
                    == Some(BROWSER_USER_AGENT)
            })
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a class="list_title" href="/a">가</a><a class="list_title" href="/b">나</a>"#,
            ))
            .mount(&server)
            .await;

        let client = NaverClient::new(settings(&server, None)).expect("client should build");
        let headlines = client.ranking_news(50).await.expect("ranking should succeed");

        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[1].rank, 2);
        assert_eq!(headlines[1].link, "/b");
    }

    #[tokio::test]
    async fn ranking_news_reports_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = NaverClient::new(settings(&server, None)).expect("client should build");
        let error = client.ranking_news(50).await.expect_err("should fail");

        assert!(matches!(error, FetchError::Status { .. }));
    }
}
