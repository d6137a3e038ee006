use std::{collections::HashMap, env, fmt, net::SocketAddr, str::FromStr, time::Duration};

use thiserror::Error;

use crate::{
    observability::tracing::TracingSettings,
    pipeline::{PipelineSettings, score::ScoreWeights},
};

const DEFAULT_YOUTUBE_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";
const DEFAULT_NAVER_OPENAPI_BASE_URL: &str = "https://openapi.naver.com/";
const DEFAULT_NAVER_RANKING_URL: &str = "https://news.naver.com/main/ranking/popularDay.naver";
/// 1リクエストで扱える最大件数。
pub const MAX_RESULTS_LIMIT: usize = 200;

#[derive(Clone, PartialEq)]
pub struct Config {
    http_bind: SocketAddr,
    youtube_api_key: Option<String>,
    youtube_base_url: String,
    naver_client_id: Option<String>,
    naver_client_secret: Option<String>,
    naver_openapi_base_url: String,
    naver_ranking_url: String,
    default_region: String,
    max_results: usize,
    top_keywords: usize,
    short_form_max_seconds: u64,
    score_weights: ScoreWeights,
    http_connect_timeout: Duration,
    http_total_timeout: Duration,
    otel_exporter_endpoint: Option<String>,
    otel_sampling_ratio: f64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// Naver Open API の認証情報。
#[derive(Clone, PartialEq, Eq)]
pub struct NaverCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for NaverCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NaverCredentials")
            .field("client_id", &"<redacted>")
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

type Lookup<'a> = dyn Fn(&str) -> Option<String> + 'a;

impl Config {
    /// 環境変数から Trend Worker の設定値を読み込み、検証する。
    ///
    /// # Errors
    /// 数値／アドレスのパースに失敗した場合、または値が許容範囲外の場合は [`ConfigError`] を返す。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|name| env::var(name).ok())
    }

    /// 任意のキー／値ソースから設定を読み込む。テストではプロセス環境を汚さずに使える。
    ///
    /// # Errors
    /// [`Config::from_env`] と同じ。
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(&|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: &Lookup<'_>) -> Result<Self, ConfigError> {
        let http_bind =
            parse_value::<SocketAddr>(lookup, "TREND_WORKER_HTTP_BIND", "0.0.0.0:9010".parse().ok())?;

        // Credentials are optional: endpoints of an unconfigured platform answer 503.
        let youtube_api_key = optional(lookup, "YOUTUBE_API_KEY");
        let naver_client_id = optional(lookup, "NAVER_CLIENT_ID");
        let naver_client_secret = optional(lookup, "NAVER_CLIENT_SECRET");

        let youtube_base_url = string_or(lookup, "YOUTUBE_BASE_URL", DEFAULT_YOUTUBE_BASE_URL);
        let naver_openapi_base_url =
            string_or(lookup, "NAVER_OPENAPI_BASE_URL", DEFAULT_NAVER_OPENAPI_BASE_URL);
        let naver_ranking_url = string_or(lookup, "NAVER_RANKING_URL", DEFAULT_NAVER_RANKING_URL);

        let default_region = string_or(lookup, "TREND_DEFAULT_REGION", "KR").to_uppercase();
        let max_results = parse_value(lookup, "TREND_MAX_RESULTS", Some(50_usize))?;
        if !(1..=MAX_RESULTS_LIMIT).contains(&max_results) {
            return Err(ConfigError::Invalid {
                name: "TREND_MAX_RESULTS",
                source: anyhow::anyhow!("must be between 1 and {MAX_RESULTS_LIMIT}"),
            });
        }
        let top_keywords = parse_value(lookup, "TREND_TOP_KEYWORDS", Some(20_usize))?;

        // Scoring settings
        let short_form_max_seconds =
            parse_value(lookup, "TREND_SHORT_FORM_MAX_SECONDS", Some(60_u64))?;
        let gravity = parse_value(lookup, "TREND_GRAVITY", Some(ScoreWeights::DEFAULT_GRAVITY))?;
        if !(gravity.is_finite() && gravity > 0.0) {
            return Err(ConfigError::Invalid {
                name: "TREND_GRAVITY",
                source: anyhow::anyhow!("must be a positive number"),
            });
        }
        let score_weights = ScoreWeights {
            view: parse_weight(lookup, "TREND_WEIGHT_VIEW", ScoreWeights::DEFAULT_VIEW)?,
            like: parse_weight(lookup, "TREND_WEIGHT_LIKE", ScoreWeights::DEFAULT_LIKE)?,
            comment: parse_weight(lookup, "TREND_WEIGHT_COMMENT", ScoreWeights::DEFAULT_COMMENT)?,
            gravity,
            age_offset_hours: ScoreWeights::DEFAULT_AGE_OFFSET_HOURS,
        };

        // HTTP timeout settings
        let http_connect_timeout =
            Duration::from_millis(parse_value(lookup, "HTTP_CONNECT_TIMEOUT_MS", Some(3000_u64))?);
        let http_total_timeout =
            Duration::from_millis(parse_value(lookup, "HTTP_TOTAL_TIMEOUT_MS", Some(15000_u64))?);

        // OpenTelemetry settings
        let otel_exporter_endpoint = optional(lookup, "OTEL_EXPORTER_OTLP_ENDPOINT");
        let otel_sampling_ratio = parse_value(lookup, "OTEL_SAMPLING_RATIO", Some(1.0_f64))?;
        if !(0.0..=1.0).contains(&otel_sampling_ratio) {
            return Err(ConfigError::Invalid {
                name: "OTEL_SAMPLING_RATIO",
                source: anyhow::anyhow!("must be between 0.0 and 1.0"),
            });
        }

        Ok(Self {
            http_bind,
            youtube_api_key,
            youtube_base_url,
            naver_client_id,
            naver_client_secret,
            naver_openapi_base_url,
            naver_ranking_url,
            default_region,
            max_results,
            top_keywords,
            short_form_max_seconds,
            score_weights,
            http_connect_timeout,
            http_total_timeout,
            otel_exporter_endpoint,
            otel_sampling_ratio,
        })
    }

    #[must_use]
    pub fn http_bind(&self) -> SocketAddr {
        self.http_bind
    }

    #[must_use]
    pub fn youtube_api_key(&self) -> Option<&str> {
        self.youtube_api_key.as_deref()
    }

    #[must_use]
    pub fn youtube_base_url(&self) -> &str {
        &self.youtube_base_url
    }

    /// ID とシークレットの両方が揃っている場合のみ返す。
    #[must_use]
    pub fn naver_credentials(&self) -> Option<NaverCredentials> {
        match (&self.naver_client_id, &self.naver_client_secret) {
            (Some(client_id), Some(client_secret)) => Some(NaverCredentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            }),
            _ => None,
        }
    }

    #[must_use]
    pub fn naver_openapi_base_url(&self) -> &str {
        &self.naver_openapi_base_url
    }

    #[must_use]
    pub fn naver_ranking_url(&self) -> &str {
        &self.naver_ranking_url
    }

    #[must_use]
    pub fn default_region(&self) -> &str {
        &self.default_region
    }

    #[must_use]
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    #[must_use]
    pub fn top_keywords(&self) -> usize {
        self.top_keywords
    }

    #[must_use]
    pub fn http_connect_timeout(&self) -> Duration {
        self.http_connect_timeout
    }

    #[must_use]
    pub fn http_total_timeout(&self) -> Duration {
        self.http_total_timeout
    }

    #[must_use]
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            weights: self.score_weights,
            short_form_max_seconds: self.short_form_max_seconds,
        }
    }

    #[must_use]
    pub fn tracing_settings(&self) -> TracingSettings {
        TracingSettings {
            otlp_endpoint: self.otel_exporter_endpoint.clone(),
            sampling_ratio: self.otel_sampling_ratio,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("Config")
            .field("http_bind", &self.http_bind)
            .field("youtube_api_key", &redact(&self.youtube_api_key))
            .field("youtube_base_url", &self.youtube_base_url)
            .field("naver_client_id", &redact(&self.naver_client_id))
            .field("naver_client_secret", &redact(&self.naver_client_secret))
            .field("naver_openapi_base_url", &self.naver_openapi_base_url)
            .field("naver_ranking_url", &self.naver_ranking_url)
            .field("default_region", &self.default_region)
            .field("max_results", &self.max_results)
            .field("top_keywords", &self.top_keywords)
            .field("short_form_max_seconds", &self.short_form_max_seconds)
            .field("score_weights", &self.score_weights)
            .field("http_connect_timeout", &self.http_connect_timeout)
            .field("http_total_timeout", &self.http_total_timeout)
            .field("otel_exporter_endpoint", &self.otel_exporter_endpoint)
            .field("otel_sampling_ratio", &self.otel_sampling_ratio)
            .finish()
    }
}

fn optional(lookup: &Lookup<'_>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn string_or(lookup: &Lookup<'_>, name: &str, default: &str) -> String {
    optional(lookup, name).unwrap_or_else(|| default.to_string())
}

/// 値を読み込んでパースする。未設定時は `default`、`default` も無ければ [`ConfigError::Missing`]。
fn parse_value<T>(
    lookup: &Lookup<'_>,
    name: &'static str,
    default: Option<T>,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(lookup, name) {
        Some(raw) => raw.parse::<T>().map_err(|error| ConfigError::Invalid {
            name,
            source: anyhow::Error::new(error),
        }),
        None => default.ok_or(ConfigError::Missing(name)),
    }
}

fn parse_weight(lookup: &Lookup<'_>, name: &'static str, default: f64) -> Result<f64, ConfigError> {
    let weight = parse_value(lookup, name, Some(default))?;
    if weight.is_finite() && weight >= 0.0 {
        Ok(weight)
    } else {
        Err(ConfigError::Invalid {
            name,
            source: anyhow::anyhow!("weight must be a non-negative number"),
        })
    }
}
