//! X API client implementation

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header::HeaderMap;
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::Value;

use super::{Endpoint, XApi};
use crate::config::Config;
use crate::error::{ApiError, Result};

/// Per-request timeout; on expiry the request fails with a network error
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Client-side pacing; a single command makes at most two requests
const RATE_LIMIT_PER_SECOND: NonZeroU32 = match NonZeroU32::new(5) {
    Some(n) => n,
    None => unreachable!(),
};

/// Longest vendor error body quoted verbatim
const MAX_DETAIL_CHARS: usize = 160;

/// X API client
pub struct XClient {
    http: HttpClient,
    config: Config,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl XClient {
    /// Create a client. The bearer token is checked lazily, on the first request.
    pub fn new(config: &Config) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("x-radar/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            RATE_LIMIT_PER_SECOND,
        )));

        Ok(Self {
            http,
            config: config.clone(),
            rate_limiter,
        })
    }
}

#[async_trait]
impl XApi for XClient {
    async fn perform_request(&self, endpoint: &Endpoint) -> Result<Value> {
        let token = self.config.require_bearer_token()?;

        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.config.api_base, endpoint.path());
        log::debug!("GET {} ({})", url, endpoint.name());

        let response = self
            .http
            .get(&url)
            .query(&endpoint.query())
            .bearer_auth(token)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(ApiError::from)?;

        if !status.is_success() {
            return Err(status_error(status, &headers, &body).into());
        }

        serde_json::from_str(&body).map_err(|e| {
            ApiError::MalformedResponse(format!("X API returned invalid JSON: {}", e)).into()
        })
    }
}

/// Map a non-2xx response to an error carrying the vendor's explanation.
fn status_error(status: StatusCode, headers: &HeaderMap, body: &str) -> ApiError {
    let detail = error_detail(body);
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(detail),
        StatusCode::FORBIDDEN => ApiError::Forbidden(detail),
        StatusCode::NOT_FOUND => ApiError::NotFound(detail),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimit(retry_after(headers)),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiError::BadRequest(detail),
        status if status.is_server_error() => {
            ApiError::ServerError(format!("{} {}", status.as_u16(), detail))
        }
        _ => ApiError::Status {
            status: status.as_u16(),
            detail,
        },
    }
}

/// How long to wait after a 429, from `retry-after` (seconds) or
/// `x-rate-limit-reset` (epoch seconds). Defaults to one minute.
fn retry_after(headers: &HeaderMap) -> Duration {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
    };

    if let Some(secs) = header("retry-after") {
        return Duration::from_secs(secs.max(0) as u64);
    }
    if let Some(reset) = header("x-rate-limit-reset") {
        let wait = reset - Utc::now().timestamp();
        return Duration::from_secs(wait.max(0) as u64);
    }
    Duration::from_secs(60)
}

/// Condense a vendor error body into one line.
///
/// Prefers `errors[0].message|detail|title`, then top-level
/// `detail|title|error`, then the whitespace-compacted body.
fn error_detail(body: &str) -> String {
    const FALLBACK: &str = "no additional details";

    let Ok(value) = serde_json::from_str::<Value>(body) else {
        let compact = body.split_whitespace().collect::<Vec<_>>().join(" ");
        if compact.is_empty() {
            return FALLBACK.to_string();
        }
        return compact.chars().take(MAX_DETAIL_CHARS).collect();
    };

    let pick = |obj: &Value, keys: &[&str]| {
        keys.iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_str).filter(|s| !s.is_empty()))
            .map(str::to_string)
    };

    value
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(|first| pick(first, &["message", "detail", "title"]))
        .or_else(|| pick(&value, &["detail", "title", "error"]))
        .unwrap_or_else(|| FALLBACK.to_string())
}
