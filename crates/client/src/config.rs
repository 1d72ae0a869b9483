//! Client configuration.
//!
//! Values are read from the environment by the binary and handed over here as raw strings, so
//! parsing and defaults stay testable.

use crate::query::RetryPolicy;
use crate::{ClientError, ClientResult};
use reqwest::Url;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STALE_SECS: u64 = 60;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    api_url: Url,
    chat_url: Url,
    request_timeout: Duration,
    stale_after: Duration,
    retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(api_url: Url, chat_url: Url) -> Self {
        Self {
            api_url,
            chat_url,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            stale_after: Duration::from_secs(DEFAULT_STALE_SECS),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// How long a cached query result is served without refetching.
    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Joins an API path such as `/patient/42` onto the base URL.
    ///
    /// Any path already present in the base URL is kept, so `https://host/api` + `/health`
    /// becomes `https://host/api/health`.
    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        let base = self.api_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}"))
            .map_err(|e| ClientError::Config(format!("invalid endpoint {path}: {e}")))
    }
}

/// Parses `EMR_API_URL`, defaulting to [`DEFAULT_API_URL`].
pub fn api_url_from_env_value(value: Option<String>) -> ClientResult<Url> {
    let raw = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    parse_http_url(&raw)
}

/// Parses `EMR_CHAT_URL`, defaulting to `{api_url}/chat`.
pub fn chat_url_from_env_value(value: Option<String>, api_url: &Url) -> ClientResult<Url> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(raw) => parse_http_url(&raw),
        None => parse_http_url(&format!(
            "{}/chat",
            api_url.as_str().trim_end_matches('/')
        )),
    }
}

/// Parses a whole number of seconds, falling back to `default` when unset.
pub fn duration_secs_from_env_value(
    name: &str,
    value: Option<String>,
    default: u64,
) -> ClientResult<Duration> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        None => Ok(Duration::from_secs(default)),
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ClientError::Config(format!("{name} must be a number of seconds, got {raw:?}"))),
    }
}

fn parse_http_url(raw: &str) -> ClientResult<Url> {
    let url = Url::parse(raw).map_err(|e| ClientError::Config(format!("invalid URL {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::Config(format!(
            "unsupported URL scheme {other:?} in {raw:?}"
        ))),
    }
}
