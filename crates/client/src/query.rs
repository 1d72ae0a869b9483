//! Request cache.
//!
//! Every read goes through [`QueryClient::fetch`] with a [`QueryKey`] naming the resource and
//! its parameters. Results are kept as JSON values in a `moka` cache:
//!
//! - a result younger than the stale time is returned without a request
//! - concurrent fetches of the same key share one request
//! - failed requests are retried per [`RetryPolicy`], except authentication and client errors
//! - mutations write through [`QueryClient::set_query_data`] and drop dependent keys with
//!   [`QueryClient::invalidate_prefix`]

use crate::{ClientError, ClientResult};
use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::time::Duration;

const MAX_CACHED_QUERIES: u64 = 1_000;
const KEY_SEPARATOR: char = '/';

/// Cache key: a resource name followed by its parameters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey {
    parts: Vec<String>,
}

impl QueryKey {
    pub fn new(name: &str) -> Self {
        Self {
            parts: vec![escape_part(name)],
        }
    }

    /// Appends a parameter.
    pub fn with(mut self, part: impl fmt::Display) -> Self {
        self.parts.push(escape_part(&part.to_string()));
        self
    }

    /// Appends an optional parameter; `None` and blank strings share one slot.
    pub fn with_opt(self, part: Option<&str>) -> Self {
        self.with(part.map(str::trim).unwrap_or_default())
    }

    /// Whether `key` is this key or one of its extensions.
    pub fn is_prefix_of(&self, key: &str) -> bool {
        let own = self.to_string();
        key == own
            || key
                .strip_prefix(own.as_str())
                .is_some_and(|rest| rest.starts_with(KEY_SEPARATOR))
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = KEY_SEPARATOR.to_string();
        f.write_str(&self.parts.join(&sep))
    }
}

fn escape_part(part: &str) -> String {
    part.replace('%', "%25").replace(KEY_SEPARATOR, "%2F")
}

/// Retry schedule for failed queries: exponential backoff from `base_delay`, capped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that fails on the first error.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay)
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or retries run out.
    pub async fn run<T, F, Fut>(&self, op: F) -> ClientResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(attempt = attempt + 1, ?delay, "request failed, retrying: {}", e);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Shared request cache. Cloning is cheap and clones share entries.
#[derive(Clone)]
pub struct QueryClient {
    cache: Cache<String, Value>,
    retry: RetryPolicy,
}

impl QueryClient {
    pub fn new(stale_after: Duration, retry: RetryPolicy) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(MAX_CACHED_QUERIES)
                .time_to_live(stale_after)
                .build(),
            retry,
        }
    }

    /// Returns the cached result for `key`, or runs `fetcher` and caches what it returns.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> ClientResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let cache_key = key.to_string();
        if let Some(hit) = self.cache.get(&cache_key).await {
            tracing::debug!(key = %cache_key, "query cache hit");
            return Ok(serde_json::from_value(hit)?);
        }

        tracing::debug!(key = %cache_key, "query cache miss");
        let retry = self.retry;
        let value = self
            .cache
            .try_get_with(cache_key, async move {
                let fresh = retry.run(&fetcher).await?;
                serde_json::to_value(fresh).map_err(ClientError::from)
            })
            .await
            .map_err(ClientError::from_shared)?;

        Ok(serde_json::from_value(value)?)
    }

    /// Cached result for `key`, if fresh.
    pub async fn get_query_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let value = self.cache.get(&key.to_string()).await?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(key = %key, "discarding undecodable cache entry: {}", e);
                None
            }
        }
    }

    /// Writes `value` under `key`, as if it had just been fetched.
    pub async fn set_query_data<T: Serialize>(&self, key: &QueryKey, value: &T) -> ClientResult<()> {
        let value = serde_json::to_value(value)?;
        self.cache.insert(key.to_string(), value).await;
        Ok(())
    }

    pub async fn invalidate(&self, key: &QueryKey) {
        self.cache.invalidate(&key.to_string()).await;
    }

    /// Drops `prefix` and every key extending it.
    pub async fn invalidate_prefix(&self, prefix: &QueryKey) {
        let doomed: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| prefix.is_prefix_of(key))
            .map(|(key, _)| String::clone(&key))
            .collect();

        tracing::debug!(prefix = %prefix, count = doomed.len(), "invalidating queries");
        for key in doomed {
            self.cache.invalidate(&key).await;
        }
    }

    /// Drops everything, used on logout so the next user starts cold.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}
