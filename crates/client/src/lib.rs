//! # EMR Client
//!
//! Async client for the EMR backend:
//! - [`ApiClient`]: JSON over HTTP with the session's bearer token and a global 401 handler
//! - [`QueryClient`]: request cache with staleness, retries, request coalescing and invalidation
//! - Resource façades: [`AuthApi`], [`PatientQueries`], [`GeneralFileQueries`], [`UserQueries`],
//!   [`StorageApi`] and [`ChatApi`]
//!
//! [`EmrClient`] wires one transport and one cache into all façades.

pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod http;
pub mod queries;
pub mod query;
pub mod storage;

pub use auth::AuthApi;
pub use chat::{ChatApi, Conversation};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ErrorCategory};
pub use http::{ApiClient, SharedSession};
pub use queries::{GeneralFileQueries, PatientListParams, PatientQueries, UserQueries};
pub use query::{QueryClient, QueryKey, RetryPolicy};
pub use storage::StorageApi;

use api_shared::HealthRes;

/// Entry point bundling the transport and the shared request cache.
#[derive(Clone)]
pub struct EmrClient {
    api: ApiClient,
    queries: QueryClient,
}

impl EmrClient {
    pub fn new(config: ClientConfig, session: SharedSession) -> ClientResult<Self> {
        let queries = QueryClient::new(config.stale_after(), config.retry());
        let api = ApiClient::new(config, session)?;
        Ok(Self { api, queries })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn queries(&self) -> &QueryClient {
        &self.queries
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.api.clone(), self.queries.clone())
    }

    pub fn patients(&self) -> PatientQueries {
        PatientQueries::new(self.api.clone(), self.queries.clone())
    }

    pub fn general_files(&self) -> GeneralFileQueries {
        GeneralFileQueries::new(self.api.clone(), self.queries.clone())
    }

    pub fn user(&self) -> UserQueries {
        UserQueries::new(self.api.clone(), self.queries.clone())
    }

    pub fn storage(&self) -> StorageApi {
        StorageApi::new(self.api.clone())
    }

    pub fn chat(&self) -> ChatApi {
        ChatApi::new(self.api.clone())
    }

    /// Backend liveness check; never cached.
    pub async fn health(&self) -> ClientResult<HealthRes> {
        self.api.get("/health", &[]).await
    }
}
