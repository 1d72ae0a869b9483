//! HTTP transport for the backend REST API.
//!
//! [`ApiClient`] attaches the session's bearer token to every request and maps responses onto
//! [`ClientError`]. A 401 from any endpoint other than the login exchange clears the persisted session before the error is
//! returned, so the next navigation lands on the login page.

use crate::auth::LOGIN_ENDPOINT;
use crate::{ClientConfig, ClientError, ClientResult};
use emr_core::AuthStore;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Session store shared between the client and the router.
pub type SharedSession = Arc<Mutex<AuthStore>>;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    session: SharedSession,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: SharedSession) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("emr-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            config,
            session,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let url = self.config.endpoint(path)?;
        let request = self.http.get(url).query(query);
        self.execute(Method::GET, path, request).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.config.endpoint(path)?;
        self.post_url(url, path, body).await
    }

    /// Posts to an absolute URL, used for endpoints hosted apart from the API.
    pub async fn post_url<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        label: &str,
        body: &B,
    ) -> ClientResult<T> {
        let request = self.http.post(url).json(body);
        self.execute(Method::POST, label, request).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.config.endpoint(path)?;
        let request = self.http.patch(url).json(body);
        self.execute(Method::PATCH, path, request).await
    }

    /// Fetches raw bytes from a presigned object-storage URL.
    ///
    /// The URL carries its own signature, so no bearer token is attached.
    pub async fn download(&self, url: &str) -> ClientResult<Vec<u8>> {
        let url = Url::parse(url)
            .map_err(|e| ClientError::Config(format!("invalid download URL: {e}")))?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(ClientError::from_status(status.as_u16(), message));
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        label: &str,
        request: RequestBuilder,
    ) -> ClientResult<T> {
        let token = self.session.lock().await.token().map(str::to_string);
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        tracing::debug!(%method, path = label, "backend request");
        let response = request.send().await?;
        self.read_response(&method, label, response).await
    }

    async fn read_response<T: DeserializeOwned>(
        &self,
        method: &Method,
        label: &str,
        response: Response,
    ) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            // Endpoints such as logout answer with an empty body.
            let body = if body.trim().is_empty() { "null" } else { body.as_str() };
            return Ok(serde_json::from_str(body)?);
        }

        let message = error_message(response).await;
        let error = ClientError::from_status(status.as_u16(), message);
        if matches!(error, ClientError::Unauthorized) && label != LOGIN_ENDPOINT {
            tracing::warn!(%method, path = label, "backend returned 401");
            self.session.lock().await.handle_unauthorized()?;
        } else {
            tracing::debug!(%method, path = label, status = status.as_u16(), "backend error");
        }
        Err(error)
    }
}

/// Extracts the backend's `message` field, which may be a string or a list of strings.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed: Option<serde_json::Value> = serde_json::from_str(&body).ok();
    let message = parsed.as_ref().and_then(|v| v.get("message")).and_then(|m| match m {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|i| i.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        ),
        _ => None,
    });

    message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        })
}
