//! Authentication flows against `/auth/*`.
//!
//! Login is two requests: the token exchange, then a profile fetch. The session only becomes
//! authenticated once the profile confirms an active doctor account.

use crate::queries::user_profile_key;
use crate::{ApiClient, ClientError, ClientResult, QueryClient};
use api_shared::{ForgotPasswordReq, LoginReq, LoginRes, MessageRes, ResetPasswordReq, UserProfile};
use emr_core::validation::{LoginCredentials, PasswordReset};
use emr_core::EmailAddress;

/// Token exchange endpoint. A 401 here means the credentials were refused, not that a session
/// expired.
pub(crate) const LOGIN_ENDPOINT: &str = "/auth/login";

#[derive(Clone)]
pub struct AuthApi {
    api: ApiClient,
    queries: QueryClient,
}

impl AuthApi {
    pub fn new(api: ApiClient, queries: QueryClient) -> Self {
        Self { api, queries }
    }

    /// Signs in and confirms the account.
    ///
    /// On any failure after the token was issued the session is cleared again, so a refused
    /// account never leaves a usable token behind.
    pub async fn login(&self, credentials: &LoginCredentials) -> ClientResult<UserProfile> {
        let request = LoginReq {
            email: credentials.email.as_str().to_string(),
            password: credentials.password.clone(),
        };
        let response: LoginRes = self
            .api
            .post(LOGIN_ENDPOINT, &request)
            .await
            .map_err(|e| match e {
                ClientError::Unauthorized => ClientError::InvalidCredentials,
                other => other,
            })?;
        self.api
            .session()
            .lock()
            .await
            .begin_session(response.access_token)?;

        let profile = match self.profile().await {
            Ok(profile) => profile,
            Err(e) => {
                self.api.session().lock().await.logout()?;
                return Err(e);
            }
        };

        self.api
            .session()
            .lock()
            .await
            .apply_profile(profile.clone())?;
        self.queries
            .set_query_data(&user_profile_key(), &profile)
            .await?;
        Ok(profile)
    }

    /// Fetches the signed-in user's profile, bypassing the cache.
    pub async fn profile(&self) -> ClientResult<UserProfile> {
        self.api.get("/auth/profile", &[]).await
    }

    /// Signs out. The local session is cleared even when the backend call fails.
    pub async fn logout(&self) -> ClientResult<()> {
        let remote: ClientResult<serde_json::Value> = self.api.post("/auth/logout", &()).await;
        if let Err(e) = remote {
            tracing::warn!("backend logout failed, clearing local session anyway: {}", e);
        }
        self.queries.clear();
        self.api.session().lock().await.logout()?;
        Ok(())
    }

    pub async fn forgot_password(&self, email: &EmailAddress) -> ClientResult<MessageRes> {
        let request = ForgotPasswordReq {
            email: email.as_str().to_string(),
        };
        let response: Option<MessageRes> =
            self.api.post("/auth/forgot-password", &request).await?;
        Ok(response.unwrap_or_default())
    }

    pub async fn reset_password(&self, reset: &PasswordReset) -> ClientResult<MessageRes> {
        let request = ResetPasswordReq {
            token: reset.token.as_str().to_string(),
            new_password: reset.new_password.clone(),
        };
        let response: Option<MessageRes> =
            self.api.post("/auth/reset-password", &request).await?;
        Ok(response.unwrap_or_default())
    }
}
