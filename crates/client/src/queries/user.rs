use super::user_profile_key;
use crate::{ApiClient, ClientError, ClientResult, QueryClient};
use api_shared::UserProfile;

#[derive(Clone)]
pub struct UserQueries {
    api: ApiClient,
    queries: QueryClient,
}

impl UserQueries {
    pub fn new(api: ApiClient, queries: QueryClient) -> Self {
        Self { api, queries }
    }

    /// The signed-in user's profile.
    ///
    /// Every fetch from the backend re-checks the account against the session rules, so a
    /// revoked role or a deactivated account ends the session and returns
    /// `CoreError::AccessDenied`.
    pub async fn profile(&self) -> ClientResult<UserProfile> {
        let api = self.api.clone();
        self.queries
            .fetch(&user_profile_key(), move || {
                let api = api.clone();
                async move {
                    let profile: UserProfile = api.get("/auth/profile", &[]).await?;
                    api.session().lock().await.apply_profile(profile.clone())?;
                    Ok::<_, ClientError>(profile)
                }
            })
            .await
    }
}
