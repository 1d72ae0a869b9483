use serde::{Deserialize, Serialize};

/// Response of `GET /storage/presigned-url`.
///
/// The URL is signed by the object store and must be fetched without the dashboard's bearer
/// token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlRes {
    pub url: String,
    /// Lifetime of the link in seconds, when the backend reports it.
    #[serde(default)]
    pub expires_in: Option<u64>,
}
