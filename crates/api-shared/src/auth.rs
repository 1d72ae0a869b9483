//! Authentication payloads exchanged with `/auth/*`.

use serde::{Deserialize, Deserializer, Serialize};

/// Role name that grants access to the dashboard.
pub const DOCTOR_ROLE: &str = "doctor";

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginRes {
    pub access_token: String,
    /// Some deployments return the profile with the token, others only on `/auth/profile`.
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Account status as reported by the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Profile of the signed-in user, returned by `GET /auth/profile`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Accepts both `"roles": ["doctor"]` and the older `"role": "doctor"` shape.
    #[serde(default, alias = "role", deserialize_with = "one_or_many")]
    pub roles: Vec<String>,
    #[serde(default)]
    pub status: UserStatus,
}

impl UserProfile {
    /// Whether the roles include the doctor role (case-insensitive).
    pub fn is_doctor(&self) -> bool {
        self.roles
            .iter()
            .any(|r| r.trim().eq_ignore_ascii_case(DOCTOR_ROLE))
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    /// Name to greet the user with, falling back to the email.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Null(Option<()>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(role) => vec![role],
        OneOrMany::Many(roles) => roles,
        OneOrMany::Null(_) => Vec::new(),
    })
}

/// Body of `POST /auth/forgot-password`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForgotPasswordReq {
    pub email: String,
}

/// Body of `POST /auth/reset-password`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordReq {
    pub token: String,
    pub new_password: String,
}

/// Plain acknowledgement returned by mutation endpoints that have no payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MessageRes {
    #[serde(default)]
    pub message: String,
}
