use serde::{Deserialize, Serialize};

/// Response of the backend `GET /health` check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthRes {
    pub ok: bool,
    #[serde(default)]
    pub message: String,
}

impl HealthRes {
    /// One-line summary for the `emr health` command.
    pub fn summary(&self) -> String {
        let state = if self.ok { "healthy" } else { "unhealthy" };
        if self.message.is_empty() {
            state.to_string()
        } else {
            format!("{state}: {}", self.message)
        }
    }
}
