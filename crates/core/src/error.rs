use crate::validation::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("validation failed: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),
    #[error("failed to create session directory: {0}")]
    SessionDirCreation(std::io::Error),
    #[error("failed to write session file: {0}")]
    SessionWrite(std::io::Error),
    #[error("failed to remove session file: {0}")]
    SessionRemove(std::io::Error),
    #[error("failed to serialize session: {0}")]
    Serialization(serde_json::Error),
    #[error("account is not permitted to use the dashboard: {0}")]
    AccessDenied(String),
    #[error("no session in progress")]
    NoSession,
    #[error("invalid text: {0}")]
    Text(#[from] emr_types::TextError),
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
