use std::sync::Arc;

/// How an error is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input rejected before or by the backend; shown inline next to the form.
    Validation,
    /// The session is gone; the user is sent back to login.
    Unauthorized,
    /// The account is signed in but may not see this resource.
    Forbidden,
    /// Nothing to show; rendered as an empty state.
    NotFound,
    /// Transport failures and server errors; shown as an alert with a retry hint.
    Network,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("session expired or token rejected")]
    Unauthorized,
    #[error("email or password not accepted")]
    InvalidCredentials,
    #[error("access denied: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] emr_core::CoreError),
    #[error(transparent)]
    Files(#[from] emr_files::FilesError),
    /// An error produced by a request this call was coalesced with.
    #[error(transparent)]
    Shared(Arc<ClientError>),
}

impl ClientError {
    /// Builds the error for a non-success HTTP status.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            400..=499 => Self::Rejected { status, message },
            _ => Self::Server { status, message },
        }
    }

    /// Unwraps errors shared between coalesced requests.
    pub(crate) fn from_shared(shared: Arc<ClientError>) -> Self {
        Arc::try_unwrap(shared).unwrap_or_else(Self::Shared)
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthorized => ErrorCategory::Unauthorized,
            Self::Forbidden(_) => ErrorCategory::Forbidden,
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::Rejected { .. } | Self::Config(_) | Self::InvalidCredentials => {
                ErrorCategory::Validation
            }
            Self::Core(core) => match core {
                emr_core::CoreError::InvalidInput(_)
                | emr_core::CoreError::Validation(_)
                | emr_core::CoreError::Text(_) => ErrorCategory::Validation,
                emr_core::CoreError::AccessDenied(_) => ErrorCategory::Forbidden,
                emr_core::CoreError::NoSession => ErrorCategory::Unauthorized,
                _ => ErrorCategory::Network,
            },
            Self::Shared(inner) => inner.category(),
            Self::Http(_) | Self::Server { .. } | Self::Decode(_) | Self::Files(_) => {
                ErrorCategory::Network
            }
        }
    }

    /// Whether the query retry policy may try the request again.
    ///
    /// Authentication failures and anything caused by the request itself are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_builder() && !e.is_decode(),
            Self::Server { .. } => true,
            Self::Shared(inner) => inner.is_retryable(),
            _ => false,
        }
    }

    /// Message shown in the alert or inline error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Phiên đăng nhập đã hết hạn, vui lòng đăng nhập lại.".into(),
            Self::Forbidden(_) => "Bạn không có quyền truy cập nội dung này.".into(),
            Self::NotFound(_) => "Không tìm thấy dữ liệu.".into(),
            Self::InvalidCredentials => "Email hoặc mật khẩu không đúng.".into(),
            Self::Rejected { message, .. } if !message.is_empty() => message.clone(),
            Self::Core(emr_core::CoreError::Validation(errors)) => errors
                .iter()
                .map(|e| e.message.clone())
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Core(emr_core::CoreError::AccessDenied(reason)) => {
                format!("Không thể đăng nhập: {reason}.")
            }
            Self::Shared(inner) => inner.user_message(),
            _ => match self.category() {
                ErrorCategory::Validation => "Dữ liệu không hợp lệ.".into(),
                _ => "Không thể kết nối tới máy chủ. Vui lòng thử lại.".into(),
            },
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
