//! # API Shared
//!
//! Wire types for the EMR backend REST API.
//!
//! Contains:
//! - Authentication payloads and the user profile (`auth` module)
//! - Pagination envelope for list endpoints
//! - Presigned-URL responses from the object-storage endpoint
//! - Chat assistant messages and tool invocations
//! - Health check response
//!
//! Used by `emr-core` (session store, domain) and `emr-client` (HTTP transport). Field names on
//! the wire are camelCase; the Rust side is snake_case.

pub mod auth;
pub mod chat;
pub mod health;
pub mod pagination;
pub mod storage;

pub use auth::{
    ForgotPasswordReq, LoginReq, LoginRes, MessageRes, ResetPasswordReq, UserProfile, UserStatus,
};
pub use chat::{ChatMessage, ChatReq, ChatRes, ChatRole, MessagePart, ToolInvocation, ToolState};
pub use health::HealthRes;
pub use pagination::{PageParams, Paginated};
pub use storage::PresignedUrlRes;
