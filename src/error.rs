//! Error kinds surfaced by mailwatch operations
//!
//! All fallible operations return `anyhow::Result`; these concrete types
//! stay downcastable through the chain so callers can branch on the kind.

/// Error indicating the stored credentials or token are unusable
#[derive(Debug, thiserror::Error)]
#[error("authorization failed: {message}")]
pub struct AuthorizationError {
    pub message: String,
}

impl AuthorizationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error indicating a network or service failure during search/send/fetch
#[derive(Debug, thiserror::Error)]
#[error("mail transport error: {message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error indicating no message matched the reply criteria
#[derive(Debug, thiserror::Error)]
#[error("no email matched the search criteria")]
pub struct NotFoundError;

/// Error indicating the reply target is missing a field required for threading
#[derive(Debug, thiserror::Error)]
#[error("matched email is missing required field: {field}")]
pub struct MalformedEmailError {
    pub field: &'static str,
}

impl MalformedEmailError {
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }
}
