//! Error types for the Sluice client

use sluice_core::BackendError;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when calling the backend or identity service
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Remote service returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error body returned by the service
        message: String,
    },

    /// Resource cannot exist, e.g. an identifier in its path is empty
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The configured base URL cannot address the requested resource
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }
}

impl From<ClientError> for BackendError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::ApiError { status, message } => BackendError::coded(status, message),
            ClientError::NotFound(what) => BackendError::coded(404, what),
            // reqwest reports the status on errors raised by error_for_status
            ClientError::RequestFailed(e) => match e.status() {
                Some(status) => BackendError::coded(status.as_u16(), e.to_string()),
                None => BackendError::unclassified(e.to_string()),
            },
            other => BackendError::unclassified(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_keeps_status() {
        let err: BackendError = ClientError::api_error(404, "no such run").into();
        assert_eq!(err.code(), Some(404));
    }

    #[test]
    fn test_not_found_is_404() {
        let err: BackendError = ClientError::NotFound("run".to_string()).into();
        assert_eq!(err.code(), Some(404));
    }

    #[test]
    fn test_parse_error_is_unclassified() {
        let err: BackendError = ClientError::ParseError("bad json".to_string()).into();
        assert_eq!(err.code(), None);
    }
}
