//! API Error Handling
//!
//! The closed set of failures a handler can end with, and their transport
//! translation. Fault bodies carry a generic message only; the full error is
//! logged before it is dropped.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sluice_core::BackendError;

use crate::service::DecisionError;
use crate::service::credential_service::CredentialError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// The backend answered with an explicit status; surfaced verbatim
    CodedBackendFault { code: u16, message: String },
    /// A failure without a status code
    UnclassifiedFault(String),
    /// The role lookup behind a submit decision failed
    RoleFault(String),
    /// The client must redo an authentication handshake before retrying
    PreconditionFault(String),
    /// The request was cancelled while it was being evaluated
    Cancelled,
}

impl ApiError {
    /// Status code this error translates to
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::CodedBackendFault { code, .. } => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::UnclassifiedFault(_) | ApiError::RoleFault(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::PreconditionFault(_) => StatusCode::PRECONDITION_REQUIRED,
            ApiError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ApiError::CodedBackendFault { code, message } => {
                tracing::error!("Backend error (status {}): {}", code, message);
            }
            ApiError::UnclassifiedFault(msg) => {
                tracing::error!("Internal error: {}", msg);
            }
            ApiError::RoleFault(msg) => {
                tracing::error!("Role resolution error: {}", msg);
            }
            ApiError::PreconditionFault(msg) => {
                tracing::warn!("Precondition required: {}", msg);
            }
            ApiError::Cancelled => {
                tracing::warn!("Request cancelled");
            }
        }

        let message = match &self {
            ApiError::UnclassifiedFault(_) | ApiError::RoleFault(_) => {
                "Internal server error".to_string()
            }
            ApiError::Cancelled => "Request cancelled".to_string(),
            _ => status
                .canonical_reason()
                .unwrap_or("Backend error")
                .to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Coded { code, message } => ApiError::CodedBackendFault { code, message },
            BackendError::Unclassified(msg) => ApiError::UnclassifiedFault(msg),
        }
    }
}

impl From<DecisionError> for ApiError {
    fn from(err: DecisionError) -> Self {
        match err {
            DecisionError::RoleResolution { .. } => ApiError::RoleFault(err.to_string()),
            DecisionError::NodeDetail(_) => ApiError::UnclassifiedFault(err.to_string()),
            DecisionError::Cancelled => ApiError::Cancelled,
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        // any lookup failure is a server fault, whatever the identity service said
        ApiError::UnclassifiedFault(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
