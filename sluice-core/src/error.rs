//! Collaborator error contract

use thiserror::Error;

/// Failure reported by the pipeline backend or the identity service
///
/// A backend that answers with an explicit status produces [`BackendError::Coded`];
/// anything else (transport failure, undecodable reply) is unclassified and is
/// treated as a server fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("backend responded with status {code}: {message}")]
    Coded { code: u16, message: String },

    #[error("backend call failed: {0}")]
    Unclassified(String),
}

impl BackendError {
    pub fn coded(code: u16, message: impl Into<String>) -> Self {
        Self::Coded {
            code,
            message: message.into(),
        }
    }

    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::Unclassified(message.into())
    }

    /// The backend's status code, if it supplied one
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Coded { code, .. } => Some(*code),
            Self::Unclassified(_) => None,
        }
    }
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;
