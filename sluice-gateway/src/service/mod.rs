//! Service Module
//!
//! Business logic layer for the gateway.
//! Services sit between the HTTP handlers and the collaborators.

pub mod credential;
pub mod submit_permission;

// Re-export for convenience
pub use credential as credential_service;
pub use submit_permission::{Decision, DecisionError, SubmitPolicy};
