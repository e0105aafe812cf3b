//! Sluice Core
//!
//! Core types and abstractions for the Sluice pipeline gateway.
//!
//! This crate contains:
//! - Domain types: entity refs, the node-detail tree, identities and roles
//! - DTOs: request passthrough and raw payload carriers
//! - Collaborator traits implemented by the HTTP client and by test fakes

pub mod domain;
pub mod dto;
pub mod error;
pub mod operator;

pub use error::{BackendError, BackendResult};
pub use operator::{CredentialUsage, PipelineOperator, RoleResolver};
