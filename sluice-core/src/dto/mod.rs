//! Data Transfer Objects exchanged with collaborators
//!
//! Lightweight carriers for request passthrough and raw backend responses.

pub mod forward;

pub use forward::{ForwardedRequest, RawPayload};
