//! Core domain types
//!
//! This module contains the structures shared between the gateway (which
//! authorizes and routes requests) and the client (which talks to the pipeline
//! backend and identity service).

pub mod identity;
pub mod node;
pub mod refs;

pub use identity::{CallerIdentity, GlobalRole};
pub use node::{InputRequest, NodeDetail, StepDetail};
pub use refs::{NodeRef, PathParams, PipelineRef, RunRef, StepRef};
