//! Credential Service
//!
//! Reports which pipelines of a project reference a credential.

use serde::Serialize;
use sluice_core::{BackendError, CredentialUsage};
use thiserror::Error;

/// Service error type
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential usage lookup failed: {0}")]
    Lookup(#[from] BackendError),
}

/// Pipelines referencing one credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialUsageReport {
    pub project: String,
    pub credential: String,
    pub pipelines: Vec<String>,
}

/// Look up the pipelines of `project` that reference `credential`
pub async fn usage(
    lookup: &dyn CredentialUsage,
    project: &str,
    credential: &str,
) -> Result<CredentialUsageReport, CredentialError> {
    let mut pipelines = lookup.pipelines_using(project, credential).await?;
    pipelines.sort();
    pipelines.dedup();

    Ok(CredentialUsageReport {
        project: project.to_string(),
        credential: credential.to_string(),
        pipelines,
    })
}
