//! Credential API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::credential_service::{self, CredentialUsageReport};

/// GET /v1/devops/{devops}/credentials/{credential}/usage
/// Pipelines of the project referencing the credential
pub async fn get_credential_usage(
    State(state): State<AppState>,
    Path((project, credential)): Path<(String, String)>,
) -> ApiResult<Json<CredentialUsageReport>> {
    tracing::debug!("Getting usage of credential {} in {}", credential, project);

    let report = credential_service::usage(state.credentials.as_ref(), &project, &credential).await?;
    Ok(Json(report))
}
