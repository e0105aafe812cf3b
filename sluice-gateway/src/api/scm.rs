//! Source Control API Handlers
//!
//! SCM server configuration, webhooks, crumb issuance and conversion between
//! pipeline scripts and their structured form. All are plain passthroughs
//! except verification, which turns a backend 401 into 428 so the client
//! knows to redo its credential handshake.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;
use sluice_core::BackendError;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::Forwarded;
use crate::api::response::RawResponse;

/// GET /v1/crumbissuer
pub async fn get_crumb(
    State(state): State<AppState>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    tracing::debug!("Issuing crumb");

    let crumb = state.operator.get_crumb(&req).await?;
    Ok(Json(crumb))
}

/// GET /v1/scms/{scm}/servers
pub async fn get_scm_servers(
    State(state): State<AppState>,
    Path(scm): Path<String>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    tracing::debug!("Listing servers of scm: {}", scm);

    let servers = state.operator.get_scm_servers(&scm, &req).await?;
    Ok(Json(servers))
}

/// POST /v1/scms/{scm}/servers
pub async fn create_scm_server(
    State(state): State<AppState>,
    Path(scm): Path<String>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    tracing::info!("Creating server for scm: {}", scm);

    let server = state.operator.create_scm_server(&scm, &req).await?;
    Ok(Json(server))
}

/// GET /v1/scms/{scm}/organizations
pub async fn get_scm_orgs(
    State(state): State<AppState>,
    Path(scm): Path<String>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    tracing::debug!("Listing organizations of scm: {}", scm);

    let orgs = state.operator.get_scm_orgs(&scm, &req).await?;
    Ok(Json(orgs))
}

/// GET /v1/scms/{scm}/organizations/{organization}/repositories
pub async fn get_org_repos(
    State(state): State<AppState>,
    Path((scm, organization)): Path<(String, String)>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    tracing::debug!("Listing repositories of {}/{}", scm, organization);

    let repos = state.operator.get_org_repos(&scm, &organization, &req).await?;
    Ok(Json(repos))
}

/// POST /v1/scms/{scm}/verify
pub async fn validate_scm(
    State(state): State<AppState>,
    Path(scm): Path<String>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    tracing::info!("Verifying credentials for scm: {}", scm);

    let res = state
        .operator
        .validate_scm(&scm, &req)
        .await
        .map_err(verification_error)?;
    Ok(Json(res))
}

fn verification_error(err: BackendError) -> ApiError {
    match err.code() {
        Some(401) => ApiError::PreconditionFault(err.to_string()),
        _ => err.into(),
    }
}

/// GET|POST /v1/webhook/git
pub async fn notify_commit(
    State(state): State<AppState>,
    Forwarded(req): Forwarded,
) -> ApiResult<RawResponse> {
    tracing::info!("Forwarding commit notification ({})", req.method);

    let raw = state.operator.notify_commit(&req).await?;
    Ok(state.forwarding.respond(raw))
}

/// POST /v1/webhook/github
pub async fn github_webhook(
    State(state): State<AppState>,
    Forwarded(req): Forwarded,
) -> ApiResult<RawResponse> {
    tracing::info!("Forwarding GitHub webhook");

    let raw = state.operator.github_webhook(&req).await?;
    Ok(state.forwarding.respond(raw))
}

/// POST /v1/tojenkinsfile
/// Structured definition to pipeline script
pub async fn convert_to_script(
    State(state): State<AppState>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    let res = state.operator.convert_to_script(&req).await?;
    Ok(Json(res))
}

/// POST /v1/tojson
/// Pipeline script to structured definition
pub async fn convert_to_json(
    State(state): State<AppState>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    let res = state.operator.convert_to_json(&req).await?;
    Ok(Json(res))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_verification_needs_handshake() {
        let err = verification_error(BackendError::coded(401, "bad token"));
        assert!(matches!(err, ApiError::PreconditionFault(_)));
    }

    #[test]
    fn test_other_verification_errors_pass_through() {
        let err = verification_error(BackendError::coded(403, "forbidden"));
        assert!(matches!(err, ApiError::CodedBackendFault { code: 403, .. }));
    }
}
