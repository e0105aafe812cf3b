//! Pipeline API Handlers
//!
//! Pipeline-level endpoints. Handlers mounted under a branch prefix receive a
//! branch-scoped [`PipelineRef`].

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::Value;
use sluice_core::domain::PipelineRef;
use sluice_core::domain::refs::{PathParams, param};

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::api::extract::Forwarded;
use crate::api::response::RawResponse;

/// GET /v1/search
/// List pipelines matching the forwarded query
pub async fn list_pipelines(
    State(state): State<AppState>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    tracing::debug!("Listing pipelines: {:?}", req.query);

    let pipelines = state.operator.list_pipelines(&req).await?;
    Ok(Json(pipelines))
}

/// GET .../pipelines/{pipeline}[/branches/{branch}]
pub async fn get_pipeline(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    let pipeline = PipelineRef::from_params(&params);
    tracing::debug!("Getting pipeline: {}", pipeline);

    let res = state.operator.get_pipeline(&pipeline, &req).await?;
    Ok(Json(res))
}

/// GET .../runs
pub async fn list_runs(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    let pipeline = PipelineRef::from_params(&params);
    tracing::debug!("Listing runs of pipeline: {}", pipeline);

    let runs = state.operator.list_runs(&pipeline, &req).await?;
    Ok(Json(runs))
}

/// POST .../runs
/// Start a new run
pub async fn run_pipeline(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    let pipeline = PipelineRef::from_params(&params);
    tracing::info!("Running pipeline: {}", pipeline);

    let run = state.operator.run_pipeline(&pipeline, &req).await?;
    Ok(Json(run))
}

/// GET .../pipelines/{pipeline}/branches
pub async fn list_branches(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    let pipeline = PipelineRef::from_params(&params);
    tracing::debug!("Listing branches of pipeline: {}", pipeline);

    let branches = state.operator.list_branches(&pipeline, &req).await?;
    Ok(Json(branches))
}

/// POST .../pipelines/{pipeline}/scan
/// Rescan the source repository for branches
pub async fn scan_branches(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<RawResponse> {
    let pipeline = PipelineRef::from_params(&params);
    tracing::info!("Scanning branches of pipeline: {}", pipeline);

    let raw = state.operator.scan_branches(&pipeline, &req).await?;
    Ok(state.forwarding.respond(raw))
}

/// GET .../pipelines/{pipeline}/consolelog
/// Console output of the last branch scan
pub async fn get_console_log(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<RawResponse> {
    let pipeline = PipelineRef::from_params(&params);
    tracing::debug!("Getting console log of pipeline: {}", pipeline);

    let raw = state.operator.get_console_log(&pipeline, &req).await?;
    Ok(state.forwarding.respond(raw))
}

/// POST .../pipelines/{pipeline}/checkScriptCompile
pub async fn check_script_compile(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    let pipeline = PipelineRef::from_params(&params);
    tracing::debug!("Checking script compilation for pipeline: {}", pipeline);

    let res = state.operator.check_script_compile(&pipeline, &req).await?;
    Ok(Json(res))
}

/// POST /v1/devops/{devops}/checkCron
pub async fn check_cron(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    let project = params.get(param::PROJECT).cloned().unwrap_or_default();
    tracing::debug!("Checking cron expression for project: {}", project);

    let res = state.operator.check_cron(&project, &req).await?;
    Ok(Json(res))
}
