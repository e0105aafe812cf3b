//! Run API Handlers
//!
//! Endpoints below a single run: lifecycle, logs, the node graph and input
//! submission. Submission is the only gated operation.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use sluice_core::BackendError;
use sluice_core::domain::NodeDetail;
use sluice_core::domain::refs::{NodeRef, PathParams, RunRef, StepRef};

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::api::extract::{Caller, Forwarded};
use crate::api::response::{RawResponse, SubmitDenied};
use crate::service::Decision;

// =============================================================================
// Run Lifecycle Endpoints
// =============================================================================

/// GET .../runs/{run}
pub async fn get_run(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    let run = RunRef::from_params(&params);
    tracing::debug!("Getting run: {}", run);

    let res = state.operator.get_run(&run, &req).await?;
    Ok(Json(res))
}

/// POST .../runs/{run}/stop
pub async fn stop_run(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    let run = RunRef::from_params(&params);
    tracing::info!("Stopping run: {}", run);

    let res = state.operator.stop_run(&run, &req).await?;
    Ok(Json(res))
}

/// POST .../runs/{run}/replay
pub async fn replay_run(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    let run = RunRef::from_params(&params);
    tracing::info!("Replaying run: {}", run);

    let res = state.operator.replay_run(&run, &req).await?;
    Ok(Json(res))
}

/// GET .../runs/{run}/artifacts
pub async fn get_artifacts(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    let run = RunRef::from_params(&params);
    tracing::debug!("Getting artifacts of run: {}", run);

    let res = state.operator.get_artifacts(&run, &req).await?;
    Ok(Json(res))
}

// =============================================================================
// Log Endpoints
// =============================================================================

/// GET .../runs/{run}/log
pub async fn get_run_log(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<RawResponse> {
    let run = RunRef::from_params(&params);
    tracing::debug!("Getting log of run: {}", run);

    let raw = state.operator.get_run_log(&run, &req).await?;
    Ok(state.forwarding.respond(raw))
}

/// GET .../nodes/{node}/steps/{step}/log
/// Step log; vendor headers carry the offset for incremental reads
pub async fn get_step_log(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<RawResponse> {
    let step = StepRef::from_params(&params);
    tracing::debug!("Getting log of step: {}", step);

    let raw = state.operator.get_step_log(&step, &req).await?;
    Ok(state.forwarding.respond(raw))
}

// =============================================================================
// Node Graph Endpoints
// =============================================================================

/// GET .../runs/{run}/nodes
pub async fn get_run_nodes(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    let run = RunRef::from_params(&params);
    tracing::debug!("Getting nodes of run: {}", run);

    let res = state.operator.get_run_nodes(&run, &req).await?;
    Ok(Json(res))
}

/// GET .../runs/{run}/nodesdetail
pub async fn get_nodes_detail(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Vec<NodeDetail>>> {
    let run = RunRef::from_params(&params);
    tracing::debug!("Getting nodes detail of run: {}", run);

    let nodes = state.operator.get_nodes_detail(&run, &req).await?;
    Ok(Json(nodes))
}

/// GET .../nodes/{node}/steps
pub async fn get_node_steps(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Forwarded(req): Forwarded,
) -> ApiResult<Json<Value>> {
    let node = NodeRef::from_params(&params);
    tracing::debug!("Getting steps of node: {}", node);

    let res = state.operator.get_node_steps(&node, &req).await?;
    Ok(Json(res))
}

// =============================================================================
// Input Submission
// =============================================================================

/// POST .../nodes/{node}/steps/{step}
/// Submit a paused input step, if the caller is an allowed submitter
pub async fn submit_input_step(
    State(state): State<AppState>,
    Path(params): Path<PathParams>,
    Caller(caller): Caller,
    Forwarded(req): Forwarded,
) -> ApiResult<Response> {
    let step = StepRef::from_params(&params);
    if !step.is_addressable() {
        // a relative segment would land the submission on another resource
        tracing::warn!("Refusing input submission for unaddressable step {}", step);
        return Err(BackendError::coded(404, format!("no such step: {}", step)).into());
    }
    let cancel = state.shutdown.child_token();

    let decision = state
        .submit_policy
        .decide(caller.as_ref(), &step, &req, &cancel)
        .await?;

    match decision {
        Decision::Allow => {
            tracing::info!(
                "Submitting input step {} as {}",
                step,
                caller.as_ref().map(|c| c.name.as_str()).unwrap_or("anonymous")
            );
            let raw = state.operator.submit_input_step(&step, &req).await?;
            Ok(state.forwarding.respond(raw).into_response())
        }
        Decision::Deny { reason } => {
            tracing::warn!("Input submission refused for {}: {}", step, reason);
            Ok(SubmitDenied::new(reason).into_response())
        }
    }
}
