//! API Module
//!
//! HTTP API layer for the gateway.
//! Each submodule handles endpoints for one level of the pipeline hierarchy.
//!
//! Trunk and branch pipelines share their handlers: the same routes are mounted
//! once under `/pipelines/{pipeline}` and once under
//! `/pipelines/{pipeline}/branches/{branch}`, and the presence of the `branch`
//! parameter selects the backend path family.

pub mod auth;
pub mod credential;
pub mod error;
pub mod extract;
pub mod health;
pub mod pipeline;
pub mod response;
pub mod run;
pub mod scm;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
};
use sluice_core::{CredentialUsage, PipelineOperator, RoleResolver};
use tokio_util::sync::CancellationToken;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::service::SubmitPolicy;
use response::HeaderForwarding;

const TRUNK: &str = "/v1/devops/{devops}/pipelines/{pipeline}";
const BRANCH: &str = "/v1/devops/{devops}/pipelines/{pipeline}/branches/{branch}";

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub operator: Arc<dyn PipelineOperator>,
    pub credentials: Arc<dyn CredentialUsage>,
    pub submit_policy: SubmitPolicy,
    pub forwarding: HeaderForwarding,
    pub auth_user_header: Arc<str>,
    /// Cancelled on shutdown; each request evaluates against a child token
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        config: &GatewayConfig,
        operator: Arc<dyn PipelineOperator>,
        roles: Arc<dyn RoleResolver>,
        credentials: Arc<dyn CredentialUsage>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            submit_policy: SubmitPolicy::new(roles, operator.clone(), config.admin_role.clone()),
            operator,
            credentials,
            forwarding: HeaderForwarding::new(config.forwarded_header_prefix.clone()),
            auth_user_header: Arc::from(config.auth_user_header.as_str()),
            shutdown,
        }
    }
}

/// Routes that exist for both trunk and branch pipelines
fn scoped_routes(router: Router<AppState>, base: &str) -> Router<AppState> {
    let run = format!("{base}/runs/{{run}}");
    let node = format!("{run}/nodes/{{node}}");
    let step = format!("{node}/steps/{{step}}");

    router
        .route(base, get(pipeline::get_pipeline))
        .route(
            &format!("{base}/runs"),
            get(pipeline::list_runs).post(pipeline::run_pipeline),
        )
        .route(&run, get(run::get_run))
        .route(&format!("{run}/stop"), post(run::stop_run))
        .route(&format!("{run}/replay"), post(run::replay_run))
        .route(&format!("{run}/artifacts"), get(run::get_artifacts))
        .route(&format!("{run}/log"), get(run::get_run_log))
        .route(&format!("{run}/nodes"), get(run::get_run_nodes))
        .route(&format!("{run}/nodesdetail"), get(run::get_nodes_detail))
        .route(&format!("{node}/steps"), get(run::get_node_steps))
        .route(&step, post(run::submit_input_step))
        .route(&format!("{step}/log"), get(run::get_step_log))
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let router = Router::new()
        // Pipelines
        .route("/v1/search", get(pipeline::list_pipelines))
        .route(&format!("{TRUNK}/branches"), get(pipeline::list_branches))
        .route(&format!("{TRUNK}/scan"), post(pipeline::scan_branches))
        .route(&format!("{TRUNK}/consolelog"), get(pipeline::get_console_log))
        .route(
            &format!("{TRUNK}/checkScriptCompile"),
            post(pipeline::check_script_compile),
        )
        .route("/v1/devops/{devops}/checkCron", post(pipeline::check_cron))
        // Credentials
        .route(
            "/v1/devops/{devops}/credentials/{credential}/usage",
            get(credential::get_credential_usage),
        )
        // Source control and definitions
        .route("/v1/crumbissuer", get(scm::get_crumb))
        .route(
            "/v1/scms/{scm}/servers",
            get(scm::get_scm_servers).post(scm::create_scm_server),
        )
        .route("/v1/scms/{scm}/organizations", get(scm::get_scm_orgs))
        .route(
            "/v1/scms/{scm}/organizations/{organization}/repositories",
            get(scm::get_org_repos),
        )
        .route("/v1/scms/{scm}/verify", post(scm::validate_scm))
        .route(
            "/v1/webhook/git",
            get(scm::notify_commit).post(scm::notify_commit),
        )
        .route("/v1/webhook/github", post(scm::github_webhook))
        .route("/v1/tojenkinsfile", post(scm::convert_to_script))
        .route("/v1/tojson", post(scm::convert_to_json));

    let router = scoped_routes(router, TRUNK);
    let router = scoped_routes(router, BRANCH);

    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ))
        // Health check stays outside authentication
        .route("/health", get(health::health_check))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
