//! Collaborator capabilities
//!
//! The gateway never talks to the pipeline backend or the identity service
//! directly; it calls these traits. Every pipeline operation takes the resolved
//! ref plus the inbound request so implementations can pass headers, query and
//! body through. Trunk-vs-branch dispatch is the implementation's job, driven by
//! [`PipelineRef::branch`].

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{GlobalRole, NodeDetail, NodeRef, PipelineRef, RunRef, StepRef};
use crate::dto::{ForwardedRequest, RawPayload};
use crate::error::BackendResult;

/// Read and mutate operations of the CI execution backend
#[async_trait]
pub trait PipelineOperator: Send + Sync {
    // Pipelines
    async fn list_pipelines(&self, req: &ForwardedRequest) -> BackendResult<Value>;
    async fn get_pipeline(&self, pipeline: &PipelineRef, req: &ForwardedRequest)
    -> BackendResult<Value>;
    async fn run_pipeline(&self, pipeline: &PipelineRef, req: &ForwardedRequest)
    -> BackendResult<Value>;
    async fn list_runs(&self, pipeline: &PipelineRef, req: &ForwardedRequest)
    -> BackendResult<Value>;
    async fn list_branches(&self, pipeline: &PipelineRef, req: &ForwardedRequest)
    -> BackendResult<Value>;
    async fn scan_branches(
        &self,
        pipeline: &PipelineRef,
        req: &ForwardedRequest,
    ) -> BackendResult<RawPayload>;
    async fn get_console_log(
        &self,
        pipeline: &PipelineRef,
        req: &ForwardedRequest,
    ) -> BackendResult<RawPayload>;
    async fn check_script_compile(
        &self,
        pipeline: &PipelineRef,
        req: &ForwardedRequest,
    ) -> BackendResult<Value>;
    async fn check_cron(&self, project: &str, req: &ForwardedRequest) -> BackendResult<Value>;

    // Runs
    async fn get_run(&self, run: &RunRef, req: &ForwardedRequest) -> BackendResult<Value>;
    async fn stop_run(&self, run: &RunRef, req: &ForwardedRequest) -> BackendResult<Value>;
    async fn replay_run(&self, run: &RunRef, req: &ForwardedRequest) -> BackendResult<Value>;
    async fn get_artifacts(&self, run: &RunRef, req: &ForwardedRequest) -> BackendResult<Value>;
    async fn get_run_log(&self, run: &RunRef, req: &ForwardedRequest)
    -> BackendResult<RawPayload>;
    async fn get_run_nodes(&self, run: &RunRef, req: &ForwardedRequest) -> BackendResult<Value>;
    async fn get_nodes_detail(
        &self,
        run: &RunRef,
        req: &ForwardedRequest,
    ) -> BackendResult<Vec<NodeDetail>>;

    // Nodes and steps
    async fn get_node_steps(&self, node: &NodeRef, req: &ForwardedRequest)
    -> BackendResult<Value>;
    async fn get_step_log(&self, step: &StepRef, req: &ForwardedRequest)
    -> BackendResult<RawPayload>;
    async fn submit_input_step(
        &self,
        step: &StepRef,
        req: &ForwardedRequest,
    ) -> BackendResult<RawPayload>;

    // Source control
    async fn get_crumb(&self, req: &ForwardedRequest) -> BackendResult<Value>;
    async fn get_scm_servers(&self, scm: &str, req: &ForwardedRequest) -> BackendResult<Value>;
    async fn create_scm_server(&self, scm: &str, req: &ForwardedRequest) -> BackendResult<Value>;
    async fn get_scm_orgs(&self, scm: &str, req: &ForwardedRequest) -> BackendResult<Value>;
    async fn get_org_repos(
        &self,
        scm: &str,
        organization: &str,
        req: &ForwardedRequest,
    ) -> BackendResult<Value>;
    async fn validate_scm(&self, scm: &str, req: &ForwardedRequest) -> BackendResult<Value>;
    async fn notify_commit(&self, req: &ForwardedRequest) -> BackendResult<RawPayload>;
    async fn github_webhook(&self, req: &ForwardedRequest) -> BackendResult<RawPayload>;

    // Pipeline definition conversion
    async fn convert_to_script(&self, req: &ForwardedRequest) -> BackendResult<Value>;
    async fn convert_to_json(&self, req: &ForwardedRequest) -> BackendResult<Value>;
}

/// Global role lookup for a user name
#[async_trait]
pub trait RoleResolver: Send + Sync {
    async fn role_of(&self, user: &str) -> BackendResult<GlobalRole>;
}

/// Which pipelines of a project reference a credential
#[async_trait]
pub trait CredentialUsage: Send + Sync {
    async fn pipelines_using(&self, project: &str, credential: &str)
    -> BackendResult<Vec<String>>;
}
