//! In-memory collaborators for tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use sluice_core::domain::{
    GlobalRole, InputRequest, NodeDetail, NodeRef, PipelineRef, RunRef, StepDetail, StepRef,
};
use sluice_core::dto::{ForwardedRequest, RawPayload};
use sluice_core::{BackendError, BackendResult, CredentialUsage, PipelineOperator, RoleResolver};

/// A run with a single node holding one input step
pub fn step_with_submitters(node: &str, step: &str, submitters: &str) -> Vec<NodeDetail> {
    vec![NodeDetail {
        id: node.to_string(),
        steps: vec![StepDetail {
            id: step.to_string(),
            input: Some(InputRequest::with_submitter(submitters)),
            extra: Map::new(),
        }],
        extra: Map::new(),
    }]
}

/// Pipeline backend fake
///
/// Structured operations answer `{"op": <name>}`, raw ones answer the
/// operation name as body plus a mix of vendor and transport headers.
#[derive(Default)]
pub struct FakeOperator {
    nodes: Vec<NodeDetail>,
    failure: Option<BackendError>,
    nodes_detail_calls: AtomicUsize,
    submissions: Mutex<Vec<(StepRef, Vec<u8>)>>,
    seen: Mutex<Vec<String>>,
}

impl FakeOperator {
    pub fn with_nodes(nodes: Vec<NodeDetail>) -> Self {
        Self {
            nodes,
            ..Default::default()
        }
    }

    /// Every operation fails with `err`
    pub fn failing(err: BackendError) -> Self {
        Self {
            failure: Some(err),
            ..Default::default()
        }
    }

    pub fn nodes_detail_calls(&self) -> usize {
        self.nodes_detail_calls.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<(StepRef, Vec<u8>)> {
        self.submissions.lock().unwrap().clone()
    }

    /// Display form of every ref an operation was called with
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    fn answer(&self, op: &str, target: impl ToString) -> BackendResult<Value> {
        self.seen.lock().unwrap().push(target.to_string());
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(json!({ "op": op })),
        }
    }

    fn answer_raw(&self, op: &str, target: impl ToString) -> BackendResult<RawPayload> {
        self.seen.lock().unwrap().push(target.to_string());
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(RawPayload::new(op.as_bytes().to_vec())
                .with_header("x-text-size", "42")
                .with_header("X-More-Data", "true")
                .with_header("server", "jetty")
                .with_header("set-cookie", "JSESSIONID=abc")),
        }
    }
}

#[async_trait]
impl PipelineOperator for FakeOperator {
    async fn list_pipelines(&self, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("list_pipelines", "search")
    }

    async fn get_pipeline(&self, p: &PipelineRef, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("get_pipeline", p)
    }

    async fn run_pipeline(&self, p: &PipelineRef, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("run_pipeline", p)
    }

    async fn list_runs(&self, p: &PipelineRef, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("list_runs", p)
    }

    async fn list_branches(&self, p: &PipelineRef, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("list_branches", p)
    }

    async fn scan_branches(
        &self,
        p: &PipelineRef,
        _req: &ForwardedRequest,
    ) -> BackendResult<RawPayload> {
        self.answer_raw("scan_branches", p)
    }

    async fn get_console_log(
        &self,
        p: &PipelineRef,
        _req: &ForwardedRequest,
    ) -> BackendResult<RawPayload> {
        self.answer_raw("get_console_log", p)
    }

    async fn check_script_compile(
        &self,
        p: &PipelineRef,
        _req: &ForwardedRequest,
    ) -> BackendResult<Value> {
        self.answer("check_script_compile", p)
    }

    async fn check_cron(&self, project: &str, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("check_cron", project)
    }

    async fn get_run(&self, run: &RunRef, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("get_run", run)
    }

    async fn stop_run(&self, run: &RunRef, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("stop_run", run)
    }

    async fn replay_run(&self, run: &RunRef, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("replay_run", run)
    }

    async fn get_artifacts(&self, run: &RunRef, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("get_artifacts", run)
    }

    async fn get_run_log(
        &self,
        run: &RunRef,
        _req: &ForwardedRequest,
    ) -> BackendResult<RawPayload> {
        self.answer_raw("get_run_log", run)
    }

    async fn get_run_nodes(&self, run: &RunRef, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("get_run_nodes", run)
    }

    async fn get_nodes_detail(
        &self,
        run: &RunRef,
        _req: &ForwardedRequest,
    ) -> BackendResult<Vec<NodeDetail>> {
        self.nodes_detail_calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(run.to_string());
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(self.nodes.clone()),
        }
    }

    async fn get_node_steps(&self, node: &NodeRef, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("get_node_steps", node)
    }

    async fn get_step_log(
        &self,
        step: &StepRef,
        _req: &ForwardedRequest,
    ) -> BackendResult<RawPayload> {
        self.answer_raw("get_step_log", step)
    }

    async fn submit_input_step(
        &self,
        step: &StepRef,
        req: &ForwardedRequest,
    ) -> BackendResult<RawPayload> {
        self.submissions
            .lock()
            .unwrap()
            .push((step.clone(), req.body.clone()));
        self.answer_raw("submit_input_step", step)
    }

    async fn get_crumb(&self, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("get_crumb", "crumb")
    }

    async fn get_scm_servers(&self, scm: &str, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("get_scm_servers", scm)
    }

    async fn create_scm_server(&self, scm: &str, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("create_scm_server", scm)
    }

    async fn get_scm_orgs(&self, scm: &str, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("get_scm_orgs", scm)
    }

    async fn get_org_repos(
        &self,
        scm: &str,
        organization: &str,
        _req: &ForwardedRequest,
    ) -> BackendResult<Value> {
        self.answer("get_org_repos", format!("{scm}/{organization}"))
    }

    async fn validate_scm(&self, scm: &str, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("validate_scm", scm)
    }

    async fn notify_commit(&self, req: &ForwardedRequest) -> BackendResult<RawPayload> {
        self.answer_raw("notify_commit", &req.method)
    }

    async fn github_webhook(&self, _req: &ForwardedRequest) -> BackendResult<RawPayload> {
        self.answer_raw("github_webhook", "github")
    }

    async fn convert_to_script(&self, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("convert_to_script", "tojenkinsfile")
    }

    async fn convert_to_json(&self, _req: &ForwardedRequest) -> BackendResult<Value> {
        self.answer("convert_to_json", "tojson")
    }
}

/// Role lookup fake; unknown users hold a non-privileged role
#[derive(Default)]
pub struct FakeRoles {
    roles: HashMap<String, String>,
    failure: Option<BackendError>,
    calls: AtomicUsize,
}

impl FakeRoles {
    pub fn with_role(mut self, user: &str, role: &str) -> Self {
        self.roles.insert(user.to_string(), role.to_string());
        self
    }

    pub fn failing(err: BackendError) -> Self {
        Self {
            failure: Some(err),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleResolver for FakeRoles {
    async fn role_of(&self, user: &str) -> BackendResult<GlobalRole> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let role = self
            .roles
            .get(user)
            .cloned()
            .unwrap_or_else(|| "platform-regular".to_string());
        Ok(GlobalRole::new(role))
    }
}

/// Credential usage fake
pub struct FakeCredentials {
    answer: BackendResult<Vec<String>>,
}

impl FakeCredentials {
    pub fn with_pipelines(pipelines: &[&str]) -> Self {
        Self {
            answer: Ok(pipelines.iter().map(|p| p.to_string()).collect()),
        }
    }

    pub fn failing(err: BackendError) -> Self {
        Self { answer: Err(err) }
    }
}

#[async_trait]
impl CredentialUsage for FakeCredentials {
    async fn pipelines_using(
        &self,
        _project: &str,
        _credential: &str,
    ) -> BackendResult<Vec<String>> {
        self.answer.clone()
    }
}
