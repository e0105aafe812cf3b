//! Pipeline backend client

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sluice_core::domain::{NodeDetail, NodeRef, PipelineRef, RunRef, StepRef};
use sluice_core::dto::{ForwardedRequest, RawPayload};
use sluice_core::{BackendResult, PipelineOperator};

use crate::RestClient;
use crate::error::Result;
use crate::paths::{self, join};

/// HTTP client for the CI execution backend
///
/// Every call forwards the inbound query string, passthrough headers and body.
/// Branch-scoped refs are routed to the branch path family automatically.
#[derive(Debug, Clone)]
pub struct BackendClient {
    rest: RestClient,
}

impl BackendClient {
    /// Create a new backend client
    ///
    /// # Example
    /// ```
    /// use sluice_client::BackendClient;
    ///
    /// let backend = BackendClient::new("http://localhost:9090");
    /// assert_eq!(backend.base_url(), "http://localhost:9090");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a backend client with a configured reqwest Client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            rest: RestClient::new(base_url, client),
        }
    }

    /// Get the base URL of the backend
    pub fn base_url(&self) -> &str {
        self.rest.base_url()
    }

    async fn json<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: Vec<String>,
        req: &ForwardedRequest,
    ) -> Result<T> {
        let response = self.rest.send(method, &segments, req).await?;
        self.rest.handle_response(response).await
    }

    async fn raw(
        &self,
        method: Method,
        segments: Vec<String>,
        req: &ForwardedRequest,
    ) -> Result<RawPayload> {
        let response = self.rest.send(method, &segments, req).await?;
        self.rest.handle_raw_response(response).await
    }
}

/// Use the inbound method when it parses, otherwise fall back
fn method_of(req: &ForwardedRequest, fallback: Method) -> Method {
    Method::from_bytes(req.method.as_bytes()).unwrap_or(fallback)
}

#[async_trait]
impl PipelineOperator for BackendClient {
    // =============================================================================
    // Pipelines
    // =============================================================================

    async fn list_pipelines(&self, req: &ForwardedRequest) -> BackendResult<Value> {
        Ok(self.json(Method::GET, vec!["search".to_string()], req).await?)
    }

    async fn get_pipeline(
        &self,
        pipeline: &PipelineRef,
        req: &ForwardedRequest,
    ) -> BackendResult<Value> {
        Ok(self.json(Method::GET, paths::pipeline(pipeline), req).await?)
    }

    async fn run_pipeline(
        &self,
        pipeline: &PipelineRef,
        req: &ForwardedRequest,
    ) -> BackendResult<Value> {
        let segments = join(paths::pipeline(pipeline), &["runs"]);
        Ok(self.json(Method::POST, segments, req).await?)
    }

    async fn list_runs(
        &self,
        pipeline: &PipelineRef,
        req: &ForwardedRequest,
    ) -> BackendResult<Value> {
        let segments = join(paths::pipeline(pipeline), &["runs"]);
        Ok(self.json(Method::GET, segments, req).await?)
    }

    async fn list_branches(
        &self,
        pipeline: &PipelineRef,
        req: &ForwardedRequest,
    ) -> BackendResult<Value> {
        let segments = join(paths::trunk(pipeline), &["branches"]);
        Ok(self.json(Method::GET, segments, req).await?)
    }

    async fn scan_branches(
        &self,
        pipeline: &PipelineRef,
        req: &ForwardedRequest,
    ) -> BackendResult<RawPayload> {
        let segments = join(paths::trunk(pipeline), &["scan"]);
        Ok(self.raw(Method::POST, segments, req).await?)
    }

    async fn get_console_log(
        &self,
        pipeline: &PipelineRef,
        req: &ForwardedRequest,
    ) -> BackendResult<RawPayload> {
        let segments = join(paths::trunk(pipeline), &["consolelog"]);
        Ok(self.raw(Method::GET, segments, req).await?)
    }

    async fn check_script_compile(
        &self,
        pipeline: &PipelineRef,
        req: &ForwardedRequest,
    ) -> BackendResult<Value> {
        let segments = join(paths::trunk(pipeline), &["checkScriptCompile"]);
        Ok(self.json(Method::POST, segments, req).await?)
    }

    async fn check_cron(&self, project: &str, req: &ForwardedRequest) -> BackendResult<Value> {
        let segments = join(paths::project(project), &["checkCron"]);
        Ok(self.json(Method::POST, segments, req).await?)
    }

    // =============================================================================
    // Runs
    // =============================================================================

    async fn get_run(&self, run: &RunRef, req: &ForwardedRequest) -> BackendResult<Value> {
        Ok(self.json(Method::GET, paths::run(run), req).await?)
    }

    async fn stop_run(&self, run: &RunRef, req: &ForwardedRequest) -> BackendResult<Value> {
        let segments = join(paths::run(run), &["stop"]);
        Ok(self.json(Method::POST, segments, req).await?)
    }

    async fn replay_run(&self, run: &RunRef, req: &ForwardedRequest) -> BackendResult<Value> {
        let segments = join(paths::run(run), &["replay"]);
        Ok(self.json(Method::POST, segments, req).await?)
    }

    async fn get_artifacts(&self, run: &RunRef, req: &ForwardedRequest) -> BackendResult<Value> {
        let segments = join(paths::run(run), &["artifacts"]);
        Ok(self.json(Method::GET, segments, req).await?)
    }

    async fn get_run_log(
        &self,
        run: &RunRef,
        req: &ForwardedRequest,
    ) -> BackendResult<RawPayload> {
        let segments = join(paths::run(run), &["log"]);
        Ok(self.raw(Method::GET, segments, req).await?)
    }

    async fn get_run_nodes(&self, run: &RunRef, req: &ForwardedRequest) -> BackendResult<Value> {
        let segments = join(paths::run(run), &["nodes"]);
        Ok(self.json(Method::GET, segments, req).await?)
    }

    async fn get_nodes_detail(
        &self,
        run: &RunRef,
        req: &ForwardedRequest,
    ) -> BackendResult<Vec<NodeDetail>> {
        let segments = join(paths::run(run), &["nodesdetail"]);
        Ok(self.json(Method::GET, segments, req).await?)
    }

    // =============================================================================
    // Nodes and Steps
    // =============================================================================

    async fn get_node_steps(
        &self,
        node: &NodeRef,
        req: &ForwardedRequest,
    ) -> BackendResult<Value> {
        let segments = join(paths::node(node), &["steps"]);
        Ok(self.json(Method::GET, segments, req).await?)
    }

    async fn get_step_log(
        &self,
        step: &StepRef,
        req: &ForwardedRequest,
    ) -> BackendResult<RawPayload> {
        let segments = join(paths::step(step), &["log"]);
        Ok(self.raw(Method::GET, segments, req).await?)
    }

    async fn submit_input_step(
        &self,
        step: &StepRef,
        req: &ForwardedRequest,
    ) -> BackendResult<RawPayload> {
        tracing::info!("Forwarding input submission for {}", step);
        Ok(self.raw(Method::POST, paths::step(step), req).await?)
    }

    // =============================================================================
    // Source Control
    // =============================================================================

    async fn get_crumb(&self, req: &ForwardedRequest) -> BackendResult<Value> {
        Ok(self
            .json(Method::GET, vec!["crumbissuer".to_string()], req)
            .await?)
    }

    async fn get_scm_servers(&self, scm: &str, req: &ForwardedRequest) -> BackendResult<Value> {
        let segments = join(paths::scm(scm), &["servers"]);
        Ok(self.json(Method::GET, segments, req).await?)
    }

    async fn create_scm_server(&self, scm: &str, req: &ForwardedRequest) -> BackendResult<Value> {
        let segments = join(paths::scm(scm), &["servers"]);
        Ok(self.json(Method::POST, segments, req).await?)
    }

    async fn get_scm_orgs(&self, scm: &str, req: &ForwardedRequest) -> BackendResult<Value> {
        let segments = join(paths::scm(scm), &["organizations"]);
        Ok(self.json(Method::GET, segments, req).await?)
    }

    async fn get_org_repos(
        &self,
        scm: &str,
        organization: &str,
        req: &ForwardedRequest,
    ) -> BackendResult<Value> {
        let segments = join(
            paths::scm(scm),
            &["organizations", organization, "repositories"],
        );
        Ok(self.json(Method::GET, segments, req).await?)
    }

    async fn validate_scm(&self, scm: &str, req: &ForwardedRequest) -> BackendResult<Value> {
        let segments = join(paths::scm(scm), &["verify"]);
        Ok(self.json(Method::POST, segments, req).await?)
    }

    async fn notify_commit(&self, req: &ForwardedRequest) -> BackendResult<RawPayload> {
        let segments = vec!["webhook".to_string(), "git".to_string()];
        Ok(self.raw(method_of(req, Method::GET), segments, req).await?)
    }

    async fn github_webhook(&self, req: &ForwardedRequest) -> BackendResult<RawPayload> {
        let segments = vec!["webhook".to_string(), "github".to_string()];
        Ok(self.raw(Method::POST, segments, req).await?)
    }

    // =============================================================================
    // Definition Conversion
    // =============================================================================

    async fn convert_to_script(&self, req: &ForwardedRequest) -> BackendResult<Value> {
        Ok(self
            .json(Method::POST, vec!["tojenkinsfile".to_string()], req)
            .await?)
    }

    async fn convert_to_json(&self, req: &ForwardedRequest) -> BackendResult<Value> {
        Ok(self.json(Method::POST, vec!["tojson".to_string()], req).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_client_creation() {
        let backend = BackendClient::new("http://localhost:9090/");
        assert_eq!(backend.base_url(), "http://localhost:9090");
    }

    #[test]
    fn test_method_of_falls_back() {
        assert_eq!(method_of(&ForwardedRequest::new("POST"), Method::GET), Method::POST);
        assert_eq!(method_of(&ForwardedRequest::new(""), Method::GET), Method::GET);
    }

    #[tokio::test]
    async fn test_empty_run_id_is_not_found_without_network() {
        // nothing listens here; a 404 proves no request was attempted
        let backend = BackendClient::new("http://127.0.0.1:9");
        let run = PipelineRef::new("proj", "build").run("");

        let err = backend
            .get_run(&run, &ForwardedRequest::new("GET"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some(404));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_unclassified() {
        let backend = BackendClient::new("http://127.0.0.1:9");
        let pipeline = PipelineRef::new("proj", "build");

        let err = backend
            .get_pipeline(&pipeline, &ForwardedRequest::new("GET"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), None);
    }
}
