//! Sluice HTTP Client
//!
//! `reqwest` implementations of the collaborator traits declared in
//! `sluice-core`:
//!
//! - [`BackendClient`] implements [`sluice_core::PipelineOperator`] against the
//!   CI execution backend.
//! - [`IdentityClient`] implements [`sluice_core::RoleResolver`] and
//!   [`sluice_core::CredentialUsage`] against the identity service.
//!
//! # Example
//!
//! ```no_run
//! use sluice_client::BackendClient;
//! use sluice_core::PipelineOperator;
//! use sluice_core::domain::PipelineRef;
//! use sluice_core::dto::ForwardedRequest;
//!
//! # async fn example() -> Result<(), sluice_core::BackendError> {
//! let backend = BackendClient::new("http://localhost:9090");
//! let pipeline = PipelineRef::new("demo", "build").with_branch("main");
//! let runs = backend.list_runs(&pipeline, &ForwardedRequest::new("GET")).await?;
//! println!("{runs}");
//! # Ok(())
//! # }
//! ```

mod backend;
pub mod error;
mod identity;
mod paths;

pub use backend::BackendClient;
pub use error::{ClientError, Result};
pub use identity::IdentityClient;

use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use sluice_core::domain::refs::is_relative_segment;
use sluice_core::dto::{ForwardedRequest, RawPayload};

/// Request headers passed through to the backend verbatim
pub const PASSTHROUGH_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "content-type",
    "accept",
    "jenkins-crumb",
];

/// Shared plumbing for the backend and identity clients
#[derive(Debug, Clone)]
pub(crate) struct RestClient {
    /// Base URL of the remote service (e.g., "http://localhost:9090")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl RestClient {
    pub(crate) fn new(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join percent-encoded path segments onto the base URL
    ///
    /// An empty segment means an identifier was missing from the inbound path,
    /// and `.` or `..` would be collapsed into a different resource. Neither can
    /// name an entity, so no request is made.
    pub(crate) fn url<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url> {
        if segments
            .iter()
            .any(|s| s.as_ref().is_empty() || is_relative_segment(s.as_ref()))
        {
            let path: Vec<&str> = segments.iter().map(|s| s.as_ref()).collect();
            return Err(ClientError::NotFound(path.join("/")));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidRequest(format!("bad base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidRequest("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments.iter().map(|s| s.as_ref()));
        Ok(url)
    }

    /// Send a request, forwarding query, passthrough headers and body
    pub(crate) async fn send<S: AsRef<str>>(
        &self,
        method: Method,
        segments: &[S],
        req: &ForwardedRequest,
    ) -> Result<reqwest::Response> {
        let mut url = self.url(segments)?;
        url.set_query(req.query.as_deref());

        tracing::debug!("{} {}", method, url);

        let mut builder = self.client.request(method, url);
        for (name, value) in &req.headers {
            if PASSTHROUGH_HEADERS
                .iter()
                .any(|h| h.eq_ignore_ascii_case(name))
            {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        if !req.body.is_empty() {
            builder = builder.body(req.body.clone());
        }

        Ok(builder.send().await?)
    }

    /// Plain GET without passthrough
    pub(crate) async fn get<S: AsRef<str>>(&self, segments: &[S]) -> Result<reqwest::Response> {
        let url = self.url(segments)?;
        tracing::debug!("GET {}", url);
        Ok(self.client.get(url).send().await?)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body
    pub(crate) async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let response = Self::check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Check the status code and return the raw body with every response header
    pub(crate) async fn handle_raw_response(&self, response: reqwest::Response) -> Result<RawPayload> {
        let response = Self::check_status(response).await?;

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?;

        Ok(headers
            .into_iter()
            .fold(RawPayload::new(body.to_vec()), |payload, (name, value)| {
                payload.with_header(name, value)
            }))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }
}
