//! Identity service client
//!
//! Answers the two identity questions the gateway asks: a user's global role
//! and which pipelines reference a credential.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use sluice_core::domain::GlobalRole;
use sluice_core::{BackendResult, CredentialUsage, RoleResolver};

use crate::RestClient;

/// HTTP client for the identity service
#[derive(Debug, Clone)]
pub struct IdentityClient {
    rest: RestClient,
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    #[serde(default)]
    pipelines: Vec<String>,
}

impl IdentityClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            rest: RestClient::new(base_url, client),
        }
    }

    pub fn base_url(&self) -> &str {
        self.rest.base_url()
    }
}

#[async_trait]
impl RoleResolver for IdentityClient {
    /// GET {base}/users/{user}/globalrole
    async fn role_of(&self, user: &str) -> BackendResult<GlobalRole> {
        let response = self.rest.get(&["users", user, "globalrole"]).await?;
        Ok(self.rest.handle_response(response).await?)
    }
}

#[async_trait]
impl CredentialUsage for IdentityClient {
    /// GET {base}/projects/{project}/credentials/{credential}/usage
    async fn pipelines_using(
        &self,
        project: &str,
        credential: &str,
    ) -> BackendResult<Vec<String>> {
        let response = self
            .rest
            .get(&["projects", project, "credentials", credential, "usage"])
            .await?;
        let usage: UsageResponse = self.rest.handle_response(response).await?;
        Ok(usage.pipelines)
    }
}
