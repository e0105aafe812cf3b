//! Gateway configuration
//!
//! Defines the listen address, the collaborator endpoints and the few policy
//! knobs of the gateway. Everything is read from the environment once at
//! startup.

use std::time::Duration;

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// Pipeline backend base URL (e.g., "http://backend:9090")
    pub backend_url: String,

    /// Identity service base URL, used for roles and credential usage
    pub identity_url: String,

    /// Header-name prefix forwarded from raw backend responses
    pub forwarded_header_prefix: String,

    /// Global role that bypasses submitter checks
    pub admin_role: String,

    /// Trusted header set by the authenticating proxy in front of the gateway
    pub auth_user_header: String,

    /// Upper bound on handling a single inbound request
    pub request_timeout: Duration,

    /// Timeout for each outbound call to a collaborator
    pub backend_timeout: Duration,
}

impl GatewayConfig {
    /// Creates a new configuration with defaults
    pub fn new(backend_url: String, identity_url: String) -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            backend_url,
            identity_url,
            forwarded_header_prefix: "X-".to_string(),
            admin_role: "platform-admin".to_string(),
            auth_user_header: "x-remote-user".to_string(),
            request_timeout: Duration::from_secs(30),
            backend_timeout: Duration::from_secs(20),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - PIPELINE_BACKEND_URL (required)
    /// - IDENTITY_SERVICE_URL (required)
    /// - GATEWAY_BIND_ADDR (optional, default: 0.0.0.0:8080)
    /// - FORWARDED_HEADER_PREFIX (optional, default: X-)
    /// - PLATFORM_ADMIN_ROLE (optional, default: platform-admin)
    /// - AUTH_USER_HEADER (optional, default: x-remote-user)
    /// - REQUEST_TIMEOUT (optional, seconds, default: 30)
    /// - BACKEND_TIMEOUT (optional, seconds, default: 20)
    pub fn from_env() -> anyhow::Result<Self> {
        let backend_url = std::env::var("PIPELINE_BACKEND_URL")
            .map_err(|_| anyhow::anyhow!("PIPELINE_BACKEND_URL environment variable not set"))?;

        let identity_url = std::env::var("IDENTITY_SERVICE_URL")
            .map_err(|_| anyhow::anyhow!("IDENTITY_SERVICE_URL environment variable not set"))?;

        let mut config = Self::new(backend_url, identity_url);

        if let Ok(addr) = std::env::var("GATEWAY_BIND_ADDR") {
            config.bind_addr = addr;
        }

        if let Ok(prefix) = std::env::var("FORWARDED_HEADER_PREFIX") {
            config.forwarded_header_prefix = prefix;
        }

        if let Ok(role) = std::env::var("PLATFORM_ADMIN_ROLE") {
            config.admin_role = role;
        }

        if let Ok(header) = std::env::var("AUTH_USER_HEADER") {
            config.auth_user_header = header;
        }

        if let Some(timeout) = seconds_from_env("REQUEST_TIMEOUT") {
            config.request_timeout = timeout;
        }

        if let Some(timeout) = seconds_from_env("BACKEND_TIMEOUT") {
            config.backend_timeout = timeout;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the gateway cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.admin_role.trim().is_empty() {
            anyhow::bail!("PLATFORM_ADMIN_ROLE cannot be empty");
        }

        if axum::http::HeaderName::from_bytes(self.auth_user_header.as_bytes()).is_err() {
            anyhow::bail!("AUTH_USER_HEADER is not a valid header name");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("REQUEST_TIMEOUT must be positive");
        }

        if self.backend_timeout.is_zero() {
            anyhow::bail!("BACKEND_TIMEOUT must be positive");
        }

        Ok(())
    }
}

fn seconds_from_env(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}
