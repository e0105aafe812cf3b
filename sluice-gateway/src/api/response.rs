//! Success responses
//!
//! Raw backend payloads pass through byte for byte. Of their headers only the
//! ones carrying the configured vendor prefix survive; these hold log offsets
//! and pagination state the client needs.

use axum::{
    Json,
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use sluice_core::dto::RawPayload;

/// Which raw-response headers are forwarded to the client
#[derive(Debug, Clone)]
pub struct HeaderForwarding {
    prefix: String,
}

impl HeaderForwarding {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn forwards(&self, name: &str) -> bool {
        name.len() >= self.prefix.len()
            && name.as_bytes()[..self.prefix.len()].eq_ignore_ascii_case(self.prefix.as_bytes())
    }

    /// Wrap a raw payload for the client, keeping only vendor headers
    pub fn respond(&self, payload: RawPayload) -> RawResponse {
        let mut headers = HeaderMap::new();
        for (name, value) in &payload.headers {
            if !self.forwards(name) {
                continue;
            }
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => tracing::debug!("Dropping unrepresentable backend header {}", name),
            }
        }

        RawResponse {
            headers,
            body: payload.body,
        }
    }
}

/// Raw bytes plus the forwarded headers
#[derive(Debug)]
pub struct RawResponse {
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl IntoResponse for RawResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.headers, Body::from(self.body)).into_response()
    }
}

/// Body returned when a submission is refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitDenied {
    pub allow: bool,
    pub message: String,
}

impl SubmitDenied {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            allow: false,
            message: message.into(),
        }
    }
}

impl IntoResponse for SubmitDenied {
    fn into_response(self) -> Response {
        // a denial is a completed evaluation, not a transport failure
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_match_ignores_case() {
        let forwarding = HeaderForwarding::new("X-");
        assert!(forwarding.forwards("x-text-size"));
        assert!(forwarding.forwards("X-More-Data"));
        assert!(!forwarding.forwards("server"));
        assert!(!forwarding.forwards("x"));
    }

    #[test]
    fn test_respond_keeps_only_vendor_headers() {
        let payload = RawPayload::new(b"line 1\nline 2\n".to_vec())
            .with_header("x-text-size", "14")
            .with_header("content-type", "text/plain")
            .with_header("set-cookie", "JSESSIONID=abc");

        let raw = HeaderForwarding::new("X-").respond(payload);
        assert_eq!(raw.headers.len(), 1);
        assert_eq!(raw.headers["x-text-size"], "14");
        assert_eq!(raw.body, b"line 1\nline 2\n");
    }

    #[test]
    fn test_custom_prefix() {
        let payload = RawPayload::new(Vec::new())
            .with_header("x-text-size", "14")
            .with_header("ci-log-offset", "100");

        let raw = HeaderForwarding::new("CI-").respond(payload);
        assert_eq!(raw.headers.len(), 1);
        assert!(raw.headers.contains_key("ci-log-offset"));
    }

    #[test]
    fn test_denied_payload_shape() {
        let json = serde_json::to_value(SubmitDenied::new("nope")).unwrap();
        assert_eq!(json, serde_json::json!({ "allow": false, "message": "nope" }));
    }
}
