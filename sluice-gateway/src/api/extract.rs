//! Request extractors
//!
//! [`Caller`] reads the identity the authentication middleware attached to the
//! request; [`Forwarded`] captures method, query, headers and body so they can
//! be handed to a collaborator untouched. `Forwarded` consumes the body and
//! must be the last extractor of a handler.

use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use sluice_core::domain::CallerIdentity;
use sluice_core::dto::ForwardedRequest;

/// The authenticated caller, if the request carried one
#[derive(Debug, Clone)]
pub struct Caller(pub Option<CallerIdentity>);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(parts.extensions.get::<CallerIdentity>().cloned()))
    }
}

/// The inbound request in collaborator form
#[derive(Debug, Clone)]
pub struct Forwarded(pub ForwardedRequest);

impl<S> FromRequest<S> for Forwarded
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut forwarded = ForwardedRequest::new(req.method().as_str())
            .with_query(req.uri().query().unwrap_or_default());
        for (name, value) in req.headers() {
            if let Ok(value) = value.to_str() {
                forwarded = forwarded.with_header(name.as_str(), value);
            }
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        Ok(Forwarded(forwarded.with_body(body.to_vec())))
    }
}
