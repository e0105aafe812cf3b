//! Authentication middleware
//!
//! The gateway runs behind an authenticating proxy which states the user name
//! in a trusted header. That header is the only source of [`CallerIdentity`];
//! request bodies never are.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sluice_core::domain::CallerIdentity;

use crate::api::AppState;

/// Attach the caller identity to the request extensions
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    // never trust an identity that did not come through this middleware
    request.extensions_mut().remove::<CallerIdentity>();

    let caller = request
        .headers()
        .get(&*state.auth_user_header)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(CallerIdentity::new);

    match caller {
        Some(caller) => {
            tracing::debug!("Authenticated caller: {}", caller.name);
            request.extensions_mut().insert(caller);
        }
        None => tracing::debug!("Request without authenticated caller"),
    }

    next.run(request).await
}
