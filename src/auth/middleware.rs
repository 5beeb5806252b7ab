use axum::{
    extract::{OriginalUri, Request, State},
    http::header::{AUTHORIZATION, HOST},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::app_state::AppState;
use crate::auth::signature::canonical_url;
use crate::error::RelayError;

/// Reconstruct the signed URL for `request`.
///
/// The scheme is always the configured one; the host comes from the `Host`
/// header, or the URI authority for HTTP/2 requests.
pub fn request_url(scheme: &str, request: &Request) -> String {
    let uri = request
        .extensions()
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or_else(|| request.uri());

    let host = request
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("");

    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    canonical_url(scheme, host, path_and_query)
}

/// Signature authentication middleware
///
/// Rejects with an empty 403 unless the `Authorization` header carries the hex
/// MAC of the reconstructed request URL.
pub async fn require_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let url = request_url(&state.config.http_scheme, &request);

    let claimed = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("")
        .trim();

    match state.verifier.verify(&url, claimed) {
        Ok(()) => next.run(request).await,
        Err(err @ RelayError::MissingSecret) => {
            error!(url = %url, "Rejecting request: {}", err);
            err.into_response()
        }
        Err(err) => {
            warn!(url = %url, "Rejecting request: {}", err);
            err.into_response()
        }
    }
}
