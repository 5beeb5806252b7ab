//! Router configuration module
//!
//! Every method and path reaches the deploy hook; the path is part of the signed
//! URL and, for a single destination, names the Slack channel.

use axum::{
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::app_state::AppState;
use crate::auth::require_signature;
use crate::handlers::relay_deploy;
use crate::middleware::{enforce_header_limit, request_logger_middleware};

/// Build the application router.
pub fn build_router(app_state: AppState) -> Router {
    let limits = app_state.config.limits.clone();

    Router::new()
        .fallback(relay_deploy)
        .layer(from_fn_with_state(app_state.clone(), require_signature))
        .layer(RequestBodyLimitLayer::new(limits.max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            limits.request_timeout,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(request_logger_middleware))
                .layer(from_fn_with_state(
                    limits.max_header_bytes,
                    enforce_header_limit,
                )),
        )
        .with_state(app_state)
}
