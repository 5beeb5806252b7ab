use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

/// Total size of the request line target and all headers, in bytes.
pub fn header_bytes(request: &Request) -> usize {
    let target = request.uri().to_string().len();
    let headers: usize = request
        .headers()
        .iter()
        .map(|(name, value)| name.as_str().len() + value.len() + 4)
        .sum();
    target + headers
}

/// Reject requests whose headers exceed `max_bytes` with 431.
pub async fn enforce_header_limit(
    State(max_bytes): State<usize>,
    request: Request,
    next: Next,
) -> Response {
    let size = header_bytes(&request);
    if size > max_bytes {
        warn!(size, max_bytes, "Request headers too large");
        return StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE.into_response();
    }

    next.run(request).await
}
