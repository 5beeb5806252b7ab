use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, RelayError>;

/// Failure kinds of the relay.
///
/// Authentication failures deliberately share a single caller-visible outcome
/// (an empty 403) so a client cannot tell a malformed signature from a wrong one.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("HMAC key is not configured")]
    MissingSecret,

    #[error("Unknown destination: {0}")]
    UnknownDestination(String),

    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Delivery rejected with status {status}: {body}")]
    DeliveryRejected { status: u16, body: String },
}

impl RelayError {
    /// True for the kinds that reject the inbound request.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, RelayError::InvalidSignature | RelayError::MissingSecret)
    }

    /// Get status code
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidSignature | RelayError::MissingSecret => StatusCode::FORBIDDEN,
            RelayError::UnknownDestination(_)
            | RelayError::DeliveryFailed(_)
            | RelayError::DeliveryRejected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::DeliveryFailed(err.to_string())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Auth failures are logged where the request URL is known.
        if !self.is_auth_failure() {
            error!(error = %self, "Relay error");
        }

        // No body in any case: the caller learns nothing beyond the status.
        status.into_response()
    }
}
