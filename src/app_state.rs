//! Application state shared across all handlers.
//!
//! Everything here is built once at startup and only read afterwards.

use std::sync::Arc;

use crate::auth::SignatureVerifier;
use crate::config::Config;
use crate::services::Notifier;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Request signature verifier
    pub verifier: SignatureVerifier,
    /// Chat webhook notifier
    pub notifier: Notifier,
}

impl axum::extract::FromRef<AppState> for Notifier {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.notifier.clone()
    }
}
