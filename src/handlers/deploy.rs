use axum::{extract::State, http::StatusCode, http::Uri};
use tracing::info;

use crate::models::DeployEvent;
use crate::services::Notifier;

/// Deploy hook endpoint
///
/// Runs behind `require_signature`, so reaching it means the request is
/// authentic. The notification is handed to a detached task and the caller
/// gets 200 immediately, whatever happens to the delivery.
pub async fn relay_deploy(State(notifier): State<Notifier>, uri: Uri) -> StatusCode {
    let mut event = DeployEvent::from_query(uri.query());
    if notifier.destination().channel_from_path() {
        event = event.with_path_channel(uri.path());
    }

    info!(
        app = %event.app,
        release = %event.release,
        user = %event.user,
        channel = ?event.channel,
        "Accepted deploy event"
    );

    // Never awaited; in-flight deliveries may be abandoned on shutdown.
    notifier.dispatch(event);

    StatusCode::OK
}
