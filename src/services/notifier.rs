use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use url::Url;

use crate::config::{Config, Destination, MessageConfig};
use crate::error::RelayError;
use crate::models::{DeployEvent, SlackMessage};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Message line for a deploy: `<pretext> @<user> deployed *<app>* <release>`, trimmed.
pub fn format_text(pretext: &str, user: &str, app: &str, release: &str) -> String {
    format!("{} @{} deployed *{}* {}", pretext, user, app, release)
        .trim()
        .to_string()
}

/// Chat webhook notifier.
///
/// Cheap to clone; the destination table is shared, never copied.
#[derive(Clone)]
pub struct Notifier {
    client: Client,
    destination: Arc<Destination>,
    message: Arc<MessageConfig>,
}

impl Notifier {
    pub fn new(destination: Destination, message: MessageConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            destination: Arc::new(destination),
            message: Arc::new(message),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.destination.clone(),
            config.message.clone(),
            config.delivery_timeout,
        )
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Webhook URL for `event`.
    pub fn resolve(&self, event: &DeployEvent) -> Result<Url, RelayError> {
        match self.destination.as_ref() {
            Destination::Single(url) => Ok(url.clone()),
            Destination::ByApp(table) => table
                .get(&event.app)
                .cloned()
                .ok_or_else(|| RelayError::UnknownDestination(event.app.clone())),
        }
    }

    pub fn build_payload(&self, event: &DeployEvent) -> SlackMessage {
        let text = format_text(&self.message.pretext, &event.user, &event.app, &event.release);

        SlackMessage::deploy(
            text,
            &self.message.bot_name,
            &self.message.emoji,
            event.channel.as_deref(),
        )
    }

    /// Resolve, format and post once. No retry.
    pub async fn notify(&self, event: &DeployEvent) -> Result<(), RelayError> {
        let url = self.resolve(event)?;
        let payload = self.build_payload(event);

        let res = self.client.post(url).json(&payload).send().await?;

        let status = res.status();
        if status != StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            return Err(RelayError::DeliveryRejected {
                status: status.as_u16(),
                body,
            });
        }

        if let Some(attachment) = payload.attachments.first() {
            info!(app = %event.app, release = %event.release, "Posted to Slack: {}", attachment.text);
        }

        Ok(())
    }

    /// Deliver in a detached task. Failures are logged and never reach the caller.
    pub fn dispatch(&self, event: DeployEvent) -> JoinHandle<()> {
        let notifier = self.clone();

        tokio::spawn(async move {
            match notifier.notify(&event).await {
                Ok(()) => {}
                Err(RelayError::UnknownDestination(app)) => {
                    warn!("Unknown application {}; dropping notification", app);
                }
                Err(e) => {
                    error!(app = %event.app, release = %event.release, "Slack Error: {}", e);
                }
            }
        })
    }
}
