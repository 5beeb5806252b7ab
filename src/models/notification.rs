//! Notification Models
//!
//! Slack-compatible incoming-webhook payload.

use serde::{Deserialize, Serialize};

/// Attachment colour for successful deploys.
pub const COLOR_GOOD: &str = "good";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub text: String,
    pub color: String,
    /// Fields rendered as markdown
    pub mrkdwn_in: Vec<String>,
}

/// Message body posted to the chat webhook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackMessage {
    pub attachments: Vec<Attachment>,
    pub username: String,
    pub icon_emoji: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl SlackMessage {
    /// One green markdown attachment carrying `text`.
    ///
    /// `emoji` and `channel` are bare names; the colon and `#` decorations are added here.
    pub fn deploy(text: String, bot_name: &str, emoji: &str, channel: Option<&str>) -> Self {
        Self {
            attachments: vec![Attachment {
                text,
                color: COLOR_GOOD.to_string(),
                mrkdwn_in: vec!["text".to_string()],
            }],
            username: bot_name.to_string(),
            icon_emoji: format!(":{}:", emoji),
            channel: channel.map(|c| format!("#{}", c)),
        }
    }
}
