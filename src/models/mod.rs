// Data models
// Inbound deploy events and outbound chat payloads.

pub mod deploy;
pub mod notification;

pub use deploy::DeployEvent;
pub use notification::{Attachment, SlackMessage};
