// Services
// Outbound delivery of deploy notifications.

pub mod notifier;

pub use notifier::{format_text, Notifier};
