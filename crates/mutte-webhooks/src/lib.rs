//! Delivery notifications for tenant webhooks.
//!
//! Notifications are fire-and-forget: a failed or slow webhook endpoint
//! never affects the outcome of the send that triggered it.

mod events;
mod notifier;

pub use events::{WebhookEvent, WebhookEventType};
pub use notifier::WebhookNotifier;
