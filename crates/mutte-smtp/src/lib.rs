//! SMTP delivery for the MuTTE relay
//!
//! Builds a transport from per-tenant credentials, delivers a message
//! through it, and retries transient failures with exponential backoff.

mod dispatcher;
mod errors;
pub mod mock;
mod retry;
mod transport;
mod types;

pub use dispatcher::Dispatcher;
pub use errors::DispatchError;
pub use retry::RetryPolicy;
pub use transport::{LettreTransportFactory, MailTransport, TransportFactory};
pub use types::{Attachment, DeliveryReceipt, OutgoingEmail, SmtpCredentials};
