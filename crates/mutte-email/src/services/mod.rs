mod log_service;
mod send_service;

pub use log_service::{EmailLogPage, EmailLogService, ListEmailsOptions};
pub use send_service::{EmailService, SendOutcome, SendRequest};
