//! The send pipeline: validate, log, dispatch, record, notify.

pub mod errors;
pub mod handlers;
pub mod services;

pub use errors::SendError;
pub use services::{EmailLogService, EmailService, SendOutcome, SendRequest};
