//! SeaORM entities for the MuTTE relay

pub mod email_logs;
pub mod tenants;
pub mod types;

pub use types::EmailStatus;
