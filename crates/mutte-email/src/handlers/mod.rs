pub mod emails;
pub mod types;

pub use emails::routes;
