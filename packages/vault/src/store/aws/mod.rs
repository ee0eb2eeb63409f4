//! AWS Secrets Manager backend
//!
//! Contains client construction, the store operations, and SDK error classification.

pub mod client;
pub mod errors;
pub mod secrets;

pub use client::AwsSecretStore;
pub use errors::classify_error_code;
