//! Structured logging for rotation runs
//!
//! `env_logger` backs the `log` facade; `tracing` events reach it through the `log` bridge.
//! Levels are set with `RUST_LOG`, e.g. `RUST_LOG=keyturn_vault=debug`.

use log::{error, info};
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Logging setup and standardised rotation log lines
pub struct LoggingTransformer;

impl LoggingTransformer {
    /// Initialize logging (call once at startup)
    pub fn init() {
        INIT_LOGGER.call_once(|| {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .format_timestamp_micros()
                .init();
        });
    }
}

/// Log a rotation lifecycle event for `secret_id`
///
/// # Parameters
/// * `event_type` - e.g. "ROTATE", "PROMOTE"
/// * `details` - free-form context; never key material
/// * `success` - whether the operation succeeded
pub fn log_rotation_event(event_type: &str, secret_id: &str, details: &str, success: bool) {
    if success {
        info!("[{event_type}] SUCCESS secret={secret_id} {details}");
    } else {
        error!("[{event_type}] FAILURE secret={secret_id} {details}");
    }
}
