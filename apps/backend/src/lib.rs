#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod infra;
pub mod logging;
pub mod protocol;
pub mod services;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod trace_ctx;
pub mod utils;


// Re-exports for public API
pub use config::Settings;
pub use error::AppError;
pub use errors::{ErrorCategory, ErrorCode};
pub use infra::state::build_state;
pub use protocol::{CommandRequest, CommandResponse, ErrorResponse, Reply};
pub use services::CommandDispatcher;
pub use state::app_state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
