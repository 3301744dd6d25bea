//! HTTP API for athletes and their performance metrics.

pub mod app;
pub mod config;
pub mod error;
pub mod features;
pub mod openapi;
pub mod state;

pub use app::build_router;
pub use config::Config;
pub use state::AppState;

/// Installs the fmt subscriber used by every binary, honouring `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
