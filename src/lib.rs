pub mod api;
pub mod audit;
pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod search;

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Honors `RUST_LOG` when set, otherwise falls back to the default filter
/// from [`config::default_log_filter`].
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
