pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod server;
pub mod services;
pub mod validation;

pub use server::app;
pub use services::AppState;

/// Installs the tracing subscriber used by both binaries. `RUST_LOG` wins
/// over the default filter.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("escola_api=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
