// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod generate;
pub mod telemetry;
pub mod trends;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::config::AppConfig;
pub use crate::generate::mode::Mode;
pub use crate::generate::{Generator, MISSING_KEY_WARNING};
pub use crate::trends::types::{TrendItem, TrendSource};
pub use crate::trends::{fetch_trends, TrendService};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the application router (without `/metrics`) from config.
pub fn app(cfg: &AppConfig, secret_key: Option<String>) -> anyhow::Result<axum::Router> {
    let state = api::AppState::from_config(cfg, secret_key)?;
    Ok(api::router(state))
}

/// Compact tracing logs filtered by `RUST_LOG` (default `trendcast=info,warn`).
/// A no-op when a subscriber is already installed (e.g. by the deployment runtime).
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trendcast=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
