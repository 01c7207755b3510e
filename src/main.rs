//! TrendCast server binary.
//! Boots the Axum app on Shuttle: trend listing, generation, the page and `/metrics`.

use shuttle_axum::ShuttleAxum;
use shuttle_runtime::SecretStore;
use trendcast::telemetry::Metrics;
use trendcast::AppConfig;

#[shuttle_runtime::main]
async fn axum(#[shuttle_runtime::Secrets] secrets: SecretStore) -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    trendcast::init_tracing();

    let cfg = AppConfig::load_default()?;
    let secret_key = secrets.get(cfg.generator.provider.key_var());

    let app = trendcast::app(&cfg, secret_key)?;
    let router = match Metrics::init(cfg.trends.cap, cfg.trends.cache_ttl_secs) {
        Ok(m) => app.merge(m.router()),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics disabled");
            app
        }
    };

    tracing::info!(
        source = %cfg.trends.source,
        generator = ?cfg.generator.provider,
        "trendcast ready"
    );
    Ok(router.into())
}
