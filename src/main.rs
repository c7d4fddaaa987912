//! Daily briefing service binary entrypoint.
//! Boots the Axum HTTP server: interest API, daily brief, static UI pages and
//! Prometheus metrics.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;

use daily_briefing::api::{self, AppState};
use daily_briefing::config::{resolve_credential, AppConfig};
use daily_briefing::logging::init_tracing;
use daily_briefing::metrics::Metrics;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    init_tracing("daily_briefing=info,tower_http=warn,warn");

    let cfg = AppConfig::load(None).context("loading briefing config")?;

    // Credential is read once here and injected; nothing reads it later.
    let credential = resolve_credential(&cfg.server.key_file);
    if credential.is_none() {
        tracing::warn!("no OPENAI_API_KEY and no key file; briefs will contain placeholders");
    }

    let state = AppState::from_config(&cfg, credential)?;
    let metrics = Metrics::init()?;
    let router = api::router(state).merge(metrics.router());

    Ok(router.into())
}
