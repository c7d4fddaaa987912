// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod brief;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod feeds;
pub mod http;
pub mod interests;
pub mod llm;
pub mod logging;
pub mod market;
pub mod metrics;
pub mod prompt;
pub mod report;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::dispatch::Dispatcher;
pub use crate::error::{ConfigError, UpstreamError};
pub use crate::report::{process_topics, Report, TopicResult};

use std::path::Path;

use crate::config::{decode_credential, load_topic_map, AppConfig};
use crate::llm::{build_backend, ChatOptions};
use crate::market::MarketClient;

/// The whole batch run: load topics and credential (fatal on failure), build
/// the report (never fatal), write it.
pub async fn run_report(
    cfg: &AppConfig,
    topics_file: &Path,
    key_file: &Path,
    output: &Path,
) -> anyhow::Result<Report> {
    use anyhow::Context;

    let topics = load_topic_map(topics_file).context("Fehler beim Lesen der Topics-Datei")?;
    let credential =
        decode_credential(key_file).context("Fehler beim Entschlüsseln des API-Schlüssels")?;
    tracing::info!(topics = topics.len(), key_len = credential.len(), "configuration loaded");

    let market = MarketClient::new(&cfg.market).context("building market data client")?;
    let llm = build_backend(&cfg.llm, Some(credential));
    let dispatcher = Dispatcher::new(market, llm, ChatOptions::from_config(&cfg.llm));

    let report = process_topics(&topics, &dispatcher).await;
    report
        .write_json(output)
        .context("Fehler beim Schreiben der Ausgabedatei")?;
    Ok(report)
}
