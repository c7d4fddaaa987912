//! Batch run: topics.yaml + api_key.enc -> report.json.

use clap::Parser;

use daily_briefing::cli::ReportArgs;
use daily_briefing::config::AppConfig;
use daily_briefing::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing("info");

    let args = ReportArgs::parse();
    tracing::debug!(?args, "parsed CLI arguments");

    let cfg = AppConfig::load(args.config.as_deref())?;
    let started = std::time::Instant::now();

    daily_briefing::run_report(&cfg, &args.topics_file, &args.key_file, &args.output).await?;

    tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "done");
    println!("Bericht erfolgreich in {} geschrieben.", args.output.display());
    Ok(())
}
