//! Prints the latest feed entries and a Markdown brief per active interest,
//! then a short fact about the first one.

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use daily_briefing::brief::random_fact;
use daily_briefing::cli::FeedArgs;
use daily_briefing::config::{resolve_credential, AppConfig};
use daily_briefing::feeds::{FeedAggregator, FeedTable, HttpFeedSource};
use daily_briefing::interests::load_interests;
use daily_briefing::llm::{build_backend, ChatOptions};
use daily_briefing::logging::init_tracing;
use daily_briefing::prompt::fact_topic;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing("warn");

    let args = FeedArgs::parse();
    let cfg = AppConfig::load(args.config.as_deref())?;
    let interests = load_interests(&args.interests)?;

    let llm = build_backend(&cfg.llm, resolve_credential(&cfg.server.key_file));
    let table = cfg.feeds.clone().map(FeedTable::new).unwrap_or_default();
    let source = HttpFeedSource::new(Duration::from_secs(cfg.server.feed_timeout_secs))?;
    let options = ChatOptions::from_config(&cfg.llm);
    let aggregator = FeedAggregator::new(table, Arc::new(source), llm.clone(), options.clone());

    for interest in interests.active() {
        println!("\n=== Hole aktuelle Themen für {interest} ===");
        let latest = aggregator.fetch_latest(interest, args.limit).await;
        for (i, item) in latest.iter().enumerate() {
            println!("{}. {}", i + 1, item.title);
        }

        println!("\n=== Erstelle Daily Brief ===");
        println!("{}", aggregator.generate_brief(interest, &latest).await);
    }

    let active: Vec<&str> = interests.active().collect();
    let topic = fact_topic(&active[..]);
    println!("\n## Zufälliger Fakt über '{topic}':");
    println!("{}", random_fact(llm.as_ref(), &options, topic).await);
    Ok(())
}
