// src/feeds/mod.rs
//! Feed aggregation: a small static table of free feeds per interest, fetched
//! on demand and turned into a Markdown brief by the LLM.

pub mod parse;
pub mod source;

use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::llm::{complete, ChatOptions, DynChat, BRIEFING_ASSISTANT};
use crate::prompt::feed_brief_prompt;

pub use parse::parse_feed;
pub use source::{FeedSource, FixtureFeedSource, HttpFeedSource};

pub const DEFAULT_LIMIT: usize = 5;
const BRIEF_MAX_TOKENS: u32 = 400;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
}

impl FeedEntry {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Interest category → feed URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedTable {
    feeds: BTreeMap<String, Vec<String>>,
}

impl Default for FeedTable {
    fn default() -> Self {
        let mut feeds = BTreeMap::new();
        for (interest, urls) in [
            (
                "News",
                &[
                    "https://rss.dw.com/rdf/rss-en-ger",
                    "https://feeds.bbci.co.uk/news/world/rss.xml",
                ][..],
            ),
            (
                "Technology",
                &[
                    "https://www.heise.de/rss/heise-top-atom.xml",
                    "https://www.theverge.com/rss/index.xml",
                ][..],
            ),
            ("Science", &["https://www.sciencenews.org/feed"][..]),
        ] {
            feeds.insert(
                interest.to_string(),
                urls.iter().map(|u| u.to_string()).collect(),
            );
        }
        Self { feeds }
    }
}

impl FeedTable {
    pub fn new(feeds: BTreeMap<String, Vec<String>>) -> Self {
        Self { feeds }
    }

    /// Feed URLs for an interest (case-insensitive). Unknown → empty.
    pub fn urls_for(&self, interest: &str) -> &[String] {
        let wanted = interest.trim();
        self.feeds
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(wanted))
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn interests(&self) -> impl Iterator<Item = &str> {
        self.feeds.keys().map(String::as_str)
    }
}

pub struct FeedAggregator {
    table: FeedTable,
    source: Arc<dyn FeedSource>,
    llm: DynChat,
    options: ChatOptions,
}

impl FeedAggregator {
    pub fn new(table: FeedTable, source: Arc<dyn FeedSource>, llm: DynChat, options: ChatOptions) -> Self {
        Self {
            table,
            source,
            llm,
            options: options
                .with_system(BRIEFING_ASSISTANT)
                .with_max_tokens(BRIEF_MAX_TOKENS),
        }
    }

    pub fn table(&self) -> &FeedTable {
        &self.table
    }

    /// Up to `limit` entries across all feeds of `interest`: each feed
    /// contributes at most `limit`, the concatenation is cut to `limit`.
    /// A failing feed is logged and skipped.
    pub async fn fetch_latest(&self, interest: &str, limit: usize) -> Vec<FeedEntry> {
        let mut results = Vec::new();
        for url in self.table.urls_for(interest) {
            match self.source.fetch(url).await {
                Ok(entries) => results.extend(entries.into_iter().take(limit)),
                Err(e) => {
                    warn!(error = ?e, interest, feed = %url, source = self.source.name(), "feed error");
                    counter!("upstream_failures_total", "service" => "feed").increment(1);
                }
            }
        }
        results.truncate(limit);
        counter!("feed_entries_total").increment(results.len() as u64);
        info!(interest, count = results.len(), "feed entries collected");
        results
    }

    /// Markdown brief for one interest, or a fixed stub when there is nothing to report.
    pub async fn generate_brief(&self, interest: &str, entries: &[FeedEntry]) -> String {
        if entries.is_empty() {
            return format!("### {interest}\nKeine aktuellen Themen gefunden.");
        }
        let prompt = feed_brief_prompt(interest, entries);
        complete(self.llm.as_ref(), &prompt, &self.options).await
    }
}
