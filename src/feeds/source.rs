// src/feeds/source.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use super::parse::parse_feed;
use super::FeedEntry;

/// Something that turns a feed URL into entries.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>>;
    fn name(&self) -> &'static str;
}

/// Fetches feeds over HTTP.
pub struct HttpFeedSource {
    client: reqwest::Client,
}

impl HttpFeedSource {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: crate::http::build_client(timeout)?,
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>> {
        let body = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url}"))?
            .text()
            .await
            .context("feed http .text()")?;
        parse_feed(&body).with_context(|| format!("feed {url}"))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Serves XML documents from memory, keyed by URL. Unknown URLs fail like a
/// network error would.
#[derive(Default)]
pub struct FixtureFeedSource {
    docs: HashMap<String, String>,
}

impl FixtureFeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(mut self, url: impl Into<String>, xml: impl Into<String>) -> Self {
        self.docs.insert(url.into(), xml.into());
        self
    }
}

#[async_trait]
impl FeedSource for FixtureFeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>> {
        let xml = self
            .docs
            .get(url)
            .with_context(|| format!("no fixture for {url}"))?;
        parse_feed(xml)
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
