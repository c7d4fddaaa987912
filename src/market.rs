//! Public market data from blockchain.info.
//!
//! Both fetchers are best-effort: failures are logged and collapse to an empty
//! series or `None`, never to an error the caller must handle.

use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

use crate::config::MarketConfig;
use crate::error::UpstreamError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unix seconds.
    pub timestamp: i64,
    /// USD.
    pub price: f64,
}

#[derive(Clone)]
pub struct MarketClient {
    http: reqwest::Client,
    base_url: String,
    chart_days: u32,
}

impl MarketClient {
    pub fn new(cfg: &MarketConfig) -> reqwest::Result<Self> {
        let http = crate::http::build_client(Duration::from_secs(cfg.timeout_secs))?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            chart_days: cfg.chart_days,
        })
    }

    /// Days of history used by the `Chart` subtopic.
    pub fn chart_days(&self) -> u32 {
        self.chart_days
    }

    pub async fn try_price_series(&self, days: u32) -> Result<Vec<PricePoint>, UpstreamError> {
        let url = format!(
            "{}/charts/market-price?timespan={days}days&format=json",
            self.base_url
        );
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_price_series(&body)
    }

    /// Price history for the last `days` days; empty on any failure.
    pub async fn fetch_price_series(&self, days: u32) -> Vec<PricePoint> {
        match self.try_price_series(days).await {
            Ok(points) => points,
            Err(e) => {
                warn!(error = %e, days, "failed to fetch bitcoin price series");
                counter!("upstream_failures_total", "service" => "market_chart").increment(1);
                Vec::new()
            }
        }
    }

    pub async fn try_average_interval(&self) -> Result<f64, UpstreamError> {
        let url = format!("{}/q/interval", self.base_url);
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_interval(&body)
    }

    /// Current average block interval in seconds; `None` on any failure.
    pub async fn fetch_average_interval(&self) -> Option<f64> {
        match self.try_average_interval().await {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(error = %e, "failed to fetch bitcoin block interval");
                counter!("upstream_failures_total", "service" => "market_interval").increment(1);
                None
            }
        }
    }
}

/// Parse a `{"values": [{"x": .., "y": ..}, ..]}` chart body.
/// Entries missing either coordinate are dropped.
pub fn parse_price_series(body: &str) -> Result<Vec<PricePoint>, UpstreamError> {
    let doc: Value =
        serde_json::from_str(body).map_err(|e| UpstreamError::Malformed(e.to_string()))?;
    let Some(values) = doc.get("values").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let points = values
        .iter()
        .filter_map(|entry| {
            let ts = entry.get("x").and_then(Value::as_f64)?;
            let price = entry.get("y").and_then(Value::as_f64)?;
            Some(PricePoint {
                timestamp: ts as i64,
                price,
            })
        })
        .collect();
    Ok(points)
}

/// Parse a plain-text decimal such as `"600.0\n"`.
pub fn parse_interval(body: &str) -> Result<f64, UpstreamError> {
    let trimmed = body.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(UpstreamError::Malformed(format!(
            "expected a decimal, got {trimmed:?}"
        ))),
    }
}
