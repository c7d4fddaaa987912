// tests/metrics.rs
//
// The recorder is global, so this binary installs it exactly once.
use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use daily_briefing::config::{MarketConfig, TopicMap};
use daily_briefing::llm::{ChatOptions, UnavailableChat};
use daily_briefing::market::MarketClient;
use daily_briefing::metrics::Metrics;
use daily_briefing::{process_topics, Dispatcher};

#[tokio::test]
async fn metrics_endpoint_exposes_pipeline_counters() {
    let metrics = Metrics::init().expect("install recorder");

    let market = MarketClient::new(&MarketConfig {
        // nothing listens on the discard port
        base_url: "http://127.0.0.1:9".into(),
        timeout_secs: 1,
        ..MarketConfig::default()
    })
    .unwrap();
    let d = Dispatcher::new(market, Arc::new(UnavailableChat), ChatOptions::default());
    let topics: TopicMap = [("Bitcoin", vec!["Blocktime", "News"])].into_iter().collect();
    process_topics(&topics, &d).await;

    let resp = metrics
        .router()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "report_items_total 2",
        "upstream_failures_total{service=\"market_interval\"} 1",
        "llm_requests_total{outcome=\"unavailable\"} 1",
        "build_info{version=",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
}
