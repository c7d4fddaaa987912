// src/http.rs
use std::time::Duration;

pub const USER_AGENT: &str = concat!("daily-briefing/", env!("CARGO_PKG_VERSION"));

/// Shared reqwest client with a fixed overall timeout. No retries anywhere.
pub fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout.min(Duration::from_secs(4)))
        .timeout(timeout)
        .build()
}
