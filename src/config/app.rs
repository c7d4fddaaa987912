// src/config/app.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::error::{ConfigError, Result};

pub const ENV_CONFIG_PATH: &str = "BRIEFING_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/briefing.toml";

/// Application settings loaded from `config/briefing.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub market: MarketConfig,
    pub server: ServerConfig,
    /// Optional override of the built-in interest → feed URL table.
    pub feeds: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    pub enabled: bool,
    /// OpenAI-compatible API root, without the `/chat/completions` suffix.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.5,
            max_tokens: 800,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarketConfig {
    pub base_url: String,
    pub chart_days: u32,
    pub timeout_secs: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: "https://blockchain.info".to_string(),
            chart_days: 30,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub interests_path: PathBuf,
    pub prompt_path: PathBuf,
    pub static_dir: PathBuf,
    /// Append one feed-based section per active interest to the daily brief.
    pub include_feeds: bool,
    pub feed_limit: usize,
    /// Per-request timeout for feed downloads.
    pub feed_timeout_secs: u64,
    pub key_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            interests_path: PathBuf::from("config/interests.json"),
            prompt_path: PathBuf::from("config/prompt.yaml"),
            static_dir: PathBuf::from("static"),
            include_feeds: true,
            feed_limit: 5,
            feed_timeout_secs: 10,
            key_file: PathBuf::from("api_key.enc"),
        }
    }
}

impl AppConfig {
    /// Parse a TOML file. A missing file is `NotFound`, bad TOML is `Validation`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| ConfigError::from_io(path, e))?;
        let mut cfg: AppConfig =
            toml::from_str(&data).map_err(|e| ConfigError::validation(path, e.to_string()))?;

        // Trailing slashes would double up when joining endpoint paths.
        cfg.llm.base_url = cfg.llm.base_url.trim_end_matches('/').to_string();
        cfg.market.base_url = cfg.market.base_url.trim_end_matches('/').to_string();
        if cfg.server.feed_limit == 0 {
            cfg.server.feed_limit = ServerConfig::default().feed_limit;
        }

        Ok(cfg)
    }

    /// Resolve the config path (explicit arg, then `$BRIEFING_CONFIG_PATH`, then
    /// `config/briefing.toml`) and load it. Only the implicit default may be absent;
    /// in that case built-in defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(p) = explicit {
            return Self::load_from_file(p);
        }
        if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            return Self::load_from_file(PathBuf::from(p));
        }
        match Self::load_from_file(DEFAULT_CONFIG_PATH) {
            Err(ConfigError::NotFound(_)) => {
                tracing::info!(path = DEFAULT_CONFIG_PATH, "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }
}
