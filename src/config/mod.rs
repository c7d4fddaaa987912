// src/config/mod.rs
//! Startup configuration: app settings, topic map and credential.
//! Everything here is loaded once and passed down explicitly.

pub mod app;
pub mod credential;
pub mod topics;

pub use app::{AppConfig, LlmConfig, MarketConfig, ServerConfig};
pub use credential::{decode_credential, resolve_credential, Credential, ENV_API_KEY};
pub use topics::{load_topic_map, TopicEntry, TopicMap};
