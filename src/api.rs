use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};

use crate::brief::{assemble, BriefInputs, DailyBrief};
use crate::config::{AppConfig, Credential};
use crate::error::ConfigError;
use crate::feeds::{FeedAggregator, FeedTable, HttpFeedSource};
use crate::interests::{InterestSet, InterestStore};
use crate::llm::{build_backend, ChatOptions, DynChat};
use crate::prompt::{today_utc, PromptTemplate};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<InterestStore>,
    pub llm: DynChat,
    pub options: ChatOptions,
    pub template: Arc<PromptTemplate>,
    pub feeds: Option<Arc<FeedAggregator>>,
    pub feed_limit: usize,
    pub static_dir: PathBuf,
}

impl AppState {
    /// Wire everything from config. The credential is resolved by the caller
    /// once at startup and injected here.
    pub fn from_config(cfg: &AppConfig, credential: Option<Credential>) -> anyhow::Result<Self> {
        let llm = build_backend(&cfg.llm, credential);
        let options = ChatOptions::from_config(&cfg.llm);
        let template = load_template(&cfg.server.prompt_path)?;

        let feeds = if cfg.server.include_feeds {
            let table = cfg
                .feeds
                .clone()
                .map(FeedTable::new)
                .unwrap_or_default();
            let source = HttpFeedSource::new(Duration::from_secs(cfg.server.feed_timeout_secs))
                .context("building feed http client")?;
            Some(Arc::new(FeedAggregator::new(
                table,
                Arc::new(source),
                llm.clone(),
                options.clone(),
            )))
        } else {
            None
        };

        info!(
            provider = llm.provider_name(),
            interests = %cfg.server.interests_path.display(),
            include_feeds = cfg.server.include_feeds,
            "app state ready"
        );

        Ok(Self {
            store: Arc::new(InterestStore::new(&cfg.server.interests_path)),
            llm,
            options,
            template: Arc::new(template),
            feeds,
            feed_limit: cfg.server.feed_limit,
            static_dir: cfg.server.static_dir.clone(),
        })
    }
}

/// A missing template file falls back to the built-in prompt; a broken one is fatal.
fn load_template(path: &Path) -> anyhow::Result<PromptTemplate> {
    match PromptTemplate::from_yaml_file(path) {
        Ok(t) => Ok(t),
        Err(ConfigError::NotFound(_)) => {
            info!(path = %path.display(), "no prompt template, using built-in");
            Ok(PromptTemplate::default())
        }
        Err(e) => Err(e).context("loading prompt template"),
    }
}

pub fn router(state: AppState) -> Router {
    let pages = state.static_dir.clone();

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route_service("/", ServeFile::new(pages.join("index.html")))
        .route_service("/interests", ServeFile::new(pages.join("interests.html")))
        .nest_service("/static", ServeDir::new(&pages))
        .route("/api/interests", get(get_interests).post(save_interests))
        .route("/api/daily-brief", get(daily_brief))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

type ApiError = (StatusCode, Json<Value>);

fn internal(e: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}

async fn get_interests(State(state): State<AppState>) -> Result<Json<InterestSet>, ApiError> {
    state.store.load().map(Json).map_err(|e| {
        warn!(error = %e, "cannot read interests");
        internal(e)
    })
}

async fn save_interests(
    State(state): State<AppState>,
    Json(set): Json<InterestSet>,
) -> Result<Json<Value>, ApiError> {
    state.store.save(&set).map_err(|e| {
        warn!(error = %e, "cannot save interests");
        internal(e)
    })?;
    info!(count = set.len(), active = set.active().count(), "interests saved");
    Ok(Json(json!({ "status": "saved" })))
}

async fn daily_brief(State(state): State<AppState>) -> Json<DailyBrief> {
    let date = today_utc();
    let interests = match state.store.load() {
        Ok(set) => set,
        Err(e) => {
            warn!(error = %e, "cannot read interests for brief");
            return Json(DailyBrief::failed(date, String::new(), e.to_string()));
        }
    };

    let brief = assemble(BriefInputs {
        interests: &interests,
        template: &state.template,
        llm: state.llm.as_ref(),
        options: &state.options,
        feeds: state.feeds.as_deref().map(|f| (f, state.feed_limit)),
        date,
    })
    .await;

    if !brief.is_success() {
        warn!(error = ?brief.error_message, "daily brief degraded");
    }
    Json(brief)
}
