//! Prompt construction. All prompts ask for German output and carry the
//! current UTC date so the model anchors its answer to "today".

use chrono::{NaiveDate, Utc};
use serde_yaml::Value;
use std::fs;
use std::path::Path;

use crate::dispatch::{route, Action, Route};
use crate::error::{ConfigError, Result};
use crate::feeds::FeedEntry;
use crate::interests::InterestSet;

pub const INTERESTS_PLACEHOLDER: &str = "{interests}";
pub const DATE_PLACEHOLDER: &str = "{date}";

const DEFAULT_TEMPLATE: &str = "Erstelle ein kurzes tägliches Briefing in deutscher Sprache zum {date} \
zu folgenden Interessen: {interests}. Fasse pro Interesse die wichtigsten aktuellen Entwicklungen \
in zwei bis drei Bulletpoints zusammen.";

/// LLM-backed news subtopics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsDesk {
    Bitcoin,
    ChatGpt,
    Politics,
}

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn news_prompt(desk: NewsDesk, date: NaiveDate) -> String {
    let d = date.format("%Y-%m-%d");
    match desk {
        NewsDesk::Bitcoin => format!(
            "Fasse die wichtigsten Nachrichten zum Thema Bitcoin zum heutigen Datum {d} \
             in deutscher Sprache zusammen. Führe die Meldungen in kurzen Bulletpoints auf."
        ),
        NewsDesk::ChatGpt => format!(
            "Welche aktuellen Nachrichten (Stand {d}) gibt es rund um ChatGPT und die \
             neuesten Entwicklungen bei OpenAI? Fasse die wichtigsten Punkte in deutscher \
             Sprache in kurzen Bulletpoints zusammen."
        ),
        NewsDesk::Politics => format!(
            "Welche aktuellen politischen Entscheidungen oder Abstimmungen wurden in \
             Deutschland zum heutigen Datum {d} getroffen? Bitte fasse die wichtigsten Punkte \
             in deutscher Sprache in kurzen Bulletpoints zusammen."
        ),
    }
}

/// Prompt for a (topic, subtopic) pair, or `None` when the pair is not an LLM task.
pub fn build_prompt(topic: &str, subtopic: &str, date: NaiveDate) -> Option<String> {
    match route(topic, subtopic) {
        Route::Run(Action::News(desk)) => Some(news_prompt(desk, date)),
        _ => None,
    }
}

/// Prompt for a Markdown digest of feed entries.
pub fn feed_brief_prompt(interest: &str, entries: &[FeedEntry]) -> String {
    let context = entries
        .iter()
        .map(|e| format!("- {} ({})", e.title, e.link))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Erstelle ein kompaktes Markdown-Briefing zu den folgenden aktuellen Themen für '{interest}'.\n\
         Fasse die wichtigsten Punkte in 2-3 Sätzen pro Meldung zusammen, mit Link:\n{context}\n"
    )
}

/// Topic for the daily fact when no interests are configured.
pub const FACT_FALLBACK_TOPIC: &str = "Wissenschaft";

/// First listed interest, or [`FACT_FALLBACK_TOPIC`].
pub fn fact_topic<S: AsRef<str>>(interests: &[S]) -> &str {
    interests
        .first()
        .map(AsRef::as_ref)
        .unwrap_or(FACT_FALLBACK_TOPIC)
}

pub fn fact_prompt(interest: &str) -> String {
    format!("Nenne einen interessanten und wenig bekannten Fakt zum Thema '{interest}'. Max. 50 Wörter.")
}

/// Daily-brief prompt with a `{interests}` placeholder, loaded from YAML
/// (`prompt_template: "..."`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::from_io(path, e))?;
        let doc: Value = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::validation(path, e.to_string()))?;
        let text = doc
            .get("prompt_template")
            .and_then(Value::as_str)
            .ok_or_else(|| ConfigError::validation(path, "missing string key 'prompt_template'"))?;
        Ok(Self::new(text))
    }

    /// Substitute the comma-joined active interests (and the date).
    pub fn render(&self, interests: &InterestSet, date: NaiveDate) -> Result<String> {
        if !self.text.contains(INTERESTS_PLACEHOLDER) {
            return Err(ConfigError::Template(format!(
                "placeholder {INTERESTS_PLACEHOLDER} not found in template"
            )));
        }
        let joined = interests.active().collect::<Vec<_>>().join(", ");
        let iso = date.format("%Y-%m-%d").to_string();

        // Fill {date} inside the template segments only, so interest names are
        // never rescanned for placeholders.
        let mut out = self
            .text
            .split(INTERESTS_PLACEHOLDER)
            .map(|segment| segment.replace(DATE_PLACEHOLDER, &iso))
            .collect::<Vec<_>>()
            .join(&joined);
        if !self.text.contains(DATE_PLACEHOLDER) {
            out.push_str(&format!("\n\nHeutiges Datum: {iso}"));
        }
        Ok(out)
    }
}
