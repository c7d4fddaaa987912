//! Daily brief served by `GET /api/daily-brief`.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::feeds::FeedAggregator;
use crate::interests::InterestSet;
use crate::llm::{complete, render_error, try_complete, ChatBackend, ChatOptions};
use crate::prompt::{fact_prompt, PromptTemplate};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBrief {
    pub title: String,
    pub briefing_text: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DailyBrief {
    pub fn success(date: NaiveDate, text: String) -> Self {
        Self {
            title: title_for(date),
            briefing_text: text,
            timestamp: Utc::now().to_rfc3339(),
            status: STATUS_SUCCESS.to_string(),
            error_message: None,
        }
    }

    /// A brief that still carries whatever text was produced, plus the error.
    pub fn failed(date: NaiveDate, text: String, message: impl Into<String>) -> Self {
        Self {
            title: title_for(date),
            briefing_text: text,
            timestamp: Utc::now().to_rfc3339(),
            status: STATUS_ERROR.to_string(),
            error_message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

fn title_for(date: NaiveDate) -> String {
    format!("Tägliches Briefing {}", date.format("%Y-%m-%d"))
}

/// What goes into one brief.
pub struct BriefInputs<'a> {
    pub interests: &'a InterestSet,
    pub template: &'a PromptTemplate,
    pub llm: &'a dyn ChatBackend,
    pub options: &'a ChatOptions,
    /// `Some` adds one feed section per active interest.
    pub feeds: Option<(&'a FeedAggregator, usize)>,
    pub date: NaiveDate,
}

/// Overview from the template prompt, then feed sections. Interests are
/// handled one at a time. A failed overview marks the brief as `error` but the
/// feed sections are still included.
pub async fn assemble(inputs: BriefInputs<'_>) -> DailyBrief {
    let BriefInputs {
        interests,
        template,
        llm,
        options,
        feeds,
        date,
    } = inputs;

    let prompt = match template.render(interests, date) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "cannot render brief prompt");
            return DailyBrief::failed(date, String::new(), e.to_string());
        }
    };

    let mut parts = Vec::new();
    let mut error = None;
    match try_complete(llm, &prompt, options).await {
        Ok(text) => parts.push(text),
        Err(e) => {
            parts.push(render_error(&e));
            error = Some(e.to_string());
        }
    }

    if let Some((aggregator, limit)) = feeds {
        for interest in interests.active() {
            if aggregator.table().urls_for(interest).is_empty() {
                continue;
            }
            let entries = aggregator.fetch_latest(interest, limit).await;
            parts.push(aggregator.generate_brief(interest, &entries).await);
        }
    }

    let text = parts.join("\n\n");
    match error {
        None => DailyBrief::success(date, text),
        Some(msg) => DailyBrief::failed(date, text, msg),
    }
}

/// A short, little-known fact about `topic`, or the adapter's in-band error text.
pub async fn random_fact(llm: &dyn ChatBackend, options: &ChatOptions, topic: &str) -> String {
    complete(llm, &fact_prompt(topic), options).await
}
