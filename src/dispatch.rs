//! Topic dispatch.
//!
//! [`route`] is a pure lookup from (topic, subtopic) to a [`Route`];
//! [`Dispatcher::dispatch`] executes it against the market client or the LLM.
//! Unknown topics/subtopics are a route like any other and end up as a
//! placeholder string in the report.

use chrono::NaiveDate;
use std::fmt;

use crate::llm::{try_complete, ChatOptions, DynChat};
use crate::market::MarketClient;
use crate::prompt::{news_prompt, today_utc, NewsDesk};
use crate::report::TopicResult;

/// The fixed set of topics with handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Bitcoin,
    It,
    Politik,
}

impl Topic {
    /// Case-insensitive, whitespace-tolerant lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "bitcoin" => Some(Self::Bitcoin),
            "it" => Some(Self::It),
            "politik" => Some(Self::Politik),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bitcoin => "Bitcoin",
            Self::It => "IT",
            Self::Politik => "Politik",
        }
    }

    fn action_for(self, subtopic: &str) -> Option<Action> {
        let s = subtopic.trim().to_lowercase();
        match self {
            Self::Bitcoin => match s.as_str() {
                "chart" => Some(Action::PriceChart),
                "blocktime" => Some(Action::BlockInterval),
                "news" => Some(Action::News(NewsDesk::Bitcoin)),
                _ => None,
            },
            Self::It => match s.as_str() {
                "chatgpt news" | "chatgpt-news" => Some(Action::News(NewsDesk::ChatGpt)),
                _ => None,
            },
            Self::Politik => (s.starts_with("entscheid") || s.starts_with("abstimm"))
                .then_some(Action::News(NewsDesk::Politics)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    PriceChart,
    BlockInterval,
    News(NewsDesk),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Run(Action),
    UnknownSubtopic(Topic),
    UnknownTopic,
}

pub fn route(topic: &str, subtopic: &str) -> Route {
    match Topic::from_name(topic) {
        None => Route::UnknownTopic,
        Some(t) => match t.action_for(subtopic) {
            Some(a) => Route::Run(a),
            None => Route::UnknownSubtopic(t),
        },
    }
}

/// An unrecognized topic or subtopic, rendered as a bracketed placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unrecognized {
    Topic(String),
    Subtopic { topic: Topic, subtopic: String },
}

impl fmt::Display for Unrecognized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topic(t) => write!(f, "[Unbekanntes Thema: {t}]"),
            Self::Subtopic { topic, subtopic } => {
                write!(f, "[Unbekannter {}-Unterpunkt: {subtopic}]", topic.label())
            }
        }
    }
}

/// Executes routes. Holds everything a handler may need; built once per run.
#[derive(Clone)]
pub struct Dispatcher {
    market: MarketClient,
    llm: DynChat,
    options: ChatOptions,
    date: Option<NaiveDate>,
}

impl Dispatcher {
    pub fn new(market: MarketClient, llm: DynChat, options: ChatOptions) -> Self {
        Self {
            market,
            llm,
            options,
            date: None,
        }
    }

    /// Pin the prompt date instead of using today's UTC date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub async fn dispatch(&self, topic: &str, subtopic: &str) -> TopicResult {
        match route(topic, subtopic) {
            Route::UnknownTopic => TopicResult::Unrecognized(Unrecognized::Topic(topic.to_string())),
            Route::UnknownSubtopic(t) => TopicResult::Unrecognized(Unrecognized::Subtopic {
                topic: t,
                subtopic: subtopic.to_string(),
            }),
            Route::Run(action) => self.run(action).await,
        }
    }

    async fn run(&self, action: Action) -> TopicResult {
        match action {
            Action::PriceChart => {
                TopicResult::PriceSeries(self.market.fetch_price_series(self.market.chart_days()).await)
            }
            Action::BlockInterval => TopicResult::Interval(self.market.fetch_average_interval().await),
            Action::News(desk) => {
                let date = self.date.unwrap_or_else(today_utc);
                let prompt = news_prompt(desk, date);
                match try_complete(self.llm.as_ref(), &prompt, &self.options).await {
                    Ok(text) => TopicResult::Text(text),
                    Err(e) => TopicResult::Failed(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_lookup_normalizes() {
        assert_eq!(Topic::from_name("  BITCOIN "), Some(Topic::Bitcoin));
        assert_eq!(Topic::from_name("It"), Some(Topic::It));
        assert_eq!(Topic::from_name("politik"), Some(Topic::Politik));
        assert_eq!(Topic::from_name("Wetter"), None);
    }

    #[test]
    fn bitcoin_routes() {
        assert_eq!(route("Bitcoin", "Chart"), Route::Run(Action::PriceChart));
        assert_eq!(route("Bitcoin", " blocktime "), Route::Run(Action::BlockInterval));
        assert_eq!(route("Bitcoin", "News"), Route::Run(Action::News(NewsDesk::Bitcoin)));
        assert_eq!(route("Bitcoin", "xyz"), Route::UnknownSubtopic(Topic::Bitcoin));
    }

    #[test]
    fn it_routes_accept_both_spellings_only() {
        assert_eq!(route("IT", "ChatGPT news"), Route::Run(Action::News(NewsDesk::ChatGpt)));
        assert_eq!(route("IT", "chatgpt-News"), Route::Run(Action::News(NewsDesk::ChatGpt)));
        assert_eq!(route("IT", "ChatGPT"), Route::UnknownSubtopic(Topic::It));
    }

    #[test]
    fn politik_prefix_matching() {
        let llm = Route::Run(Action::News(NewsDesk::Politics));
        assert_eq!(route("Politik", "Abstimmung im Bundestag"), llm);
        assert_eq!(route("Politik", "Entscheidungen DE / Abstimmungen"), llm);
        assert_eq!(route("Politik", "ENTSCHEIDUNG"), llm);
        assert_eq!(route("Politik", "Wahlkampf"), Route::UnknownSubtopic(Topic::Politik));
        // prefix, not substring
        assert_eq!(
            route("Politik", "Letzte Abstimmung"),
            Route::UnknownSubtopic(Topic::Politik)
        );
    }

    #[test]
    fn placeholders_keep_raw_names() {
        assert_eq!(
            Unrecognized::Topic("Foo".into()).to_string(),
            "[Unbekanntes Thema: Foo]"
        );
        assert_eq!(
            Unrecognized::Subtopic {
                topic: Topic::Bitcoin,
                subtopic: "xyz".into()
            }
            .to_string(),
            "[Unbekannter Bitcoin-Unterpunkt: xyz]"
        );
        assert_eq!(
            Unrecognized::Subtopic {
                topic: Topic::It,
                subtopic: "Rust".into()
            }
            .to_string(),
            "[Unbekannter IT-Unterpunkt: Rust]"
        );
    }
}
