//! Report assembly and JSON output.

use metrics::counter;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::config::TopicMap;
use crate::dispatch::{Dispatcher, Unrecognized};
use crate::error::UpstreamError;
use crate::llm::render_error;
use crate::market::PricePoint;

/// Outcome of one (topic, subtopic) pair. Stays structured until serialization.
#[derive(Debug)]
pub enum TopicResult {
    PriceSeries(Vec<PricePoint>),
    /// Seconds; `None` when the upstream call failed.
    Interval(Option<f64>),
    Text(String),
    Failed(UpstreamError),
    Unrecognized(Unrecognized),
}

impl TopicResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::Unrecognized(_))
    }
}

impl Serialize for TopicResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::PriceSeries(points) => points.serialize(serializer),
            Self::Interval(v) => v.serialize(serializer),
            Self::Text(t) => serializer.serialize_str(t),
            Self::Failed(e) => serializer.serialize_str(&render_error(e)),
            Self::Unrecognized(u) => serializer.collect_str(u),
        }
    }
}

#[derive(Debug, Default)]
pub struct TopicSection {
    pub name: String,
    pub entries: Vec<(String, TopicResult)>,
}

impl TopicSection {
    pub fn get(&self, subtopic: &str) -> Option<&TopicResult> {
        self.entries.iter().find(|(s, _)| s == subtopic).map(|(_, r)| r)
    }
}

/// topic → subtopic → result, in insertion order.
#[derive(Debug, Default)]
pub struct Report {
    sections: Vec<TopicSection>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result. A repeated (topic, subtopic) pair replaces the earlier
    /// value and keeps its first position.
    pub fn insert(&mut self, topic: &str, subtopic: &str, result: TopicResult) {
        let idx = match self.sections.iter().position(|s| s.name == topic) {
            Some(i) => i,
            None => {
                self.sections.push(TopicSection {
                    name: topic.to_string(),
                    entries: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        let section = &mut self.sections[idx];
        match section.entries.iter_mut().find(|(s, _)| s == subtopic) {
            Some(slot) => {
                debug!(topic, subtopic, "duplicate subtopic overwritten");
                slot.1 = result;
            }
            None => section.entries.push((subtopic.to_string(), result)),
        }
    }

    /// Make sure a topic key exists even if it has no subtopics.
    fn ensure_topic(&mut self, topic: &str) {
        if !self.sections.iter().any(|s| s.name == topic) {
            self.sections.push(TopicSection {
                name: topic.to_string(),
                entries: Vec::new(),
            });
        }
    }

    pub fn section(&self, topic: &str) -> Option<&TopicSection> {
        self.sections.iter().find(|s| s.name == topic)
    }

    pub fn get(&self, topic: &str, subtopic: &str) -> Option<&TopicResult> {
        self.section(topic)?.get(subtopic)
    }

    pub fn sections(&self) -> &[TopicSection] {
        &self.sections
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON (UTF-8, non-ASCII kept literal).
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = self.to_json_pretty()?;
        fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Entries<'a>(&'a [(String, TopicResult)]);

        impl Serialize for Entries<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (sub, result) in self.0 {
                    map.serialize_entry(sub, result)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for section in &self.sections {
            map.serialize_entry(&section.name, &Entries(&section.entries))?;
        }
        map.end()
    }
}

/// Walk every (topic, subtopic) pair in order and collect the results.
/// Calls are sequential; failures are recorded in-band and never stop the run.
pub async fn process_topics(topics: &TopicMap, dispatcher: &Dispatcher) -> Report {
    let mut report = Report::new();
    for entry in topics.iter() {
        report.ensure_topic(&entry.name);
        for sub in &entry.subtopics {
            let result = dispatcher.dispatch(&entry.name, sub).await;
            if result.is_failure() {
                debug!(topic = %entry.name, subtopic = %sub, "item degraded");
            }
            counter!("report_items_total").increment(1);
            report.insert(&entry.name, sub, result);
        }
    }
    info!(topics = topics.len(), "report assembled");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Topic;

    #[test]
    fn serializes_each_variant() {
        let mut r = Report::new();
        r.insert(
            "Bitcoin",
            "Chart",
            TopicResult::PriceSeries(vec![PricePoint { timestamp: 1, price: 2.5 }]),
        );
        r.insert("Bitcoin", "Blocktime", TopicResult::Interval(None));
        r.insert(
            "Bitcoin",
            "xyz",
            TopicResult::Unrecognized(Unrecognized::Subtopic {
                topic: Topic::Bitcoin,
                subtopic: "xyz".into(),
            }),
        );
        r.insert("IT", "ChatGPT news", TopicResult::Failed(UpstreamError::Timeout));

        let v: serde_json::Value = serde_json::from_str(&r.to_json_pretty().unwrap()).unwrap();
        assert_eq!(v["Bitcoin"]["Chart"][0]["timestamp"], 1);
        assert_eq!(v["Bitcoin"]["Chart"][0]["price"], 2.5);
        assert!(v["Bitcoin"]["Blocktime"].is_null());
        assert_eq!(v["Bitcoin"]["xyz"], "[Unbekannter Bitcoin-Unterpunkt: xyz]");
        assert_eq!(
            v["IT"]["ChatGPT news"],
            "[Fehler bei der OpenAI-Abfrage: request timed out]"
        );
    }

    #[test]
    fn json_parses_back_to_the_same_mapping() {
        let mut r = Report::new();
        r.insert(
            "Bitcoin",
            "Chart",
            TopicResult::PriceSeries(vec![
                PricePoint { timestamp: 1_700_000_000, price: 36512.25 },
                PricePoint { timestamp: 1_700_086_400, price: 37001.0 },
            ]),
        );
        r.insert("Bitcoin", "Blocktime", TopicResult::Interval(None));
        r.insert("Bitcoin", "News", TopicResult::Text("- Kurs steigt".into()));
        r.insert(
            "IT",
            "ChatGPT news",
            TopicResult::Failed(UpstreamError::Status {
                status: 429,
                detail: "Rate limit".into(),
            }),
        );
        r.insert(
            "Foo",
            "Bar",
            TopicResult::Unrecognized(Unrecognized::Topic("Foo".into())),
        );

        let expected = serde_json::json!({
            "Bitcoin": {
                "Chart": [
                    {"timestamp": 1_700_000_000, "price": 36512.25},
                    {"timestamp": 1_700_086_400, "price": 37001.0}
                ],
                "Blocktime": null,
                "News": "- Kurs steigt"
            },
            "IT": {
                "ChatGPT news": "[Fehler bei der OpenAI-Abfrage: HTTP 429: Rate limit]"
            },
            "Foo": {
                "Bar": "[Unbekanntes Thema: Foo]"
            }
        });

        let parsed: serde_json::Value = serde_json::from_str(&r.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn duplicate_pair_overwrites_in_place() {
        let mut r = Report::new();
        r.insert("T", "a", TopicResult::Text("first".into()));
        r.insert("T", "b", TopicResult::Text("b".into()));
        r.insert("T", "a", TopicResult::Text("second".into()));
        let json = r.to_json_pretty().unwrap();
        assert_eq!(json, "{\n  \"T\": {\n    \"a\": \"second\",\n    \"b\": \"b\"\n  }\n}");
    }

    #[test]
    fn non_ascii_is_not_escaped() {
        let mut r = Report::new();
        r.insert("Politik", "Abstimmungen", TopicResult::Text("Große Mehrheit für Änderung".into()));
        let json = r.to_json_pretty().unwrap();
        assert!(json.contains("Große Mehrheit für Änderung"));
        assert!(!json.contains("\\u"));
    }
}
