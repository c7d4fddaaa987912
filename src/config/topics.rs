// src/config/topics.rs
use serde::Serialize;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Result};

/// One top-level topic and its subtopics, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicEntry {
    pub name: String,
    pub subtopics: Vec<String>,
}

/// Ordered topic → subtopics mapping, immutable after loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TopicMap {
    topics: Vec<TopicEntry>,
}

impl TopicMap {
    pub fn new(topics: Vec<TopicEntry>) -> Self {
        Self { topics }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TopicEntry> {
        self.topics.iter()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&TopicEntry> {
        self.topics.iter().find(|t| t.name == name)
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<S>)> for TopicMap {
    fn from_iter<I: IntoIterator<Item = (S, Vec<S>)>>(iter: I) -> Self {
        let topics = iter
            .into_iter()
            .map(|(name, subs)| TopicEntry {
                name: name.into(),
                subtopics: subs.into_iter().map(Into::into).collect(),
            })
            .collect();
        Self { topics }
    }
}

/// Load a YAML mapping of `topic: [subtopic, ...]`.
pub fn load_topic_map<P: AsRef<Path>>(path: P) -> Result<TopicMap> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::from_io(path, e))?;
    parse_topic_map(&content).map_err(|reason| ConfigError::validation(path, reason))
}

/// Parse YAML text into a [`TopicMap`]; the error is a human-readable reason.
pub fn parse_topic_map(content: &str) -> std::result::Result<TopicMap, String> {
    let doc: Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    let mapping = doc
        .as_mapping()
        .ok_or("topics file must define a mapping from topic to list")?;

    let mut topics = Vec::with_capacity(mapping.len());
    for (key, subs) in mapping {
        // Kept verbatim as the report key; routing normalizes on its own.
        let name = scalar_to_string(key)
            .filter(|s| !s.trim().is_empty())
            .ok_or("topic names must be non-empty scalars")?;

        let list = subs
            .as_sequence()
            .ok_or_else(|| format!("subtopics for '{name}' must be a list"))?;

        let mut subtopics = Vec::with_capacity(list.len());
        for item in list {
            let s = scalar_to_string(item)
                .ok_or_else(|| format!("subtopic under '{name}' is not a string: {item:?}"))?;
            let s = s.trim();
            if s.is_empty() {
                return Err(format!("empty subtopic under '{name}'"));
            }
            subtopics.push(s.to_string());
        }
        topics.push(TopicEntry { name, subtopics });
    }

    Ok(TopicMap { topics })
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(t) => scalar_to_string(&t.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}
