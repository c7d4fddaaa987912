// src/feeds/parse.rs
//! RSS 2.0 / RSS 1.0 (RDF) / Atom parsing into [`FeedEntry`] values.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use quick_xml::de::from_str;
use regex::Regex;
use serde::Deserialize;

use super::FeedEntry;

// The root element name is ignored by the deserializer, so one shape covers
// `<rss><channel><item>`, `<rdf:RDF><item>` and `<feed><entry>`.
#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    channel: Option<Channel>,
    #[serde(default)]
    item: Vec<RssItem>,
    #[serde(default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(default)]
    item: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(default)]
    link: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl AtomEntry {
    fn best_link(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
            .or_else(|| self.link.first())
            .and_then(|l| l.href.as_deref())
    }
}

/// Parse a feed document. Entries without a title are skipped.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>> {
    let cleaned = scrub_html_entities_for_xml(xml);
    let doc: Document = from_str(&cleaned).context("parsing feed xml")?;

    let rss = doc
        .channel
        .map(|c| c.item)
        .unwrap_or_default()
        .into_iter()
        .chain(doc.item)
        .map(|it| (it.title.unwrap_or_default(), it.link.unwrap_or_default()));
    let atom = doc.entry.into_iter().map(|e| {
        let link = e.best_link().unwrap_or_default().to_string();
        (e.title.map(|t| t.value).unwrap_or_default(), link)
    });

    let entries = rss
        .chain(atom)
        .filter_map(|(title, link)| {
            let title = normalize_title(&title);
            if title.is_empty() {
                return None;
            }
            Some(FeedEntry::new(title, link.trim()))
        })
        .collect();
    Ok(entries)
}

/// Decode entities, strip tags, collapse whitespace.
pub fn normalize_title(s: &str) -> String {
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").expect("static regex"));
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("static regex"));

    let decoded = html_escape::decode_html_entities(s);
    let no_tags = re_tags.replace_all(&decoded, "");
    re_ws.replace_all(&no_tags, " ").trim().to_string()
}

// quick-xml only knows the five XML entities; feeds love HTML ones.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&bdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
