//! Interest set: `{"News": true, "Science": false, ...}` persisted as JSON.
//!
//! The file is the source of truth between requests. It is always read and
//! replaced as a whole; concurrent saves are not coordinated (last writer wins).

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Ordered interest name → active flag mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterestSet {
    entries: Vec<(String, bool)>,
}

impl InterestSet {
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, bool)>) -> Self {
        let mut set = Self::default();
        for (name, active) in pairs {
            set.insert(name, active);
        }
        set
    }

    /// Insert or overwrite; an existing name keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, active: bool) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = active,
            None => self.entries.push((name, active)),
        }
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, a)| n == name && *a)
    }

    /// Names of active interests in set order.
    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, a)| *a)
            .map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(n, a)| (n.as_str(), *a))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for InterestSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, active) in &self.entries {
            map.serialize_entry(name, active)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for InterestSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = InterestSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of interest names to booleans")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut set = InterestSet::default();
                while let Some((name, active)) = access.next_entry::<String, bool>()? {
                    set.insert(name, active);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(SetVisitor)
    }
}

/// File-backed storage for the [`InterestSet`].
#[derive(Debug, Clone)]
pub struct InterestStore {
    path: PathBuf,
}

impl InterestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole set. A missing file is an empty set.
    pub fn load(&self) -> Result<InterestSet> {
        let data = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no interest file yet");
                return Ok(InterestSet::default());
            }
            Err(e) => return Err(ConfigError::from_io(&self.path, e)),
        };
        serde_json::from_str(&data).map_err(|e| ConfigError::validation(&self.path, e.to_string()))
    }

    /// Replace the file contents with `set` (pretty JSON, two-space indent).
    pub fn save(&self, set: &InterestSet) -> Result<()> {
        let json = serde_json::to_string_pretty(set)
            .map_err(|e| ConfigError::validation(&self.path, e.to_string()))?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| ConfigError::from_io(dir, e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let write = || -> std::io::Result<()> {
            let mut f = fs::File::create(&tmp)?;
            f.write_all(json.as_bytes())?;
            f.write_all(b"\n")?;
            fs::rename(&tmp, &self.path)
        };
        write().map_err(|e| ConfigError::from_io(&self.path, e))
    }
}

/// Plain-text interest list: one name per line, blank lines and `#` comments skipped.
pub fn parse_interest_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read a plain-text interest list. A missing file is logged and reads as empty.
pub fn load_interest_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(text) => Ok(parse_interest_list(&text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(
                path = %path.display(),
                "interest list not found, one interest per line expected"
            );
            Ok(Vec::new())
        }
        Err(e) => Err(ConfigError::from_io(path, e)),
    }
}

/// Load either a JSON interest set or, for `.txt` files, a plain list where
/// every listed interest is active.
pub fn load_interests<P: AsRef<Path>>(path: P) -> Result<InterestSet> {
    let path = path.as_ref();
    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("txt")) {
        let names = load_interest_list(path)?;
        return Ok(InterestSet::from_pairs(names.into_iter().map(|n| (n, true))));
    }
    InterestStore::new(path).load()
}
