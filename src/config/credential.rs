// src/config/credential.rs
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::path::Path;
use std::{env, fs};

use crate::error::{ConfigError, Result};

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";

/// API credential for the chat-completion service.
///
/// Lives in memory only. `Debug` and `Display` are redacted so the key cannot
/// end up in logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read the key from an environment variable. Unset or blank is `NotFound`.
    pub fn from_env(var: &str) -> Result<Self> {
        match env::var(var) {
            Ok(v) if !v.trim().is_empty() => Ok(Self::new(v)),
            _ => Err(ConfigError::NotFound(format!("${var}").into())),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<{} chars redacted>)", self.0.len())
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Decode a base64-encoded key file (as produced by `echo -n KEY | base64`).
///
/// Every failure, including a missing file, is a [`ConfigError::Decode`].
pub fn decode_credential<P: AsRef<Path>>(path: P) -> Result<Credential> {
    let path = path.as_ref();
    let decode_err = |reason: String| ConfigError::Decode {
        path: path.to_path_buf(),
        reason,
    };

    let raw = fs::read_to_string(path).map_err(|e| decode_err(e.to_string()))?;
    // `base64` wraps at 76 columns, so strip all whitespace, not just the ends.
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| decode_err(format!("invalid base64: {e}")))?;
    let text = String::from_utf8(bytes).map_err(|e| decode_err(format!("not UTF-8: {e}")))?;

    let cred = Credential::new(text);
    if cred.is_empty() {
        return Err(decode_err("decoded key is empty".to_string()));
    }
    Ok(cred)
}

/// Server-side lookup: `$OPENAI_API_KEY` first, then the key file if present.
pub fn resolve_credential(key_file: &Path) -> Option<Credential> {
    if let Ok(c) = Credential::from_env(ENV_API_KEY) {
        tracing::info!(source = "env", key_len = c.len(), "credential loaded");
        return Some(c);
    }
    if !key_file.exists() {
        return None;
    }
    match decode_credential(key_file) {
        Ok(c) => {
            tracing::info!(source = %key_file.display(), key_len = c.len(), "credential loaded");
            Some(c)
        }
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable key file");
            None
        }
    }
}
