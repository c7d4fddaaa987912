//! Error types shared across the crate.
//!
//! Two families with different handling:
//! - [`ConfigError`] is fatal. Loading config, topics, templates or the
//!   credential aborts the run.
//! - [`UpstreamError`] is never fatal. Callers turn it into an in-band string
//!   in the spot where the real result would have gone.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid configuration in {}: {reason}", path.display())]
    Validation { path: PathBuf, reason: String },

    #[error("cannot decode credential from {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("prompt template error: {0}")]
    Template(String),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub(crate) fn validation(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Validation {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Maps `NotFound` io errors to [`ConfigError::NotFound`], everything else to `Io`.
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}

/// Failure of a call to an external service (market data, chat completion, feed).
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// No usable client (missing credential or disabled in config).
    #[error("client unavailable")]
    Unavailable,

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            Self::Status {
                status: status.as_u16(),
                detail: e.to_string(),
            }
        } else {
            Self::Transport(e.to_string())
        }
    }
}
