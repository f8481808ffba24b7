//! Error types for sift-fetch.

use std::path::PathBuf;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Malformed URL, unsupported scheme, or no file name in the path.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The resource could not be retrieved: connection refused, DNS failure,
    /// timeout, a broken body stream, or a non-success status.
    #[error("transport error for {url}: {source}")]
    Transport {
        url:     String,
        status:  Option<u16>,
        timeout: bool,
        #[source]
        source:  BoxError,
    },

    /// Local disk failure while staging the body.
    #[error("I/O error on {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Staging(#[from] sift_fs::Error),
}

impl FetchError {
    pub(crate) fn invalid_url(url: &str, reason: impl Into<String>) -> Self {
        FetchError::InvalidUrl {
            url:    url.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        FetchError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// HTTP status of a transport failure, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool { matches!(self, FetchError::Transport { .. }) }

    /// Whether another attempt could plausibly succeed.
    ///
    /// Transport failures are retryable unless the server gave a definitive
    /// client-error answer (4xx other than 408 and 429). Invalid URLs and
    /// local I/O failures are permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport { status: None, .. } => true,
            FetchError::Transport {
                status: Some(code), ..
            } => !(400..500).contains(code) || matches!(code, 408 | 429),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
