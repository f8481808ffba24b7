use serde::Serialize;
use sift_fetch::FetchError;
use sift_verify::VerifyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("fingerprinting failed: {0}")]
    Fingerprint(#[from] VerifyError),

    #[error("placing file failed: {0}")]
    Place(#[from] sift_fs::Error),

    #[error("worker task failed: {0}")]
    Worker(String),

    #[error("invalid pipeline options: {0}")]
    InvalidOptions(String),
}

/// Coarse failure category reported in summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidUrl,
    Transport,
    Io,
    Internal,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Fetch(FetchError::InvalidUrl { .. }) => ErrorKind::InvalidUrl,
            PipelineError::Fetch(FetchError::Transport { .. }) => ErrorKind::Transport,
            PipelineError::Fetch(FetchError::Io { .. } | FetchError::Staging(_))
            | PipelineError::Fingerprint(_)
            | PipelineError::Place(_) => ErrorKind::Io,
            PipelineError::Worker(_) | PipelineError::InvalidOptions(_) => ErrorKind::Internal,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidUrl => write!(f, "invalid-url"),
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::Io => write!(f, "io"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
