use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("failed to read {path}: {source}")]
    Read {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("invalid fingerprint {0:?}: expected 64 hex characters")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
