use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to place {from} at {to}: {source}")]
    Place {
        from:   PathBuf,
        to:     PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no free name for {name:?} in {dir} after {attempts} attempts")]
    NamesExhausted {
        dir:      PathBuf,
        name:     String,
        attempts: u32,
    },

    #[error("file name {0:?} is empty or contains a path separator")]
    InvalidName(String),
}

pub type Result<T> = std::result::Result<T, Error>;
