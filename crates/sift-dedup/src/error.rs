#[derive(Debug, thiserror::Error)]
pub enum DedupError {
    #[error("failed to scan existing files: {0}")]
    Scan(#[from] sift_fs::Error),
}

pub type Result<T> = std::result::Result<T, DedupError>;
