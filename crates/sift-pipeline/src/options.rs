use std::time::Duration;

use crate::{PipelineError, Result};

/// Coordinator tuning.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Upper bound on candidates in flight at once. Must be at least 1.
    ///
    /// Default: 4
    pub concurrency_limit: usize,

    /// Extra attempts for retryable transport failures.
    ///
    /// Default: 0
    pub max_retries: u32,

    /// Base delay of the exponential backoff between attempts.
    ///
    /// Default: 100ms
    pub retry_backoff: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            concurrency_limit: 4,
            max_retries:       0,
            retry_backoff:     Duration::from_millis(100),
        }
    }
}

impl PipelineOptions {
    #[must_use]
    pub fn concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.concurrency_limit == 0 {
            return Err(PipelineError::InvalidOptions(
                "concurrency limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
