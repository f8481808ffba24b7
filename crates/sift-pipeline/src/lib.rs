//! Concurrent fetch → fingerprint → dedup → commit pipeline.
//!
//! The [`Coordinator`] takes a sequence of [`CandidateResource`]s and runs
//! each through a bounded pool of workers:
//!
//! 1. stream the URL into a staged temporary file ([`sift_fetch::Fetcher`]);
//! 2. fingerprint the staged file;
//! 3. reserve the fingerprint in the shared [`sift_dedup::DedupIndex`];
//! 4. place the file under its final name, or discard it as a duplicate.
//!
//! Every candidate yields exactly one [`FetchOutcome`]. Failures are captured
//! per candidate and never stop the rest of the batch.

mod candidate;
mod coordinator;
mod error;
mod options;
mod outcome;

pub use candidate::CandidateResource;
pub use coordinator::Coordinator;
pub use error::{ErrorKind, PipelineError, Result};
pub use options::PipelineOptions;
pub use outcome::{CandidateOutcome, FailureRecord, FetchOutcome, Summary};

pub use tokio_util::sync::CancellationToken;
