use std::path::PathBuf;

use serde::Serialize;

use crate::{CandidateResource, ErrorKind, PipelineError};

/// Terminal result of processing one candidate.
#[derive(Debug)]
pub enum FetchOutcome {
    /// New content, placed at this path.
    Saved(PathBuf),

    /// Content already owned by the file at `of`; nothing was written.
    Duplicate { of: PathBuf },

    /// Not processed, for the given reason.
    Skipped(String),

    Failed(PipelineError),
}

impl FetchOutcome {
    pub fn is_saved(&self) -> bool { matches!(self, FetchOutcome::Saved(_)) }

    pub fn is_duplicate(&self) -> bool { matches!(self, FetchOutcome::Duplicate { .. }) }

    pub fn is_failed(&self) -> bool { matches!(self, FetchOutcome::Failed(_)) }

    pub fn error(&self) -> Option<&PipelineError> {
        match self {
            FetchOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// A candidate paired with its outcome.
#[derive(Debug)]
pub struct CandidateOutcome {
    pub candidate: CandidateResource,
    pub outcome:   FetchOutcome,
    /// Fetch attempts made; 0 when the candidate was never fetched.
    pub attempts:  u32,
}

/// A failed URL with its reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub url:    String,
    pub kind:   ErrorKind,
    pub reason: String,
}

/// Per-kind outcome counts of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub saved:     usize,
    pub duplicate: usize,
    pub skipped:   usize,
    pub failed:    usize,
    pub failures:  Vec<FailureRecord>,
}

impl Summary {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a CandidateOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            summary.record(outcome);
        }
        summary
    }

    pub fn record(&mut self, outcome: &CandidateOutcome) {
        match &outcome.outcome {
            FetchOutcome::Saved(_) => self.saved += 1,
            FetchOutcome::Duplicate { .. } => self.duplicate += 1,
            FetchOutcome::Skipped(_) => self.skipped += 1,
            FetchOutcome::Failed(e) => self.record_failure(&outcome.candidate.url, e.kind(), e.to_string()),
        }
    }

    /// Count a failure that happened outside the coordinator, e.g. a
    /// manifest row whose URL could not be turned into a candidate.
    pub fn record_failure(&mut self, url: &str, kind: ErrorKind, reason: String) {
        self.failed += 1;
        self.failures.push(FailureRecord {
            url: url.to_string(),
            kind,
            reason,
        });
    }

    pub fn record_skip(&mut self) { self.skipped += 1; }

    pub fn total(&self) -> usize { self.saved + self.duplicate + self.skipped + self.failed }
}
