use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use sift_dedup::{DedupIndex, ReservationResult};
use sift_fetch::{Fetcher, HttpClient, TempArtifact, retry_delay};
use sift_verify::fingerprint_file;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::{CandidateOutcome, CandidateResource, FetchOutcome, PipelineError, PipelineOptions, Result};

const DUPLICATE_URL: &str = "duplicate url in batch";

/// Runs candidates through fetch, fingerprint, dedup and placement with a
/// bounded number of workers.
pub struct Coordinator<C: HttpClient> {
    worker: Arc<Worker<C>>,
}

struct Worker<C: HttpClient> {
    fetcher:    Fetcher<C>,
    index:      Arc<DedupIndex>,
    output_dir: PathBuf,
    options:    PipelineOptions,
}

impl<C: HttpClient + 'static> Coordinator<C> {
    /// Create a coordinator writing unique files into `output_dir`.
    ///
    /// The directory is created if missing and must not be the fetcher's
    /// staging directory. `index` should already be seeded with the
    /// directory's existing files.
    pub fn new(
        fetcher: Fetcher<C>,
        index: Arc<DedupIndex>,
        output_dir: impl Into<PathBuf>,
        options: PipelineOptions,
    ) -> Result<Self> {
        options.validate()?;

        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir).map_err(|e| sift_fs::Error::Write {
            path:   output_dir.clone(),
            source: e,
        })?;
        if same_dir(fetcher.staging().path(), &output_dir) {
            return Err(PipelineError::InvalidOptions(format!(
                "staging directory {} must differ from the output directory",
                output_dir.display()
            )));
        }

        Ok(Self {
            worker: Arc::new(Worker {
                fetcher,
                index,
                output_dir,
                options,
            }),
        })
    }

    pub fn index(&self) -> &Arc<DedupIndex> { &self.worker.index }

    pub fn output_dir(&self) -> &Path { &self.worker.output_dir }

    /// Process every candidate and return one outcome per candidate, in
    /// completion order.
    pub async fn run(&self, candidates: impl IntoIterator<Item = CandidateResource>) -> Vec<CandidateOutcome> {
        self.run_until(candidates, CancellationToken::new()).await
    }

    /// Like [`run`](Self::run), but stops starting new candidates once
    /// `cancel` fires.
    ///
    /// Candidates already in flight finish normally, including cleanup of
    /// their staged files. Candidates never started get no outcome.
    pub async fn run_until(
        &self,
        candidates: impl IntoIterator<Item = CandidateResource>,
        cancel: CancellationToken,
    ) -> Vec<CandidateOutcome> {
        let limit = self.worker.options.concurrency_limit;
        let semaphore = Arc::new(Semaphore::new(limit));
        let mut tasks = FuturesUnordered::new();
        let mut outcomes = Vec::new();
        let mut seen = HashSet::new();

        for candidate in candidates {
            if !seen.insert(candidate.url.clone()) {
                debug!(url = %candidate.url, "skipping repeated url");
                outcomes.push(CandidateOutcome {
                    candidate,
                    outcome: FetchOutcome::Skipped(DUPLICATE_URL.to_string()),
                    attempts: 0,
                });
                continue;
            }

            // The permit is taken before spawning so the task count never
            // exceeds the limit.
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let worker = Arc::clone(&self.worker);
            let token = cancel.clone();
            let task_candidate = candidate.clone();
            let handle = tokio::spawn(async move {
                let _permit = permit;
                worker.process(task_candidate, token).await
            });
            tasks.push(async move { (candidate, handle.await) });
        }

        if cancel.is_cancelled() {
            info!(in_flight = tasks.len(), "cancelled, waiting for in-flight candidates");
        }

        while let Some((candidate, joined)) = tasks.next().await {
            outcomes.push(joined.unwrap_or_else(|e| {
                warn!(url = %candidate.url, error = %e, "worker task failed");
                CandidateOutcome {
                    candidate,
                    outcome: FetchOutcome::Failed(PipelineError::Worker(e.to_string())),
                    attempts: 0,
                }
            }));
        }

        outcomes
    }
}

impl<C: HttpClient + 'static> Worker<C> {
    #[instrument(skip_all, fields(url = %candidate.url))]
    async fn process(&self, candidate: CandidateResource, cancel: CancellationToken) -> CandidateOutcome {
        let mut attempts = 0;
        let artifact = loop {
            attempts += 1;
            match self.fetcher.fetch(&candidate.url).await {
                Ok(artifact) => break artifact,
                Err(e) if e.is_retryable() && attempts <= self.options.max_retries => {
                    let delay = retry_delay(attempts - 1, self.options.retry_backoff);
                    warn!(attempt = attempts, error = %e, ?delay, "fetch failed, retrying");
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => {
                            return self.finish(candidate, FetchOutcome::Failed(e.into()), attempts);
                        }
                    }
                }
                Err(e) => return self.finish(candidate, FetchOutcome::Failed(e.into()), attempts),
            }
        };

        let outcome = match self.settle(&candidate, artifact).await {
            Ok(outcome) => outcome,
            Err(e) => FetchOutcome::Failed(e),
        };
        self.finish(candidate, outcome, attempts)
    }

    /// Fingerprint a staged download and either place it or discard it.
    ///
    /// When another candidate owns the same content, the staged file is kept
    /// until that owner has committed. If the owner gives up instead, the
    /// fingerprint is reserved again and this candidate may become the owner.
    async fn settle(&self, candidate: &CandidateResource, artifact: TempArtifact) -> Result<FetchOutcome> {
        let staged = artifact.path().to_path_buf();
        let fingerprint = tokio::task::spawn_blocking(move || fingerprint_file(&staged))
            .await
            .map_err(|e| PipelineError::Worker(e.to_string()))??;

        loop {
            let claim = match self.index.reserve(fingerprint) {
                ReservationResult::AlreadyExists(claim) => claim,
                ReservationResult::Acquired(reservation) => {
                    let file = artifact.into_file();
                    let dir = self.output_dir.clone();
                    let name = candidate.suggested_name.clone();
                    let placed = tokio::task::spawn_blocking(move || file.place(&dir, &name))
                        .await
                        .map_err(|e| PipelineError::Worker(e.to_string()))??;

                    reservation.commit(&placed);
                    return Ok(FetchOutcome::Saved(placed));
                }
            };

            let Some(of) = claim.wait().await else {
                debug!(%fingerprint, "owner released its reservation, retrying");
                continue;
            };
            if let Err(e) = artifact.into_file().discard() {
                warn!(error = %e, "failed to remove duplicate download");
            }
            return Ok(FetchOutcome::Duplicate { of });
        }
    }

    fn finish(&self, candidate: CandidateResource, outcome: FetchOutcome, attempts: u32) -> CandidateOutcome {
        match &outcome {
            FetchOutcome::Saved(path) => info!(path = %path.display(), "saved"),
            FetchOutcome::Duplicate { of } => info!(of = %of.display(), "duplicate content"),
            FetchOutcome::Skipped(reason) => debug!(%reason, "skipped"),
            FetchOutcome::Failed(e) => warn!(kind = %e.kind(), error = %e, attempts, "failed"),
        }
        CandidateOutcome {
            candidate,
            outcome,
            attempts,
        }
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
