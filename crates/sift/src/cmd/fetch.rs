use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use sift_dedup::IndexBuilder;
use sift_fetch::{Fetcher, ReqwestClient};
use sift_fs::Staging;
use sift_pipeline::{CancellationToken, CandidateResource, Coordinator, ErrorKind, Summary};
use tracing::{info, warn};

use crate::cli::FetchArg;
use crate::config::{Config, Overrides};
use crate::manifest::{self, Entry};
use crate::report::FetchReport;

pub async fn run(config_file: Option<&Path>, arg: &FetchArg) -> anyhow::Result<ExitCode> {
    let config = Config::load(config_file, &Overrides::from(arg))?;

    if !config.filter.is_empty() {
        info!(filter = ?config.filter, "filtering manifest urls");
    }
    let mut summary = Summary::default();
    let candidates = read_candidates(&arg.manifest, &config, &mut summary)?;

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("failed to create {}", config.output_dir.display()))?;
    let mut builder = IndexBuilder::new();
    let seed = builder
        .seed(&config.output_dir)
        .with_context(|| format!("failed to index {}", config.output_dir.display()))?;
    if !seed.duplicates.is_empty() {
        warn!(
            count = seed.duplicates.len(),
            "output directory already holds duplicate files, see `sift scan`"
        );
    }

    let options = config.fetch_options();
    let client = ReqwestClient::new(&options).context("failed to build http client")?;
    let fetcher = Fetcher::new(client, config.staging_dir())?.with_options(options);
    let staging = fetcher.staging().clone();

    let coordinator = Coordinator::new(
        fetcher,
        Arc::new(builder.build()),
        &config.output_dir,
        config.pipeline_options(),
    )?;
    remove_stale(&staging);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, finishing downloads in flight");
            trigger.cancel();
        }
    });

    let total = candidates.len();
    info!(
        candidates = total,
        concurrency = config.concurrency,
        output_dir = %config.output_dir.display(),
        "starting"
    );
    let outcomes = coordinator.run_until(candidates, cancel).await;
    for outcome in &outcomes {
        summary.record(outcome);
    }

    let report = FetchReport {
        summary,
        not_started: total.saturating_sub(outcomes.len()),
    };
    if arg.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }

    if report.summary.failed > 0 || report.not_started > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn read_candidates(path: &Path, config: &Config, summary: &mut Summary) -> anyhow::Result<Vec<CandidateResource>> {
    let file = File::open(path).with_context(|| format!("failed to open manifest {}", path.display()))?;
    let entries = manifest::read(BufReader::new(file), &config.filter)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;

    let mut candidates = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Entry::Candidate(candidate) => candidates.push(candidate),
            Entry::Skipped { line, url, reason } => {
                info!(line, %url, %reason, "skipping url");
                summary.record_skip();
            }
            Entry::Invalid { line, url, error } => {
                warn!(line, %url, %error, "invalid url");
                summary.record_failure(&url, ErrorKind::InvalidUrl, error.to_string());
            }
        }
    }
    Ok(candidates)
}

/// Delete downloads left behind by an earlier run that did not exit cleanly.
fn remove_stale(staging: &Staging) {
    let leftovers = match staging.leftovers() {
        Ok(leftovers) => leftovers,
        Err(e) => {
            warn!(error = %e, "cannot list staging directory");
            return;
        }
    };
    for path in leftovers {
        match std::fs::remove_file(&path) {
            Ok(()) => info!(path = %path.display(), "removed stale download"),
            Err(e) => warn!(path = %path.display(), error = %e, "cannot remove stale download"),
        }
    }
}
