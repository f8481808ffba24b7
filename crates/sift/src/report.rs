use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use sift_dedup::SeedReport;
use sift_pipeline::Summary;

/// Final report of `sift fetch`.
#[derive(Debug, Serialize)]
pub struct FetchReport {
    #[serde(flatten)]
    pub summary:     Summary,
    /// Candidates never started because the run was interrupted.
    pub not_started: usize,
}

impl fmt::Display for FetchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;
        writeln!(
            f,
            "saved {}, duplicate {}, skipped {}, failed {}",
            s.saved, s.duplicate, s.skipped, s.failed
        )?;
        if self.not_started > 0 {
            writeln!(f, "interrupted: {} not started", self.not_started)?;
        }
        for failure in &s.failures {
            writeln!(f, "  [{}] {}: {}", failure.kind, failure.url, failure.reason)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct DuplicateFile {
    pub path:         PathBuf,
    pub duplicate_of: PathBuf,
}

/// Result of `sift scan`.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub scanned:    usize,
    pub unique:     usize,
    pub duplicates: Vec<DuplicateFile>,
    pub unreadable: Vec<PathBuf>,
}

impl From<SeedReport> for ScanReport {
    fn from(report: SeedReport) -> Self {
        Self {
            scanned:    report.scanned,
            unique:     report.inserted,
            duplicates: report
                .duplicates
                .into_iter()
                .map(|(path, duplicate_of)| DuplicateFile { path, duplicate_of })
                .collect(),
            unreadable: report.unreadable.into_iter().map(|(path, _)| path).collect(),
        }
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for dup in &self.duplicates {
            writeln!(f, "{} duplicates {}", dup.path.display(), dup.duplicate_of.display())?;
        }
        for path in &self.unreadable {
            writeln!(f, "{} unreadable", path.display())?;
        }
        writeln!(
            f,
            "scanned {}, unique {}, redundant {}",
            self.scanned,
            self.unique,
            self.duplicates.len()
        )
    }
}
