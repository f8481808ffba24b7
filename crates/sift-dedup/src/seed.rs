use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use sift_verify::{Fingerprint, VerifyError, fingerprint_file};
use tracing::{debug, info, warn};

use crate::{DedupIndex, Result};

/// What a seeding pass found.
#[derive(Debug, Default)]
pub struct SeedReport {
    /// Files fingerprinted.
    pub scanned: usize,

    /// New index entries.
    pub inserted: usize,

    /// `(redundant, canonical)` pairs of files whose content was already
    /// indexed under another path.
    pub duplicates: Vec<(PathBuf, PathBuf)>,

    /// Files that could not be read; they are left out of the index.
    pub unreadable: Vec<(PathBuf, VerifyError)>,
}

/// Mutable, single-owner stage of the index used while seeding.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    entries: HashMap<Fingerprint, PathBuf>,
}

impl IndexBuilder {
    pub fn new() -> Self { Self::default() }

    /// Fingerprint every regular, non-hidden file directly inside `dir`.
    ///
    /// Files are visited in path order, so among pre-existing duplicates the
    /// first path in that order becomes canonical. Seeding the same directory
    /// again changes nothing.
    pub fn seed(&mut self, dir: impl AsRef<Path>) -> Result<SeedReport> {
        let dir = dir.as_ref();
        let files = sift_fs::list_files(dir)?;
        let report = self.seed_files(files);
        info!(
            dir = %dir.display(),
            scanned = report.scanned,
            inserted = report.inserted,
            duplicates = report.duplicates.len(),
            "seeded dedup index"
        );
        Ok(report)
    }

    /// Seed from an explicit list of files, in the order given.
    pub fn seed_files<I>(&mut self, files: I) -> SeedReport
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut report = SeedReport::default();

        for path in files {
            let fingerprint = match fingerprint_file(&path) {
                Ok(fp) => fp,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    report.unreadable.push((path, e));
                    continue;
                }
            };
            report.scanned += 1;

            match self.entries.entry(fingerprint) {
                Entry::Vacant(slot) => {
                    debug!(path = %path.display(), %fingerprint, "indexed");
                    slot.insert(path);
                    report.inserted += 1;
                }
                Entry::Occupied(slot) if slot.get() != &path => {
                    debug!(path = %path.display(), canonical = %slot.get().display(), "duplicate on disk");
                    report.duplicates.push((path, slot.get().clone()));
                }
                Entry::Occupied(_) => {}
            }
        }

        report
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Freeze the seed into a shareable index.
    pub fn build(self) -> DedupIndex { DedupIndex::from_entries(self.entries) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_seed_indexes_existing_files() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "a.jpg", b"A");
        write(dir.path(), "b.jpg", b"B");

        let mut builder = IndexBuilder::new();
        let report = builder.seed(dir.path()).unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.inserted, 2);

        let index = builder.build();
        assert_eq!(index.lookup(&Fingerprint::of(b"A")), Some(a));
    }

    #[test]
    fn test_seed_is_idempotent() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.jpg", b"A");
        write(dir.path(), "b.jpg", b"B");
        write(dir.path(), "c.jpg", b"A");

        let mut builder = IndexBuilder::new();
        builder.seed(dir.path()).unwrap();
        let before = builder.entries.clone();

        let again = builder.seed(dir.path()).unwrap();
        assert_eq!(builder.entries, before);
        assert_eq!(again.inserted, 0);
        assert_eq!(again.duplicates.len(), 1);
    }

    #[test]
    fn test_first_path_in_order_is_canonical() {
        let dir = tempdir().unwrap();
        let first = write(dir.path(), "001.jpg", b"same");
        let second = write(dir.path(), "002.jpg", b"same");

        let mut builder = IndexBuilder::new();
        let report = builder.seed(dir.path()).unwrap();

        assert_eq!(report.duplicates, vec![(second, first.clone())]);
        assert_eq!(builder.build().lookup(&Fingerprint::of(b"same")), Some(first));
    }

    #[test]
    fn test_unreadable_file_is_reported() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone.jpg");

        let mut builder = IndexBuilder::new();
        let report = builder.seed_files(vec![missing.clone()]);

        assert_eq!(report.scanned, 0);
        assert_eq!(report.unreadable.len(), 1);
        assert_eq!(report.unreadable[0].0, missing);
        assert!(builder.is_empty());
    }
}
