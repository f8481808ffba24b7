use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::place::place_no_clobber;
use crate::{Error, Result};

/// Directory holding in-progress downloads.
#[derive(Debug, Clone)]
pub struct Staging {
    root: PathBuf,
}

impl Staging {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            std::fs::create_dir_all(&root).map_err(|e| Error::Write {
                path:   root.clone(),
                source: e,
            })?;
        }
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path { &self.root }

    /// Allocate a unique path inside the staging directory.
    ///
    /// Nothing is created on disk; the caller creates the file. Whatever ends
    /// up at the path is removed when the returned guard is dropped.
    pub fn temp_file(&self, hint: &str) -> TempFile {
        let hint: String = hint
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
            .take(32)
            .collect();
        TempFile::new(self.root.join(staged_name(&hint)))
    }

    /// Staged files currently present in the directory.
    ///
    /// Only names handed out by [`temp_file`](Self::temp_file) are listed;
    /// anything else in the directory is left alone.
    pub fn leftovers(&self) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| Error::Read {
            path:   self.root.clone(),
            source: e,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::Read {
                path:   self.root.clone(),
                source: e,
            })?;
            let is_file = entry.file_type().is_ok_and(|t| t.is_file());
            if is_file && entry.file_name().to_str().is_some_and(is_staged_name) {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }
}

/// A staged file owned by exactly one worker.
///
/// Dropping the guard deletes the file, so no partial download survives an
/// error path or a cancelled task.
#[derive(Debug)]
pub struct TempFile {
    path:   PathBuf,
    placed: bool,
}

impl TempFile {
    pub(crate) fn new(path: PathBuf) -> Self { Self { path, placed: false } }

    pub fn path(&self) -> &Path { &self.path }

    /// Move the file into `dir` under `name`, never replacing an existing
    /// file. Returns the path it was placed at.
    pub fn place(mut self, dir: &Path, name: &str) -> Result<PathBuf> {
        let placed = place_no_clobber(&self.path, dir, name)?;
        self.placed = true;
        // A hard-linked placement leaves the staged name behind.
        remove_if_present(&self.path);
        Ok(placed)
    }

    /// Delete the file now, reporting failure instead of ignoring it.
    pub fn discard(mut self) -> Result<()> {
        self.placed = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                self.placed = false;
                Err(Error::Write {
                    path:   self.path.clone(),
                    source: e,
                })
            }
        }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.placed {
            remove_if_present(&self.path);
        }
    }
}

/// `.<uuid>.<hint>.part`
pub(crate) fn staged_name(hint: &str) -> String { format!(".{}.{}.part", uuid::Uuid::new_v4().simple(), hint) }

fn is_staged_name(name: &str) -> bool {
    let Some(inner) = name.strip_prefix('.').and_then(|n| n.strip_suffix(".part")) else {
        return false;
    };
    inner
        .split_once('.')
        .is_some_and(|(id, _)| id.len() == 32 && id.bytes().all(|b| b.is_ascii_hexdigit()))
}

fn remove_if_present(path: &Path) {
    let _ = std::fs::remove_file(path);
}
