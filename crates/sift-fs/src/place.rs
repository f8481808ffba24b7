use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::staging::{TempFile, staged_name};
use crate::{Error, Result};

/// Highest numeric suffix tried before giving up on a name.
pub const MAX_SUFFIX: u32 = 9_999;

/// `name` for attempt 0, otherwise `stem-N.ext`.
///
/// ```
/// use sift_fs::disambiguate;
///
/// assert_eq!(disambiguate("cat.jpg", 0), "cat.jpg");
/// assert_eq!(disambiguate("cat.jpg", 2), "cat-2.jpg");
/// assert_eq!(disambiguate("README", 1), "README-1");
/// ```
pub fn disambiguate(name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-{}{}", &name[..dot], attempt, &name[dot..]),
        _ => format!("{name}-{attempt}"),
    }
}

/// Place `src` in `dir` under `name` or the first free disambiguated name.
///
/// Nothing that already exists is ever replaced. When `src` lives on another
/// filesystem it is first copied to a hidden file inside `dir`, so the final
/// name only ever appears with complete content.
pub(crate) fn place_no_clobber(src: &Path, dir: &Path, name: &str) -> Result<PathBuf> {
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(Error::InvalidName(name.to_string()));
    }

    match place_linked(src, dir, name) {
        Err(Error::Place { source, .. }) if crosses_devices(&source) => place_by_copy(src, dir, name),
        placed => placed,
    }
}

fn place_linked(src: &Path, dir: &Path, name: &str) -> Result<PathBuf> {
    for attempt in 0..=MAX_SUFFIX {
        let candidate = dir.join(disambiguate(name, attempt));
        match link_no_clobber(src, &candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(Error::Place {
                    from:   src.to_path_buf(),
                    to:     candidate,
                    source: e,
                });
            }
        }
    }

    Err(Error::NamesExhausted {
        dir:      dir.to_path_buf(),
        name:     name.to_string(),
        attempts: MAX_SUFFIX + 1,
    })
}

/// Copy `src` next to its destination, then link the copy into place.
/// The copy's own name is removed on every path out.
fn place_by_copy(src: &Path, dir: &Path, name: &str) -> Result<PathBuf> {
    let copy = TempFile::new(dir.join(staged_name("place")));
    std::fs::copy(src, copy.path()).map_err(|e| Error::Write {
        path:   copy.path().to_path_buf(),
        source: e,
    })?;
    place_linked(copy.path(), dir, name)
}

/// Make `src` visible at `dest`, failing with `AlreadyExists` if `dest` is
/// taken.
///
/// `hard_link` refuses to replace an existing path, which makes the
/// check-and-place a single filesystem operation.
fn link_no_clobber(src: &Path, dest: &Path) -> std::io::Result<()> {
    match std::fs::hard_link(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if links_unsupported(&e) => rename_no_clobber(src, dest),
        Err(e) => Err(e),
    }
}

static RENAME_LOCK: Mutex<()> = Mutex::new(());

/// Fallback for filesystems without hard links.
///
/// The existence check and the rename run under a process-wide lock, so
/// placements from this process never replace each other. Another process
/// writing the same directory is not covered.
fn rename_no_clobber(src: &Path, dest: &Path) -> std::io::Result<()> {
    let _guard = RENAME_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    if dest.symlink_metadata().is_ok() {
        return Err(ErrorKind::AlreadyExists.into());
    }
    std::fs::rename(src, dest)
}

fn links_unsupported(e: &std::io::Error) -> bool {
    // EPERM (e.g. FAT) / ENOTSUP
    matches!(e.raw_os_error(), Some(1) | Some(95)) || e.kind() == ErrorKind::Unsupported
}

fn crosses_devices(e: &std::io::Error) -> bool {
    // EXDEV
    e.raw_os_error() == Some(18) || e.kind() == ErrorKind::CrossesDevices
}

/// Regular, non-hidden files directly inside `dir`, sorted by path.
pub fn list_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let read_err = |source| Error::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if hidden {
            continue;
        }
        let file_type = entry.file_type().map_err(read_err)?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
