use std::collections::HashMap;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use sift_verify::Fingerprint;
use tokio::sync::watch;
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    /// Reserved, not yet placed.
    Pending,
    Placed(PathBuf),
    /// The reservation was dropped without a commit.
    Released,
}

/// Shared fingerprint → canonical path map.
///
/// Entries are never overwritten: the first reservation of a fingerprint
/// wins. An entry is pending from [`reserve`](Self::reserve) until the
/// winner commits its final path. The check-and-insert holds the lock of a
/// single shard for the duration of a hash-map operation and nothing else.
#[derive(Debug, Default)]
pub struct DedupIndex {
    entries: DashMap<Fingerprint, watch::Receiver<Slot>>,
}

/// Outcome of [`DedupIndex::reserve`].
#[derive(Debug)]
#[must_use = "an acquired reservation is released when dropped"]
pub enum ReservationResult<'a> {
    /// The caller owns the content and must place it, then commit.
    Acquired(Reservation<'a>),

    /// Another claim owns the content.
    AlreadyExists(Claim),
}

impl DedupIndex {
    pub fn new() -> Self { Self::default() }

    pub(crate) fn from_entries(entries: HashMap<Fingerprint, PathBuf>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(fingerprint, path)| (fingerprint, watch::channel(Slot::Placed(path)).1))
                .collect(),
        }
    }

    /// Atomically claim `fingerprint`.
    ///
    /// Of any number of concurrent calls with the same fingerprint exactly one
    /// receives [`ReservationResult::Acquired`]; every other call, concurrent
    /// or later, receives a [`Claim`] on the winner's result.
    pub fn reserve(&self, fingerprint: Fingerprint) -> ReservationResult<'_> {
        let claimed = match self.entries.entry(fingerprint) {
            Entry::Occupied(entry) => Err(entry.get().clone()),
            Entry::Vacant(entry) => {
                let (tx, rx) = watch::channel(Slot::Pending);
                entry.insert(rx);
                Ok(tx)
            }
        };

        match claimed {
            Ok(tx) => {
                debug!(%fingerprint, "reserved");
                ReservationResult::Acquired(Reservation {
                    index: self,
                    fingerprint,
                    tx,
                    committed: false,
                })
            }
            Err(rx) => {
                trace!(%fingerprint, "already indexed");
                ReservationResult::AlreadyExists(Claim { fingerprint, rx })
            }
        }
    }

    /// Committed path of `fingerprint`. Pending entries give `None`.
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Option<PathBuf> {
        let rx = self.entries.get(fingerprint)?.value().clone();
        placed(&rx)
    }

    /// Whether `fingerprint` is committed or pending.
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool { self.entries.contains_key(fingerprint) }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Snapshot of all committed entries, sorted by path.
    pub fn entries(&self) -> Vec<(Fingerprint, PathBuf)> {
        let receivers: Vec<_> = self
            .entries
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        let mut entries: Vec<_> = receivers
            .into_iter()
            .filter_map(|(fingerprint, rx)| placed(&rx).map(|path| (fingerprint, path)))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1));
        entries
    }
}

fn placed(rx: &watch::Receiver<Slot>) -> Option<PathBuf> {
    match &*rx.borrow() {
        Slot::Placed(path) => Some(path.clone()),
        Slot::Pending | Slot::Released => None,
    }
}

/// Exclusive claim on a fingerprint.
///
/// Commit it once the content sits at its final path. Dropping it
/// uncommitted removes the entry again and wakes every [`Claim`] waiting on
/// it, so a candidate that fails after reserving leaves nothing behind in the
/// index.
#[derive(Debug)]
pub struct Reservation<'a> {
    index:       &'a DedupIndex,
    fingerprint: Fingerprint,
    tx:          watch::Sender<Slot>,
    committed:   bool,
}

impl Reservation<'_> {
    pub fn fingerprint(&self) -> Fingerprint { self.fingerprint }

    /// Record where the content was placed.
    pub fn commit(mut self, final_path: &Path) {
        self.tx.send_replace(Slot::Placed(final_path.to_path_buf()));
        self.committed = true;
        debug!(fingerprint = %self.fingerprint, path = %final_path.display(), "committed");
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.index.entries.remove(&self.fingerprint);
            self.tx.send_replace(Slot::Released);
            debug!(fingerprint = %self.fingerprint, "released uncommitted reservation");
        }
    }
}

/// Handle on a fingerprint owned by someone else.
///
/// The owner may still be placing the content. [`wait`](Self::wait)
/// resolves once it has either committed or given up.
#[derive(Debug, Clone)]
pub struct Claim {
    fingerprint: Fingerprint,
    rx:          watch::Receiver<Slot>,
}

impl Claim {
    pub fn fingerprint(&self) -> Fingerprint { self.fingerprint }

    /// Final path if the owner has already committed.
    pub fn path(&self) -> Option<PathBuf> { placed(&self.rx) }

    /// Wait for the owner to finish.
    ///
    /// Returns the committed path, or `None` when the owner released its
    /// reservation. In that case the fingerprint is free again and the caller
    /// should reserve it anew.
    pub async fn wait(mut self) -> Option<PathBuf> {
        if let Some(path) = self.path() {
            return Some(path);
        }
        let slot = self.rx.wait_for(|slot| *slot != Slot::Pending).await.ok()?;
        match &*slot {
            Slot::Placed(path) => Some(path.clone()),
            Slot::Pending | Slot::Released => None,
        }
    }
}
