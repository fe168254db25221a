// src/watch/registry.rs

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::fs::FileSystem;
use crate::types::WatchHandle;

use super::backend::WatchBackend;

/// Bidirectional map between watched directories and their backend handles.
///
/// A path is in `by_path` iff its handle is in `by_handle`; every mutation
/// goes through [`register`](Self::register) / [`unregister`](Self::unregister)
/// so the two maps never drift apart.
pub struct WatchRegistry<B: WatchBackend> {
    backend: B,
    fs: Arc<dyn FileSystem>,
    by_path: HashMap<PathBuf, WatchHandle>,
    by_handle: HashMap<WatchHandle, PathBuf>,
    reclaimed: HashSet<PathBuf>,
}

impl<B: WatchBackend> std::fmt::Debug for WatchRegistry<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchRegistry")
            .field("watched", &self.by_path.len())
            .finish_non_exhaustive()
    }
}

impl<B: WatchBackend> WatchRegistry<B> {
    pub fn new(backend: B, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            backend,
            fs,
            by_path: HashMap::new(),
            by_handle: HashMap::new(),
            reclaimed: HashSet::new(),
        }
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Start watching `dir` unless it is already watched.
    ///
    /// Returns `true` if a new watch was placed. A backend failure (e.g.
    /// permission denied) is logged and leaves `dir` unwatched.
    pub fn register(&mut self, dir: &Path) -> bool {
        if self.by_path.contains_key(dir) {
            return false;
        }

        match self.backend.watch(dir) {
            Ok(handle) => {
                info!(dir = ?dir, %handle, "registering watch on dir");
                self.by_path.insert(dir.to_path_buf(), handle);
                self.by_handle.insert(handle, dir.to_path_buf());
                self.reclaimed.remove(dir);
                true
            }
            Err(err) => {
                warn!(dir = ?dir, error = %err, "unable to watch dir; it will not report changes");
                false
            }
        }
    }

    /// Stop watching `dir`. No-op if it is not watched.
    pub fn unregister(&mut self, dir: &Path) -> bool {
        let Some(handle) = self.by_path.remove(dir) else {
            return false;
        };
        info!(dir = ?dir, %handle, "unregistering watch on dir");
        self.by_handle.remove(&handle);
        self.backend.unwatch(dir, handle);
        true
    }

    /// Directory for a handle delivered with an event.
    ///
    /// `None` when the handle was already unregistered (events can still be
    /// in flight for a watch that was just reclaimed).
    pub fn resolve(&self, handle: WatchHandle) -> Option<&Path> {
        self.by_handle.get(&handle).map(PathBuf::as_path)
    }

    /// Unregister every watched directory that no longer exists on disk.
    ///
    /// One delete notification can stand for a whole removed subtree, so
    /// this sweeps all registrations, not just the deleted path.
    pub fn reconcile_stale(&mut self) -> usize {
        let stale: Vec<PathBuf> = self
            .by_path
            .keys()
            .filter(|p| !self.fs.exists(p))
            .cloned()
            .collect();

        if !stale.is_empty() {
            debug!(count = stale.len(), "cancelling stale watches");
        }
        for path in &stale {
            self.unregister(path);
        }
        let count = stale.len();
        self.reclaimed.extend(stale);
        count
    }

    /// Whether `dir` was unregistered by an earlier [`reconcile_stale`](Self::reconcile_stale)
    /// whose delete has not been reported yet. Clears the entry.
    ///
    /// A sweep triggered by one event can reclaim a directory whose own
    /// delete arrives later; this lets that report be recognised once.
    pub fn take_reclaimed(&mut self, dir: &Path) -> bool {
        self.reclaimed.remove(dir)
    }

    /// Drop reclaimed entries at or below `dir`, which exists again.
    pub fn forget_reclaimed_under(&mut self, dir: &Path) {
        self.reclaimed.retain(|p| !p.starts_with(dir));
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.by_path.contains_key(dir)
    }

    pub fn handle_of(&self, dir: &Path) -> Option<WatchHandle> {
        self.by_path.get(dir).copied()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.by_path.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}
