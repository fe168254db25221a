use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use goalwatch::types::WatchHandle;
use goalwatch::watch::WatchBackend;

#[derive(Debug, Default)]
struct BackendState {
    next_handle: u64,
    active: HashMap<PathBuf, WatchHandle>,
    watch_calls: Vec<PathBuf>,
    unwatch_calls: Vec<PathBuf>,
    denied: HashSet<PathBuf>,
}

/// A watch backend that hands out sequential handles and records every
/// call, without touching the OS.
///
/// Clones share state, so a test keeps one clone to inspect what the
/// registry asked for and to look up handles for injected events.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    state: Arc<Mutex<BackendState>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `watch(dir)` fail, as if permission were denied.
    pub fn deny(&self, dir: impl AsRef<Path>) {
        self.state
            .lock()
            .unwrap()
            .denied
            .insert(dir.as_ref().to_path_buf());
    }

    /// Handle of the active watch on `dir`.
    pub fn handle_for(&self, dir: impl AsRef<Path>) -> Option<WatchHandle> {
        self.state.lock().unwrap().active.get(dir.as_ref()).copied()
    }

    pub fn is_watching(&self, dir: impl AsRef<Path>) -> bool {
        self.handle_for(dir).is_some()
    }

    pub fn watch_calls(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().watch_calls.clone()
    }

    pub fn unwatch_calls(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().unwatch_calls.clone()
    }

    pub fn active_count(&self) -> usize {
        self.state.lock().unwrap().active.len()
    }
}

impl WatchBackend for RecordingBackend {
    fn watch(&mut self, dir: &Path) -> Result<WatchHandle> {
        let mut state = self.state.lock().unwrap();
        state.watch_calls.push(dir.to_path_buf());
        if state.denied.contains(dir) {
            return Err(anyhow!("Permission denied: {:?}", dir));
        }
        state.next_handle += 1;
        let handle = WatchHandle(state.next_handle);
        state.active.insert(dir.to_path_buf(), handle);
        Ok(handle)
    }

    fn unwatch(&mut self, dir: &Path, _handle: WatchHandle) {
        let mut state = self.state.lock().unwrap();
        state.unwatch_calls.push(dir.to_path_buf());
        state.active.remove(dir);
    }
}
