// src/watch/backend.rs

//! Pluggable directory-notification backend.
//!
//! The registry talks to a [`WatchBackend`] instead of `notify` directly, so
//! tests can record watch/unwatch calls and inject events by hand.
//!
//! [`NotifyBackend`] is the production implementation. It places one
//! non-recursive `notify` watch per directory and translates each `notify`
//! event into [`RawEvent`]s keyed by the handle of the directory the event
//! happened in.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::engine::LoopEvent;
use crate::types::{FsEventKind, RawEvent, WatchHandle};

/// Trait abstracting the OS notification layer.
///
/// Watches are per directory and never recursive; recursion is the
/// caller's business.
pub trait WatchBackend: Send {
    /// Start watching `dir` for create/modify/delete/overflow events.
    fn watch(&mut self, dir: &Path) -> Result<WatchHandle>;

    /// Stop watching `dir`. Errors are ignored: the directory is usually
    /// gone already.
    fn unwatch(&mut self, dir: &Path, handle: WatchHandle);
}

type HandleMap = Arc<Mutex<HashMap<PathBuf, WatchHandle>>>;

/// Production backend built on `notify::RecommendedWatcher`.
///
/// Dropping it stops all watching and closes its side of the event channel.
pub struct NotifyBackend {
    watcher: RecommendedWatcher,
    handles: HandleMap,
    next_handle: u64,
}

impl std::fmt::Debug for NotifyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyBackend")
            .field("next_handle", &self.next_handle)
            .finish_non_exhaustive()
    }
}

impl NotifyBackend {
    /// Create the underlying OS watcher. Events are forwarded to `event_tx`.
    pub fn new(event_tx: mpsc::UnboundedSender<LoopEvent>) -> Result<Self> {
        let handles: HandleMap = Arc::new(Mutex::new(HashMap::new()));

        // Closure called synchronously by notify whenever an event arrives.
        let watcher = RecommendedWatcher::new(
            {
                let handles = Arc::clone(&handles);
                move |res: notify::Result<Event>| match res {
                    Ok(event) => {
                        let raw_events = match handles.lock() {
                            Ok(map) => translate_event(&map, &event),
                            Err(_) => return,
                        };
                        for raw in raw_events {
                            if event_tx.send(LoopEvent::Fs(raw)).is_err() {
                                // Loop is gone; nothing left to notify.
                                return;
                            }
                        }
                    }
                    Err(err) => {
                        // No tracing context on notify's thread; fall back to stderr.
                        eprintln!("goalwatch: file watch error: {err}");
                    }
                }
            },
            Config::default(),
        )
        .context("creating filesystem watcher")?;

        Ok(Self {
            watcher,
            handles,
            next_handle: 1,
        })
    }
}

impl WatchBackend for NotifyBackend {
    fn watch(&mut self, dir: &Path) -> Result<WatchHandle> {
        self.watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("watching {:?}", dir))?;

        let handle = WatchHandle(self.next_handle);
        self.next_handle += 1;

        if let Ok(mut map) = self.handles.lock() {
            map.insert(dir.to_path_buf(), handle);
        }
        Ok(handle)
    }

    fn unwatch(&mut self, dir: &Path, _handle: WatchHandle) {
        if let Ok(mut map) = self.handles.lock() {
            map.remove(dir);
        }
        let _ = self.watcher.unwatch(dir);
    }
}

/// Translate one `notify` event into zero or more raw events.
///
/// `handles` maps each watched directory to its handle. Paths whose parent
/// is not watched are dropped.
pub fn translate_event(handles: &HashMap<PathBuf, WatchHandle>, event: &Event) -> Vec<RawEvent> {
    // Some backends report an overflow as a path-less `Other` event.
    if event.need_rescan() || (matches!(event.kind, EventKind::Other) && event.paths.is_empty()) {
        let handle = event
            .paths
            .first()
            .and_then(|p| handles.get(p).copied());
        return vec![RawEvent::overflow(handle)];
    }

    let kinds: Vec<(FsEventKind, &PathBuf)> = match event.kind {
        EventKind::Create(_) => tag(FsEventKind::Created, &event.paths),
        EventKind::Remove(_) => tag(FsEventKind::Deleted, &event.paths),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            tag(FsEventKind::Deleted, &event.paths)
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            tag(FsEventKind::Created, &event.paths)
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
            vec![
                (FsEventKind::Deleted, &event.paths[0]),
                (FsEventKind::Created, &event.paths[1]),
            ]
        }
        EventKind::Modify(_) => tag(FsEventKind::Modified, &event.paths),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    };

    kinds
        .into_iter()
        .filter_map(|(kind, path)| {
            let parent = path.parent()?;
            let handle = handles.get(parent).copied()?;
            let name = path.file_name()?;
            Some(RawEvent::new(handle, kind, name))
        })
        .collect()
}

fn tag(kind: FsEventKind, paths: &[PathBuf]) -> Vec<(FsEventKind, &PathBuf)> {
    paths.iter().map(|p| (kind, p)).collect()
}
