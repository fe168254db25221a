use std::fmt;
use std::path::PathBuf;

/// Opaque identifier for a single directory watch.
///
/// Handed out by a [`crate::watch::WatchBackend`]; raw events arrive keyed by
/// handle, and [`crate::watch::WatchRegistry`] maps it back to a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchHandle(pub u64);

impl fmt::Display for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Category of a raw filesystem notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsEventKind {
    Created,
    Deleted,
    Modified,
    /// The notification layer dropped events; there is no path to classify.
    Overflow,
}

/// A single notification for one watched directory.
///
/// - `handle` identifies the watched directory (may be missing for overflow).
/// - `name` is relative to that directory (missing for overflow).
/// - `count` is how many times the notification layer saw this event
///   repeated before delivering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub handle: Option<WatchHandle>,
    pub kind: FsEventKind,
    pub name: Option<PathBuf>,
    pub count: usize,
}

impl RawEvent {
    pub fn new(handle: WatchHandle, kind: FsEventKind, name: impl Into<PathBuf>) -> Self {
        Self {
            handle: Some(handle),
            kind,
            name: Some(name.into()),
            count: 1,
        }
    }

    pub fn created(handle: WatchHandle, name: impl Into<PathBuf>) -> Self {
        Self::new(handle, FsEventKind::Created, name)
    }

    pub fn deleted(handle: WatchHandle, name: impl Into<PathBuf>) -> Self {
        Self::new(handle, FsEventKind::Deleted, name)
    }

    pub fn modified(handle: WatchHandle, name: impl Into<PathBuf>) -> Self {
        Self::new(handle, FsEventKind::Modified, name)
    }

    pub fn overflow(handle: Option<WatchHandle>) -> Self {
        Self {
            handle,
            kind: FsEventKind::Overflow,
            name: None,
            count: 1,
        }
    }

    /// Override the repeat count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }
}
