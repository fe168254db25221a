// src/watch/tree.rs

//! The set of watched trees: registry + configured roots.
//!
//! [`WatchTree`] performs the startup registration of every watch set and
//! turns each raw event into a [`Classification`] that the debounce loop
//! can count (or not).

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::WatchSetConfig;
use crate::errors::{GoalwatchError, Result};
use crate::types::{FsEventKind, RawEvent};

use super::backend::WatchBackend;
use super::path_utils::relative_str;
use super::patterns::WatchSet;
use super::registry::WatchRegistry;
use super::resolver::ConfigResolver;
use super::walker::{walk, walk_incremental};

/// Why an event was discarded without counting toward a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The event's handle is no longer registered.
    UnknownHandle,
    /// The event carried no file name.
    MissingName,
    /// No configured watch set encloses the path.
    OutsideWatchSets,
    /// Directory create/modify: only drives watch registration.
    Directory,
    /// A delete fully explained by reclaiming stale watches.
    StaleWatchCleanup,
    /// Rejected by the watch set's include/exclude patterns.
    Filtered,
}

/// Result of classifying a single raw event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A change that should count toward the pending build.
    Relevant { path: PathBuf },
    /// Logged and discarded.
    Ignored(IgnoreReason),
    /// The notification layer dropped events.
    Overflow,
}

impl Classification {
    pub fn is_relevant(&self) -> bool {
        matches!(self, Classification::Relevant { .. })
    }
}

/// Registry of watched directories plus the watch sets that own them.
pub struct WatchTree<B: WatchBackend> {
    registry: WatchRegistry<B>,
    resolver: ConfigResolver,
}

impl<B: WatchBackend> std::fmt::Debug for WatchTree<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchTree")
            .field("registry", &self.registry)
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl<B: WatchBackend> WatchTree<B> {
    pub fn new(registry: WatchRegistry<B>) -> Self {
        Self {
            registry,
            resolver: ConfigResolver::new(),
        }
    }

    pub fn registry(&self) -> &WatchRegistry<B> {
        &self.registry
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Validate and register every watch set.
    ///
    /// A missing root, a root that is not a directory, or an invalid glob is
    /// fatal. Failures to watch individual subdirectories are not.
    pub fn register_all(&mut self, configs: &[WatchSetConfig]) -> Result<()> {
        info!("registering {} watch sets...", configs.len());

        for config in configs {
            self.register_watch_set(config)?;
        }

        info!(dirs = self.registry.len(), "watch registration complete");
        Ok(())
    }

    fn register_watch_set(&mut self, config: &WatchSetConfig) -> Result<()> {
        info!(
            dir = ?config.directory,
            recursive = config.recursive,
            includes = ?config.includes,
            excludes = ?config.excludes,
            "registering watch set"
        );

        let fs = self.registry.fs();
        if !fs.exists(&config.directory) {
            return Err(GoalwatchError::SetupError(format!(
                "directory {:?} does not exist; unable to watch a dir that does not exist",
                config.directory
            )));
        }
        if !fs.is_dir(&config.directory) {
            return Err(GoalwatchError::SetupError(format!(
                "unable to watch {:?}: not a directory",
                config.directory
            )));
        }
        let directory = fs.canonicalize(&config.directory)?;

        let mut config = config.clone();
        config.directory = directory.clone();
        let set = WatchSet::compile(config)
            .map_err(|e| GoalwatchError::ConfigError(format!("{e:#}")))?;
        let recursive = set.is_recursive();
        self.resolver.insert(set);

        if recursive {
            walk(&mut self.registry, &directory);
        } else {
            self.registry.register(&directory);
        }
        Ok(())
    }

    /// Classify one raw event, registering or reclaiming watches on the way.
    pub fn classify(&mut self, event: &RawEvent) -> Classification {
        if event.kind == FsEventKind::Overflow {
            warn!(handle = ?event.handle, "some events may have been lost; restart to resynchronise");
            return Classification::Overflow;
        }

        let Some(handle) = event.handle else {
            return Classification::Ignored(IgnoreReason::UnknownHandle);
        };
        let Some(dir) = self.registry.resolve(handle) else {
            debug!(%handle, "event for a handle that is no longer registered");
            return Classification::Ignored(IgnoreReason::UnknownHandle);
        };
        let Some(name) = event.name.as_deref() else {
            return Classification::Ignored(IgnoreReason::MissingName);
        };

        let path = dir.join(name);
        let is_dir = self.registry.fs().is_dir(&path);
        let entry_kind = if is_dir { "directory" } else { "file" };

        let Some(set) = self.resolver.resolve(&path) else {
            debug!(path = ?path, "event outside every watch set");
            return Classification::Ignored(IgnoreReason::OutsideWatchSets);
        };
        let root = set.directory().to_path_buf();
        let recursive = set.is_recursive();
        let rel = relative_str(&root, &path).unwrap_or_default();
        let matches = set.matches(&rel);
        debug!(path = %rel, root = ?root, matches, "evaluated include/exclude patterns");

        let ignored = match event.kind {
            FsEventKind::Created => {
                info!(path = ?path, "{entry_kind} created");
                self.registry.forget_reclaimed_under(&path);
                if is_dir {
                    if recursive {
                        walk_incremental(&mut self.registry, &path, &root);
                    }
                    Some(IgnoreReason::Directory)
                } else {
                    None
                }
            }
            FsEventKind::Deleted => {
                info!(path = ?path, "{entry_kind} deleted");
                let removed = self.registry.reconcile_stale();
                // Either way this report is the one the reclaimed entry waited for.
                let was_reclaimed = self.registry.take_reclaimed(&path);
                let explained = if removed > 0 {
                    removed == event.count
                } else {
                    was_reclaimed
                };
                explained.then_some(IgnoreReason::StaleWatchCleanup)
            }
            // Modified; overflow returned early.
            _ => {
                info!(path = ?path, "{entry_kind} modified");
                is_dir.then_some(IgnoreReason::Directory)
            }
        };

        match ignored {
            Some(reason) => {
                info!(?reason, "change is a dir or a stale watch; not triggering");
                Classification::Ignored(reason)
            }
            None if !matches => {
                info!(path = %rel, "change did not match includes/excludes; not triggering");
                Classification::Ignored(IgnoreReason::Filtered)
            }
            None => Classification::Relevant { path },
        }
    }

    /// Whether `dir` currently has a watch.
    pub fn is_watched(&self, dir: &Path) -> bool {
        self.registry.contains(dir)
    }
}
