// src/watch/resolver.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::patterns::WatchSet;

/// Maps each configured root directory to its watch set, and finds the
/// owning watch set for any path below one of them.
///
/// Nested roots are allowed; the nearest enclosing root wins.
#[derive(Debug, Default)]
pub struct ConfigResolver {
    roots: HashMap<PathBuf, WatchSet>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a watch set keyed by its directory. A later set with the same
    /// directory replaces the earlier one.
    pub fn insert(&mut self, set: WatchSet) {
        self.roots.insert(set.directory().to_path_buf(), set);
    }

    /// Walk `path`, its parent, grandparent, ... and return the watch set of
    /// the first configured root found.
    pub fn resolve(&self, path: &Path) -> Option<&WatchSet> {
        path.ancestors().find_map(|p| self.roots.get(p))
    }

    pub fn watch_sets(&self) -> impl Iterator<Item = &WatchSet> {
        self.roots.values()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
