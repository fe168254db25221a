// src/watch/walker.rs

//! Directory discovery and recursive watch registration.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::fs::FileSystem;

use super::backend::WatchBackend;
use super::registry::WatchRegistry;

/// Lazy depth-first iterator over `root` and every directory below it.
///
/// Files are skipped and symlinked directories are not descended into. If a
/// directory cannot be read it is still yielded, but its subtree is skipped.
pub struct DirWalk<'a> {
    fs: &'a dyn FileSystem,
    stack: Vec<PathBuf>,
}

impl<'a> DirWalk<'a> {
    /// A symlinked `root` yields nothing, the same as a symlinked child.
    pub fn new(fs: &'a dyn FileSystem, root: &Path) -> Self {
        let stack = if fs.is_symlink(root) {
            debug!(dir = ?root, "not following symlinked directory");
            Vec::new()
        } else {
            vec![root.to_path_buf()]
        };
        Self { fs, stack }
    }
}

impl Iterator for DirWalk<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        let dir = self.stack.pop()?;

        match self.fs.read_dir(&dir) {
            Ok(entries) => {
                for entry in entries {
                    if self.fs.is_dir(&entry) && !self.fs.is_symlink(&entry) {
                        self.stack.push(entry);
                    }
                }
            }
            Err(err) => {
                debug!(dir = ?dir, error = %err, "skipping unreadable subtree");
            }
        }

        Some(dir)
    }
}

/// Register a watch on `root` and every directory below it.
///
/// Returns how many new watches were placed.
pub fn walk<B: WatchBackend>(registry: &mut WatchRegistry<B>, root: &Path) -> usize {
    let dirs: Vec<PathBuf> = DirWalk::new(registry.fs(), root).collect();
    dirs.iter().filter(|dir| registry.register(dir)).count()
}

/// Register watches for a directory that just appeared under a recursive
/// watch set rooted at `configured_root`.
///
/// If the new directory's parent is not watched (several levels were created
/// at once, or events raced the walk), the whole `configured_root` is
/// walked again instead of patching a partial state.
pub fn walk_incremental<B: WatchBackend>(
    registry: &mut WatchRegistry<B>,
    new_dir: &Path,
    configured_root: &Path,
) -> usize {
    let parent_known = new_dir
        .parent()
        .map(|parent| registry.contains(parent))
        .unwrap_or(false);

    if !parent_known {
        info!(
            dir = ?new_dir,
            root = ?configured_root,
            "parent of new dir is not watched; re-walking watch set root"
        );
        return walk(registry, configured_root);
    }

    walk(registry, new_dir)
}
