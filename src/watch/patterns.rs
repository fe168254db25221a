// src/watch/patterns.rs

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::config::WatchSetConfig;

/// A watch set with its include/exclude globs compiled.
///
/// Paths passed to [`WatchSet::matches`] are relative to the watch set's
/// directory, with forward slashes (e.g. `"pkg/A.java"`).
#[derive(Clone)]
pub struct WatchSet {
    config: WatchSetConfig,
    include_set: Option<GlobSet>,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for WatchSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchSet")
            .field("directory", &self.config.directory)
            .field("recursive", &self.config.recursive)
            .field("includes", &self.config.includes)
            .field("excludes", &self.config.excludes)
            .finish()
    }
}

impl WatchSet {
    /// Compile the globs of `config`. Fails on the first invalid pattern.
    pub fn compile(config: WatchSetConfig) -> Result<Self> {
        let include_set = if config.includes.is_empty() {
            None
        } else {
            Some(build_globset(&config.includes).context("building include globset")?)
        };

        let exclude_set = if config.excludes.is_empty() {
            None
        } else {
            Some(build_globset(&config.excludes).context("building exclude globset")?)
        };

        Ok(Self {
            config,
            include_set,
            exclude_set,
        })
    }

    pub fn config(&self) -> &WatchSetConfig {
        &self.config
    }

    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    pub fn is_recursive(&self) -> bool {
        self.config.recursive
    }

    /// Whether a change at `rel_path` counts under this watch set.
    ///
    /// With neither includes nor excludes everything matches. Otherwise the
    /// path must match an include (when any are configured), and any
    /// matching exclude rejects it regardless of the includes.
    pub fn matches(&self, rel_path: &str) -> bool {
        if self.include_set.is_none() && self.exclude_set.is_none() {
            return true;
        }

        let mut matched = match &self.include_set {
            Some(includes) => includes.is_match(rel_path),
            None => true,
        };

        if let Some(excludes) = &self.exclude_set {
            if excludes.is_match(rel_path) {
                debug!(path = %rel_path, "path hit an exclude pattern");
                matched = false;
            }
        }

        matched
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
