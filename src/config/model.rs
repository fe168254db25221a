// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::build::{BuildRequest, MarkerFile};
use crate::engine::DebounceTiming;
use crate::errors::Result;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [build]
/// goals = ["compile"]
/// profiles = ["dev"]
/// properties = { skipTests = "true" }
///
/// [marker]
/// touch_file = "target/goalwatch.txt"
///
/// [timing]
/// quiet_period_ms = 750
///
/// [[watch]]
/// directory = "src/main/java"
/// includes = ["**/*.java"]
/// ```
///
/// This is the *unvalidated* form; use [`ConfigFile`] (via `TryFrom`) in the
/// rest of the application.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    pub build: BuildSection,

    #[serde(default)]
    pub marker: MarkerSection,

    #[serde(default)]
    pub timing: TimingSection,

    /// All `[[watch]]` tables, in file order.
    #[serde(default)]
    pub watch: Vec<WatchSetConfig>,
}

/// `[build]` section: what to run once changes settle.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Build tool executable.
    #[serde(default = "default_program")]
    pub program: String,

    /// Goals passed to the build tool, in order. Must not be empty.
    pub goals: Vec<String>,

    #[serde(default)]
    pub profiles: Vec<String>,

    /// `-Dkey=value` overrides.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,

    /// Directory the build runs in; defaults to the config file's directory.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

fn default_program() -> String {
    "mvn".to_string()
}

/// `[marker]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkerSection {
    /// File touched after every successful build.
    #[serde(default = "default_touch_file")]
    pub touch_file: Option<PathBuf>,

    /// Disable the marker entirely.
    #[serde(default)]
    pub skip_touch: bool,
}

fn default_touch_file() -> Option<PathBuf> {
    Some(PathBuf::from("target/goalwatch.txt"))
}

impl Default for MarkerSection {
    fn default() -> Self {
        Self {
            touch_file: default_touch_file(),
            skip_touch: false,
        }
    }
}

/// `[timing]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingSection {
    /// How long the tree must stay quiet before a build is triggered.
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,

    /// How long to block waiting when nothing is pending.
    #[serde(default = "default_idle_wait_secs")]
    pub idle_wait_secs: u64,
}

fn default_quiet_period_ms() -> u64 {
    DebounceTiming::DEFAULT_QUIET_PERIOD.as_millis() as u64
}

fn default_idle_wait_secs() -> u64 {
    DebounceTiming::DEFAULT_IDLE_WAIT.as_secs()
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            quiet_period_ms: default_quiet_period_ms(),
            idle_wait_secs: default_idle_wait_secs(),
        }
    }
}

impl TimingSection {
    pub fn to_timing(&self) -> DebounceTiming {
        DebounceTiming {
            quiet_period: Duration::from_millis(self.quiet_period_ms),
            idle_wait: Duration::from_secs(self.idle_wait_secs),
        }
    }
}

/// One `[[watch]]` table: a directory plus how to filter changes below it.
///
/// Include/exclude globs are tested against the path relative to
/// `directory`, with forward slashes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSetConfig {
    pub directory: PathBuf,

    /// Watch every descendant directory, including ones created later.
    #[serde(default = "default_recursive")]
    pub recursive: bool,

    #[serde(default)]
    pub includes: Vec<String>,

    #[serde(default)]
    pub excludes: Vec<String>,
}

fn default_recursive() -> bool {
    true
}

impl WatchSetConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            recursive: default_recursive(),
            includes: Vec::new(),
            excludes: Vec::new(),
        }
    }
}

/// Validated configuration.
///
/// Constructed via `ConfigFile::try_from(RawConfigFile)`, which runs the
/// checks in [`crate::config::validate`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    build: BuildSection,
    marker: MarkerSection,
    timing: TimingSection,
    watch: Vec<WatchSetConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        build: BuildSection,
        marker: MarkerSection,
        timing: TimingSection,
        watch: Vec<WatchSetConfig>,
    ) -> Self {
        Self {
            build,
            marker,
            timing,
            watch,
        }
    }

    pub fn build_section(&self) -> &BuildSection {
        &self.build
    }

    pub fn marker_section(&self) -> &MarkerSection {
        &self.marker
    }

    pub fn timing(&self) -> DebounceTiming {
        self.timing.to_timing()
    }

    pub fn watch_sets(&self) -> &[WatchSetConfig] {
        &self.watch
    }

    /// Materialize the request sent to the build session on every trigger.
    pub fn build_request(&self) -> Result<BuildRequest> {
        BuildRequest::new(
            self.build.goals.clone(),
            self.build.profiles.clone(),
            self.build.properties.clone(),
        )
    }

    /// The marker file, or `None` when disabled.
    pub fn marker(&self) -> Option<MarkerFile> {
        if self.marker.skip_touch {
            return None;
        }
        self.marker.touch_file.clone().map(MarkerFile::new)
    }

    /// Resolve every relative path (watch directories, marker, working dir)
    /// against `base`, normally the directory holding the config file.
    pub fn resolve_relative_to(mut self, base: &Path) -> Self {
        for set in &mut self.watch {
            set.directory = absolutize(base, &set.directory);
        }
        if let Some(touch) = self.marker.touch_file.as_mut() {
            *touch = absolutize(base, touch);
        }
        self.build.working_dir = Some(match self.build.working_dir.take() {
            Some(dir) => absolutize(base, &dir),
            None => base.to_path_buf(),
        });
        self
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
