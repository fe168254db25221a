#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use goalwatch::config::{
    BuildSection, ConfigFile, MarkerSection, RawConfigFile, TimingSection, WatchSetConfig,
};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                build: BuildSection {
                    program: "mvn".to_string(),
                    goals: Vec::new(),
                    profiles: Vec::new(),
                    properties: BTreeMap::new(),
                    working_dir: None,
                },
                marker: MarkerSection::default(),
                timing: TimingSection::default(),
                watch: Vec::new(),
            },
        }
    }

    pub fn goal(mut self, goal: &str) -> Self {
        self.config.build.goals.push(goal.to_string());
        self
    }

    pub fn profile(mut self, profile: &str) -> Self {
        self.config.build.profiles.push(profile.to_string());
        self
    }

    pub fn property(mut self, key: &str, value: &str) -> Self {
        self.config
            .build
            .properties
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn touch_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.marker.touch_file = Some(path.into());
        self
    }

    pub fn skip_touch(mut self, val: bool) -> Self {
        self.config.marker.skip_touch = val;
        self
    }

    pub fn quiet_period_ms(mut self, ms: u64) -> Self {
        self.config.timing.quiet_period_ms = ms;
        self
    }

    pub fn with_watch(mut self, set: WatchSetConfig) -> Self {
        self.config.watch.push(set);
        self
    }

    /// The raw (unvalidated) config, for validation tests.
    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `WatchSetConfig`.
pub struct WatchSetBuilder {
    set: WatchSetConfig,
}

impl WatchSetBuilder {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            set: WatchSetConfig::new(directory),
        }
    }

    pub fn recursive(mut self, val: bool) -> Self {
        self.set.recursive = val;
        self
    }

    pub fn include(mut self, pattern: &str) -> Self {
        self.set.includes.push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.set.excludes.push(pattern.to_string());
        self
    }

    pub fn build(self) -> WatchSetConfig {
        self.set
    }
}
