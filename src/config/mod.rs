// src/config/mod.rs

//! Configuration loading and validation for goalwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like non-empty goals and compilable globs
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{config_root_dir, load_and_validate, load_from_path};
pub use model::{
    BuildSection, ConfigFile, MarkerSection, RawConfigFile, TimingSection, WatchSetConfig,
};
