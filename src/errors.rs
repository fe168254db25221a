// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Only setup-time failures ever reach the caller of [`crate::run`]; once the
//! watch loop is running, every condition is logged and absorbed.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoalwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Setup error: {0}")]
    SetupError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, GoalwatchError>;
