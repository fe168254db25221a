// src/logging.rs

//! Logging setup: `tracing` events formatted by `tracing-subscriber`.
//!
//! The filter comes from, in order:
//! 1. `--log-level` (applies to every target);
//! 2. `GOALWATCH_LOG`, any `EnvFilter` directive string such as
//!    `debug` or `goalwatch::watch=debug,info`;
//! 3. `info`.
//!
//! Output goes to stderr. The build tool inherits stdout.

use anyhow::{anyhow, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Environment variable consulted when no `--log-level` is given.
pub const LOG_ENV_VAR: &str = "GOALWATCH_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::default().add_directive(LevelFilter::from(level).into()),
        None => filter_from_env(),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))
}

fn filter_from_env() -> EnvFilter {
    let default = || EnvFilter::default().add_directive(LevelFilter::INFO.into());

    match std::env::var(LOG_ENV_VAR) {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(directives.trim()).unwrap_or_else(|err| {
                // No subscriber yet, so this can only go to stderr.
                eprintln!("goalwatch: ignoring invalid {LOG_ENV_VAR}: {err}");
                default()
            })
        }
        _ => default(),
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}
