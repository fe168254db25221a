// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::engine::DebounceTiming;
use crate::errors::{GoalwatchError, Result};
use crate::watch::WatchSet;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::GoalwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(
            raw.build,
            raw.marker,
            raw.timing,
            raw.watch,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_watch_sets(cfg)?;
    validate_build_section(cfg)?;
    validate_timing(cfg)?;
    validate_patterns(cfg)?;
    Ok(())
}

fn ensure_has_watch_sets(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.is_empty() {
        return Err(GoalwatchError::ConfigError(
            "config must contain at least one [[watch]] section".to_string(),
        ));
    }
    for (idx, set) in cfg.watch.iter().enumerate() {
        if set.directory.as_os_str().is_empty() {
            return Err(GoalwatchError::ConfigError(format!(
                "[[watch]] #{} has an empty `directory`",
                idx + 1
            )));
        }
    }
    Ok(())
}

fn validate_build_section(cfg: &RawConfigFile) -> Result<()> {
    let build = &cfg.build;

    if build.program.trim().is_empty() {
        return Err(GoalwatchError::ConfigError(
            "[build].program must not be empty".to_string(),
        ));
    }
    if build.goals.is_empty() {
        return Err(GoalwatchError::ConfigError(
            "[build].goals must list at least one goal".to_string(),
        ));
    }
    if build.goals.iter().any(|g| g.trim().is_empty()) {
        return Err(GoalwatchError::ConfigError(
            "[build].goals contains a blank goal".to_string(),
        ));
    }
    if build.profiles.iter().any(|p| p.trim().is_empty()) {
        return Err(GoalwatchError::ConfigError(
            "[build].profiles contains a blank profile".to_string(),
        ));
    }
    if build.properties.keys().any(|k| k.trim().is_empty()) {
        return Err(GoalwatchError::ConfigError(
            "[build].properties contains a blank key".to_string(),
        ));
    }
    Ok(())
}

fn validate_timing(cfg: &RawConfigFile) -> Result<()> {
    if cfg.timing.quiet_period_ms == 0 {
        return Err(GoalwatchError::ConfigError(
            "[timing].quiet_period_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    let timing = cfg.timing.to_timing();
    if timing.idle_wait > DebounceTiming::MAX_IDLE_WAIT {
        return Err(GoalwatchError::ConfigError(format!(
            "[timing].idle_wait_secs ({} s) exceeds the maximum of {} s",
            cfg.timing.idle_wait_secs,
            DebounceTiming::MAX_IDLE_WAIT.as_secs()
        )));
    }
    if timing.quiet_period >= timing.idle_wait {
        return Err(GoalwatchError::ConfigError(format!(
            "[timing].quiet_period_ms ({} ms) must be shorter than idle_wait_secs ({} s)",
            cfg.timing.quiet_period_ms, cfg.timing.idle_wait_secs
        )));
    }
    Ok(())
}

fn validate_patterns(cfg: &RawConfigFile) -> Result<()> {
    for set in &cfg.watch {
        WatchSet::compile(set.clone()).map_err(|e| {
            GoalwatchError::ConfigError(format!(
                "invalid pattern in [[watch]] for {:?}: {e:#}",
                set.directory
            ))
        })?;
    }
    Ok(())
}
