// src/engine/mod.rs

//! Watch/debounce/trigger engine.
//!
//! The pure debounce state machine lives in [`core`]; the async/IO shell that
//! reads events, classifies them and awaits builds is in [`runtime`].

use std::time::Duration;

use crate::types::RawEvent;

/// Events flowing into the runtime loop from the watcher and signal handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopEvent {
    /// A raw notification from the watch backend.
    Fs(RawEvent),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// The two waits of the debounce loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTiming {
    /// Quiet time after the last relevant change before a build fires.
    pub quiet_period: Duration,
    /// How long to block when nothing is pending.
    pub idle_wait: Duration,
}

impl DebounceTiming {
    pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(750);
    pub const DEFAULT_IDLE_WAIT: Duration = Duration::from_secs(24 * 60 * 60);
    /// Longest idle wait a config may ask for.
    pub const MAX_IDLE_WAIT: Duration = Duration::from_secs(365 * 24 * 60 * 60);
}

impl Default for DebounceTiming {
    fn default() -> Self {
        Self {
            quiet_period: Self::DEFAULT_QUIET_PERIOD,
            idle_wait: Self::DEFAULT_IDLE_WAIT,
        }
    }
}

pub mod core;
pub mod runtime;

pub use self::core::{CoreCommand, CoreInput, CoreStep, DebounceCore, DebounceState};
pub use runtime::Runtime;
