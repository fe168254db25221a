// src/engine/core.rs

//! Pure debounce state machine.
//!
//! [`DebounceCore`] consumes [`CoreInput`]s (already-classified changes,
//! timeouts, shutdown) and produces [`CoreStep`]s describing what the IO
//! shell should do next. It owns the current wait deadline; the shell only
//! waits until [`DebounceCore::deadline`] and reports what happened.
//!
//! Time is passed in explicitly, so the core is tested without Tokio,
//! channels, a filesystem or processes.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use super::DebounceTiming;

/// Stand-in deadline offset when `now + wait` would not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

fn deadline_after(now: Instant, wait: Duration) -> Instant {
    now.checked_add(wait)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// Where the loop is in a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// Nothing pending; waiting with the long idle wait.
    Idle,
    /// A burst is accumulating; waiting for the quiet period to pass.
    Pending { pending_count: usize },
}

/// What happened since the last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreInput {
    /// An event that counts toward the pending build.
    RelevantChange,
    /// An event that was logged and discarded.
    IgnoredChange,
    /// The notification layer reported lost events.
    Overflow,
    /// The current deadline elapsed with no event.
    Timeout,
    ShutdownRequested,
}

/// Command produced by the core, to be executed by the IO shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand {
    /// Run the build once for a settled burst of `pending_count` changes.
    RunBuild { pending_count: usize },
}

/// Decision returned by the core after a single input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn none() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DebounceCore {
    timing: DebounceTiming,
    state: DebounceState,
    deadline: Instant,
}

impl DebounceCore {
    /// Start idle, with the first deadline one idle wait after `now`.
    pub fn new(timing: DebounceTiming, now: Instant) -> Self {
        Self {
            timing,
            state: DebounceState::Idle,
            deadline: deadline_after(now, timing.idle_wait),
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == DebounceState::Idle
    }

    pub fn pending_count(&self) -> usize {
        match self.state {
            DebounceState::Idle => 0,
            DebounceState::Pending { pending_count } => pending_count,
        }
    }

    /// Instant at which the shell should report [`CoreInput::Timeout`].
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn timing(&self) -> DebounceTiming {
        self.timing
    }

    /// Feed one input observed at `now`.
    ///
    /// Relevant changes push the deadline to `now + quiet_period`, so a
    /// burst settles once, after its last change. Ignored changes and
    /// overflow leave both the state and the deadline alone.
    pub fn step(&mut self, input: CoreInput, now: Instant) -> CoreStep {
        match input {
            CoreInput::RelevantChange => {
                let pending_count = self.pending_count() + 1;
                self.state = DebounceState::Pending { pending_count };
                self.deadline = deadline_after(now, self.timing.quiet_period);
                debug!(pending_count, "change scheduled; waiting for quiet period");
                CoreStep::none()
            }
            CoreInput::IgnoredChange | CoreInput::Overflow => CoreStep::none(),
            CoreInput::Timeout => {
                let commands = match self.state {
                    DebounceState::Idle => Vec::new(),
                    DebounceState::Pending { pending_count } => {
                        vec![CoreCommand::RunBuild { pending_count }]
                    }
                };
                self.state = DebounceState::Idle;
                self.deadline = deadline_after(now, self.timing.idle_wait);
                CoreStep {
                    commands,
                    keep_running: true,
                }
            }
            CoreInput::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }

    /// Re-arm the idle wait from `now`.
    ///
    /// The shell calls this after a build so the long wait counts from when
    /// the build finished, not from when it started.
    pub fn rearm(&mut self, now: Instant) {
        if self.is_idle() {
            self.deadline = deadline_after(now, self.timing.idle_wait);
        }
    }
}
