// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info};

use crate::build::{BuildRequest, BuildSession, BuildTrigger};
use crate::errors::Result;
use crate::watch::{Classification, WatchBackend, WatchTree};

use super::core::{CoreCommand, CoreInput, DebounceCore};
use super::{DebounceTiming, LoopEvent};

/// The single watch loop.
///
/// This is the IO shell around [`DebounceCore`]: it waits for the next
/// [`LoopEvent`] until the core's deadline, classifies filesystem events
/// through the [`WatchTree`], and awaits builds inline. Because the build is
/// awaited, triggers are strictly serialized and events arriving during a
/// build simply queue up in the channel.
pub struct Runtime<B: WatchBackend, S: BuildSession> {
    core: DebounceCore,
    tree: WatchTree<B>,
    trigger: BuildTrigger<S>,
    request: BuildRequest,
    event_rx: mpsc::UnboundedReceiver<LoopEvent>,
}

impl<B: WatchBackend, S: BuildSession> fmt::Debug for Runtime<B, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("tree", &self.tree)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl<B: WatchBackend, S: BuildSession> Runtime<B, S> {
    /// `tree` should already have its watch sets registered.
    pub fn new(
        timing: DebounceTiming,
        tree: WatchTree<B>,
        trigger: BuildTrigger<S>,
        request: BuildRequest,
        event_rx: mpsc::UnboundedReceiver<LoopEvent>,
    ) -> Self {
        Self {
            core: DebounceCore::new(timing, Instant::now()),
            tree,
            trigger,
            request,
            event_rx,
        }
    }

    /// Main event loop.
    ///
    /// Runs until a shutdown is requested or the event channel closes. A
    /// build in progress is always allowed to finish first.
    pub async fn run(mut self) -> Result<()> {
        info!("goalwatch runtime started");
        info!("waiting for changes...");

        loop {
            let input = match timeout_at(self.core.deadline(), self.event_rx.recv()).await {
                Err(_elapsed) => CoreInput::Timeout,
                Ok(None) => {
                    info!("event channel closed; exiting");
                    CoreInput::ShutdownRequested
                }
                Ok(Some(LoopEvent::ShutdownRequested)) => {
                    info!("shutdown requested; exiting");
                    CoreInput::ShutdownRequested
                }
                Ok(Some(LoopEvent::Fs(raw))) => {
                    debug!(?raw, "runtime received event");
                    match self.tree.classify(&raw) {
                        Classification::Relevant { .. } => CoreInput::RelevantChange,
                        Classification::Ignored(_) => CoreInput::IgnoredChange,
                        Classification::Overflow => CoreInput::Overflow,
                    }
                }
            };

            let step = self.core.step(input, Instant::now());

            for command in step.commands {
                self.execute_command(command).await;
            }

            if !step.keep_running {
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    async fn execute_command(&mut self, command: CoreCommand) {
        match command {
            CoreCommand::RunBuild { pending_count } => {
                info!(pending_count, "changes settled");
                self.trigger.run(&self.request).await;
                self.core.rearm(Instant::now());
                info!("waiting for changes...");
            }
        }
    }
}
