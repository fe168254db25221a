use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use goalwatch::build::{BuildOutcome, BuildRequest, BuildSession};

/// One recorded `execute` call.
#[derive(Debug, Clone)]
pub struct ExecutedBuild {
    pub request: BuildRequest,
    pub started_at: SystemTime,
}

/// What the fake should do for the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scripted {
    Outcome(BuildOutcome),
    /// Return `Err`, as if the build program could not be started.
    SpawnError,
}

/// A fake build session that:
/// - records every request it receives
/// - returns scripted outcomes in order, then `Succeeded` once the script
///   runs out.
#[derive(Clone, Default)]
pub struct FakeBuildSession {
    executed: Arc<Mutex<Vec<ExecutedBuild>>>,
    script: Arc<Mutex<VecDeque<Scripted>>>,
    delay: Option<Duration>,
}

impl FakeBuildSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every build take `delay` (on the Tokio clock).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue outcomes for upcoming calls.
    pub fn script(&self, outcomes: impl IntoIterator<Item = Scripted>) {
        self.script.lock().unwrap().extend(outcomes);
    }

    pub fn executed(&self) -> Vec<ExecutedBuild> {
        self.executed.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.executed.lock().unwrap().len()
    }

    /// Goals of every recorded call, in order.
    pub fn goals(&self) -> Vec<Vec<String>> {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .map(|b| b.request.goals().to_vec())
            .collect()
    }
}

impl BuildSession for FakeBuildSession {
    fn execute(
        &mut self,
        request: &BuildRequest,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<BuildOutcome>> + Send + '_>> {
        self.executed.lock().unwrap().push(ExecutedBuild {
            request: request.clone(),
            started_at: SystemTime::now(),
        });
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Scripted::Outcome(BuildOutcome::Succeeded));

        let delay = self.delay;

        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            match next {
                Scripted::Outcome(outcome) => Ok(outcome),
                Scripted::SpawnError => Err(anyhow::anyhow!("No such file or directory (os error 2)")),
            }
        })
    }
}
