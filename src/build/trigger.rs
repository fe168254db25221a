// src/build/trigger.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::fs::FileSystem;

use super::request::BuildRequest;
use super::session::{BuildOutcome, BuildSession};

/// File whose modification time is bumped after every successful build, so
/// other processes can tell a rebuild just happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerFile {
    path: PathBuf,
}

impl MarkerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Runs the build session and performs the success-gated marker touch.
///
/// Nothing here returns an error: a build that cannot start counts as a
/// failed build, and marker failures are only logged.
pub struct BuildTrigger<S: BuildSession> {
    session: S,
    fs: Arc<dyn FileSystem>,
    marker: Option<MarkerFile>,
    program: String,
}

impl<S: BuildSession> std::fmt::Debug for BuildTrigger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildTrigger")
            .field("marker", &self.marker)
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

impl<S: BuildSession> BuildTrigger<S> {
    /// `program` is only used to log the command-line equivalent.
    pub fn new(
        session: S,
        fs: Arc<dyn FileSystem>,
        marker: Option<MarkerFile>,
        program: impl Into<String>,
    ) -> Self {
        Self {
            session,
            fs,
            marker,
            program: program.into(),
        }
    }

    pub fn marker(&self) -> Option<&MarkerFile> {
        self.marker.as_ref()
    }

    /// Execute `request` once and touch the marker if it succeeded.
    pub async fn run(&mut self, request: &BuildRequest) -> BuildOutcome {
        info!("change detected; running command-line equivalent of:");
        info!(" {}", request.command_line(&self.program));

        let outcome = match self.session.execute(request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %format!("{err:#}"), "build could not be run");
                BuildOutcome::Failed { exit_code: None }
            }
        };

        match outcome {
            BuildOutcome::Succeeded => {
                info!(goals = ?request.goals(), "build succeeded");
                self.touch_marker();
            }
            BuildOutcome::Failed { exit_code } => {
                error!(?exit_code, goals = ?request.goals(), "goal(s) had errors; skipping marker file");
            }
        }

        outcome
    }

    fn touch_marker(&self) {
        let Some(marker) = &self.marker else {
            debug!("no marker file configured");
            return;
        };

        info!(path = ?marker.path(), "touching marker file");
        if let Err(err) = self.fs.touch(marker.path()) {
            warn!(path = ?marker.path(), error = %format!("{err:#}"), "unable to touch marker file");
        }
    }
}
