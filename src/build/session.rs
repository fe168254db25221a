// src/build/session.rs

//! Pluggable build session abstraction.
//!
//! - `CommandBuildSession` is the implementation used by `goalwatch`. It runs
//!   the build tool as a child process and maps its exit status.
//! - Tests provide their own `BuildSession` that records requests and
//!   returns scripted outcomes.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::info;

use super::request::BuildRequest;

/// How a build that actually ran turned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Succeeded,
    /// The build ran but reported errors.
    Failed { exit_code: Option<i32> },
}

impl BuildOutcome {
    pub fn succeeded(self) -> bool {
        matches!(self, BuildOutcome::Succeeded)
    }
}

/// Trait abstracting the build session that executes goals.
///
/// `Err` means the build could not be run at all; a build that ran and
/// failed is `Ok(BuildOutcome::Failed { .. })`.
pub trait BuildSession: Send {
    fn execute(
        &mut self,
        request: &BuildRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BuildOutcome>> + Send + '_>>;
}

/// Runs `program` with the request's arguments in `working_dir`.
///
/// The child inherits stdout/stderr so build output reaches the terminal.
#[derive(Debug, Clone)]
pub struct CommandBuildSession {
    program: String,
    working_dir: Option<PathBuf>,
}

impl CommandBuildSession {
    pub fn new(program: impl Into<String>, working_dir: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            working_dir,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl BuildSession for CommandBuildSession {
    fn execute(
        &mut self,
        request: &BuildRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BuildOutcome>> + Send + '_>> {
        let args = request.to_args();

        Box::pin(async move {
            let mut cmd = Command::new(&self.program);
            cmd.args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .kill_on_drop(true);
            if let Some(dir) = &self.working_dir {
                cmd.current_dir(dir);
            }

            let status = cmd
                .status()
                .await
                .with_context(|| format!("running build program '{}'", self.program))?;

            info!(
                program = %self.program,
                exit_code = ?status.code(),
                success = status.success(),
                "build process exited"
            );

            Ok(if status.success() {
                BuildOutcome::Succeeded
            } else {
                BuildOutcome::Failed {
                    exit_code: status.code(),
                }
            })
        })
    }
}
