#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use goalwatch::build::{BuildRequest, BuildTrigger, MarkerFile};
use goalwatch::config::WatchSetConfig;
use goalwatch::engine::{DebounceTiming, LoopEvent, Runtime};
use goalwatch::fs::mock::MockFileSystem;
use goalwatch::types::{RawEvent, WatchHandle};
use goalwatch::watch::{WatchRegistry, WatchTree};
use goalwatch_test_utils::fake_session::FakeBuildSession;
use goalwatch_test_utils::recording_backend::RecordingBackend;
use goalwatch_test_utils::with_timeout;

pub const QUIET: Duration = Duration::from_millis(500);
pub const MARKER: &str = "/proj/target/goalwatch.txt";

/// A runtime running against an in-memory filesystem, a recording watch
/// backend and a fake build session.
pub struct Harness {
    pub fs: MockFileSystem,
    pub backend: RecordingBackend,
    pub session: FakeBuildSession,
    tx: mpsc::UnboundedSender<LoopEvent>,
    handle: JoinHandle<goalwatch::errors::Result<()>>,
}

impl Harness {
    pub fn start(fs: MockFileSystem, sets: Vec<WatchSetConfig>, goals: &[&str]) -> Self {
        Self::start_with_session(fs, sets, goals, FakeBuildSession::new())
    }

    pub fn start_with_session(
        fs: MockFileSystem,
        sets: Vec<WatchSetConfig>,
        goals: &[&str],
        session: FakeBuildSession,
    ) -> Self {
        let backend = RecordingBackend::new();
        let shared_fs: Arc<dyn goalwatch::fs::FileSystem> = Arc::new(fs.clone());

        let mut tree = WatchTree::new(WatchRegistry::new(backend.clone(), Arc::clone(&shared_fs)));
        tree.register_all(&sets).expect("watch sets should register");

        let trigger = BuildTrigger::new(
            session.clone(),
            shared_fs,
            Some(MarkerFile::new(MARKER)),
            "mvn",
        );
        let request = BuildRequest::goals_only(goals.iter().copied()).expect("goals");
        let timing = DebounceTiming {
            quiet_period: QUIET,
            idle_wait: DebounceTiming::DEFAULT_IDLE_WAIT,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let runtime = Runtime::new(timing, tree, trigger, request, rx);
        let handle = tokio::spawn(runtime.run());

        Self {
            fs,
            backend,
            session,
            tx,
            handle,
        }
    }

    pub fn handle_for(&self, dir: impl AsRef<Path>) -> WatchHandle {
        let dir = dir.as_ref();
        self.backend
            .handle_for(dir)
            .unwrap_or_else(|| panic!("{dir:?} is not watched"))
    }

    pub fn send(&self, event: RawEvent) {
        self.tx.send(LoopEvent::Fs(event)).expect("runtime is running");
    }

    /// Create a file in the mock filesystem and report it.
    pub fn create_file(&self, dir: &str, name: &str) {
        self.fs.add_file(PathBuf::from(dir).join(name));
        self.send(RawEvent::created(self.handle_for(dir), name));
    }

    pub fn modify_file(&self, dir: &str, name: &str) {
        self.send(RawEvent::modified(self.handle_for(dir), name));
    }

    /// Create a directory in the mock filesystem and report it.
    pub fn create_dir(&self, dir: &str, name: &str) {
        self.fs.add_dir(PathBuf::from(dir).join(name));
        self.send(RawEvent::created(self.handle_for(dir), name));
    }

    pub async fn shutdown(self) {
        let _ = self.tx.send(LoopEvent::ShutdownRequested);
        with_timeout(self.handle)
            .await
            .expect("runtime task panicked")
            .expect("runtime returned an error");
    }
}

/// Sleep on the (paused) Tokio clock.
pub async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
