use std::path::{Path, PathBuf};
use std::sync::Arc;

use goalwatch::errors::GoalwatchError;
use goalwatch::fs::FileSystem;
use goalwatch::fs::mock::MockFileSystem;
use goalwatch::types::{RawEvent, WatchHandle};
use goalwatch::watch::{Classification, IgnoreReason, WatchRegistry, WatchTree};
use goalwatch_test_utils::builders::WatchSetBuilder;
use goalwatch_test_utils::init_tracing;
use goalwatch_test_utils::recording_backend::RecordingBackend;

struct Fixture {
    fs: MockFileSystem,
    backend: RecordingBackend,
    tree: WatchTree<RecordingBackend>,
}

impl Fixture {
    fn new(fs: MockFileSystem) -> Self {
        let backend = RecordingBackend::new();
        let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());
        let tree = WatchTree::new(WatchRegistry::new(backend.clone(), shared));
        Self { fs, backend, tree }
    }

    fn handle(&self, dir: &str) -> WatchHandle {
        self.backend.handle_for(dir).expect("dir should be watched")
    }
}

fn watched_project() -> Fixture {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_dir("/r/src/pkg");
    let mut fx = Fixture::new(fs);
    fx.tree
        .register_all(&[WatchSetBuilder::new("/r").exclude("**/*.tmp").build()])
        .expect("register");
    fx
}

#[test]
fn matching_file_change_is_relevant() {
    let mut fx = watched_project();
    fx.fs.add_file("/r/src/pkg/A.java");
    let dir = fx.handle("/r/src/pkg");
    let class = fx.tree.classify(&RawEvent::modified(dir, "A.java"));

    assert_eq!(
        class,
        Classification::Relevant {
            path: PathBuf::from("/r/src/pkg/A.java")
        }
    );
}

#[test]
fn excluded_file_is_filtered() {
    let mut fx = watched_project();
    fx.fs.add_file("/r/src/x.tmp");
    let dir = fx.handle("/r/src");
    let class = fx.tree.classify(&RawEvent::created(dir, "x.tmp"));

    assert_eq!(class, Classification::Ignored(IgnoreReason::Filtered));
}

#[test]
fn unknown_handle_is_ignored() {
    let mut fx = watched_project();

    let class = fx.tree.classify(&RawEvent::modified(WatchHandle(999), "a.txt"));

    assert_eq!(class, Classification::Ignored(IgnoreReason::UnknownHandle));
}

#[test]
fn event_without_a_name_is_ignored() {
    let mut fx = watched_project();
    let mut event = RawEvent::modified(fx.handle("/r"), "ignored");
    event.name = None;

    assert_eq!(
        fx.tree.classify(&event),
        Classification::Ignored(IgnoreReason::MissingName)
    );
}

#[test]
fn overflow_is_reported_as_such() {
    let mut fx = watched_project();

    assert_eq!(fx.tree.classify(&RawEvent::overflow(None)), Classification::Overflow);
}

#[test]
fn new_directory_is_registered_but_not_relevant() {
    let mut fx = watched_project();
    fx.fs.add_dir("/r/src/gen/deep");
    let dir = fx.handle("/r/src");
    let class = fx.tree.classify(&RawEvent::created(dir, "gen"));

    assert_eq!(class, Classification::Ignored(IgnoreReason::Directory));
    assert!(fx.tree.is_watched(Path::new("/r/src/gen")));
    assert!(fx.tree.is_watched(Path::new("/r/src/gen/deep")));
}

#[test]
fn directory_modification_is_ignored() {
    let mut fx = watched_project();
    let dir = fx.handle("/r/src");
    let class = fx.tree.classify(&RawEvent::modified(dir, "pkg"));

    assert_eq!(class, Classification::Ignored(IgnoreReason::Directory));
}

#[test]
fn delete_explained_by_stale_watch_is_ignored() {
    let mut fx = watched_project();
    let src = fx.handle("/r/src");
    fx.fs.remove("/r/src/pkg");

    let class = fx.tree.classify(&RawEvent::deleted(src, "pkg"));

    assert_eq!(class, Classification::Ignored(IgnoreReason::StaleWatchCleanup));
    assert!(!fx.tree.is_watched(Path::new("/r/src/pkg")));
}

#[test]
fn coalesced_delete_count_must_match_reclaimed_watches() {
    let mut fx = watched_project();
    let src = fx.handle("/r/src");
    fx.fs.remove("/r/src/pkg");

    // Three deletes reported, one watch reclaimed: something else went too.
    let class = fx.tree.classify(&RawEvent::deleted(src, "pkg").with_count(3));

    assert!(class.is_relevant());
}

#[test]
fn event_from_a_reclaimed_watch_is_ignored() {
    let mut fx = watched_project();
    let pkg = fx.handle("/r/src/pkg");
    fx.fs.remove("/r/src/pkg");
    let dir = fx.handle("/r/src");
    fx.tree.classify(&RawEvent::deleted(dir, "pkg"));

    let class = fx.tree.classify(&RawEvent::deleted(pkg, "A.java"));

    assert_eq!(class, Classification::Ignored(IgnoreReason::UnknownHandle));
}

#[test]
fn non_recursive_set_watches_only_its_root() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_dir("/flat/sub");
    let mut fx = Fixture::new(fs);
    fx.tree
        .register_all(&[WatchSetBuilder::new("/flat").recursive(false).build()])
        .expect("register");

    assert!(fx.tree.is_watched(Path::new("/flat")));
    assert!(!fx.tree.is_watched(Path::new("/flat/sub")));

    fx.fs.add_dir("/flat/new");
    let dir = fx.handle("/flat");
    let class = fx.tree.classify(&RawEvent::created(dir, "new"));
    assert_eq!(class, Classification::Ignored(IgnoreReason::Directory));
    assert!(!fx.tree.is_watched(Path::new("/flat/new")));
}

#[test]
fn missing_root_is_a_setup_error() {
    init_tracing();
    let mut fx = Fixture::new(MockFileSystem::new());

    let err = fx
        .tree
        .register_all(&[WatchSetBuilder::new("/nope").build()])
        .expect_err("missing root must fail");

    assert!(matches!(err, GoalwatchError::SetupError(_)));
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn root_that_is_a_file_is_a_setup_error() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/pom.xml");
    let mut fx = Fixture::new(fs);

    let err = fx
        .tree
        .register_all(&[WatchSetBuilder::new("/pom.xml").build()])
        .expect_err("file root must fail");

    assert!(matches!(err, GoalwatchError::SetupError(_)));
    assert!(err.to_string().contains("not a directory"));
}

#[test]
fn late_report_of_a_dir_reclaimed_by_an_earlier_sweep_is_ignored_once() {
    let mut fx = watched_project();
    fx.fs.add_file("/r/src/pkg/A.java");
    let src = fx.handle("/r/src");
    let pkg = fx.handle("/r/src/pkg");
    fx.fs.remove("/r/src/pkg");

    // The file's delete arrives first and its sweep reclaims `pkg`; the
    // directory's own delete follows.
    let file = fx.tree.classify(&RawEvent::deleted(pkg, "A.java"));
    let dir = fx.tree.classify(&RawEvent::deleted(src, "pkg"));
    let again = fx.tree.classify(&RawEvent::deleted(src, "pkg"));

    assert_eq!(file, Classification::Ignored(IgnoreReason::StaleWatchCleanup));
    assert_eq!(dir, Classification::Ignored(IgnoreReason::StaleWatchCleanup));
    assert!(again.is_relevant(), "a reclaimed path is only forgiven once");
    assert_eq!(fx.tree.registry().resolve(pkg), None);
}

#[test]
fn file_recreated_where_a_dir_was_reclaimed_reports_its_delete() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_dir("/r/out");
    let mut fx = Fixture::new(fs);
    fx.tree
        .register_all(&[WatchSetBuilder::new("/r").build()])
        .expect("register");
    let r = fx.handle("/r");

    fx.fs.remove("/r/out");
    let dir_gone = fx.tree.classify(&RawEvent::deleted(r, "out"));
    assert_eq!(dir_gone, Classification::Ignored(IgnoreReason::StaleWatchCleanup));

    fx.fs.add_file("/r/out");
    assert!(fx.tree.classify(&RawEvent::created(r, "out")).is_relevant());

    fx.fs.remove("/r/out");
    let file_gone = fx.tree.classify(&RawEvent::deleted(r, "out"));
    assert_eq!(
        file_gone,
        Classification::Relevant {
            path: PathBuf::from("/r/out")
        }
    );
}

#[test]
fn explained_delete_does_not_excuse_a_later_one() {
    let mut fx = watched_project();
    let src = fx.handle("/r/src");
    fx.fs.remove("/r/src/pkg");

    let first = fx.tree.classify(&RawEvent::deleted(src, "pkg"));
    // Same name again, now a plain file that came and went unseen.
    let second = fx.tree.classify(&RawEvent::deleted(src, "pkg"));

    assert_eq!(first, Classification::Ignored(IgnoreReason::StaleWatchCleanup));
    assert!(second.is_relevant());
}
