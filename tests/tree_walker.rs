use std::path::{Path, PathBuf};
use std::sync::Arc;

use goalwatch::fs::FileSystem;
use goalwatch::fs::mock::MockFileSystem;
use goalwatch::watch::{walk, walk_incremental, DirWalk, WatchRegistry};
use goalwatch_test_utils::init_tracing;
use goalwatch_test_utils::recording_backend::RecordingBackend;

fn sorted(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
    paths.sort();
    paths
}

fn paths(items: &[&str]) -> Vec<PathBuf> {
    items.iter().map(|s| PathBuf::from(*s)).collect()
}

fn project() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_dir("/p/src/main");
    fs.add_dir("/p/src/test");
    fs.add_file("/p/src/main/A.java");
    fs.add_file("/p/pom.xml");
    fs
}

fn registry(fs: &MockFileSystem, backend: &RecordingBackend) -> WatchRegistry<RecordingBackend> {
    let fs: Arc<dyn FileSystem> = Arc::new(fs.clone());
    WatchRegistry::new(backend.clone(), fs)
}

#[test]
fn dir_walk_yields_directories_only() {
    let fs = project();
    let found = sorted(DirWalk::new(&fs, Path::new("/p")).collect());

    assert_eq!(found, paths(&["/p", "/p/src", "/p/src/main", "/p/src/test"]));
}

#[test]
fn unreadable_directory_is_yielded_but_not_descended() {
    init_tracing();
    let fs = project();
    fs.add_dir("/p/secret/inner");
    fs.deny_read("/p/secret");

    let found = sorted(DirWalk::new(&fs, Path::new("/p")).collect());

    assert!(found.contains(&PathBuf::from("/p/secret")));
    assert!(!found.contains(&PathBuf::from("/p/secret/inner")));
    assert!(found.contains(&PathBuf::from("/p/src/main")));
}

#[test]
fn walk_registers_every_directory() {
    init_tracing();
    let fs = project();
    let backend = RecordingBackend::new();
    let mut reg = registry(&fs, &backend);

    let placed = walk(&mut reg, Path::new("/p"));

    assert_eq!(placed, 4);
    assert!(!backend.is_watching("/p/pom.xml"));
    assert!(backend.is_watching("/p/src/test"));

    assert_eq!(walk(&mut reg, Path::new("/p")), 0, "second walk adds nothing");
}

#[test]
fn denied_subdirectory_leaves_siblings_watched() {
    init_tracing();
    let fs = project();
    let backend = RecordingBackend::new();
    backend.deny("/p/src/main");
    let mut reg = registry(&fs, &backend);

    walk(&mut reg, Path::new("/p"));

    assert!(!reg.contains(Path::new("/p/src/main")));
    assert!(reg.contains(Path::new("/p/src/test")));
    assert!(reg.contains(Path::new("/p/src")));
}

#[test]
fn incremental_walk_covers_only_the_new_subtree() {
    init_tracing();
    let fs = project();
    let backend = RecordingBackend::new();
    let mut reg = registry(&fs, &backend);
    walk(&mut reg, Path::new("/p"));
    let before = backend.watch_calls().len();

    fs.add_dir("/p/src/main/pkg/sub");
    let placed = walk_incremental(&mut reg, Path::new("/p/src/main/pkg"), Path::new("/p"));

    assert_eq!(placed, 2);
    assert_eq!(
        sorted(backend.watch_calls()[before..].to_vec()),
        paths(&["/p/src/main/pkg", "/p/src/main/pkg/sub"])
    );
}

#[test]
fn incremental_walk_with_unknown_parent_rewalks_the_root() {
    init_tracing();
    let fs = project();
    let backend = RecordingBackend::new();
    let mut reg = registry(&fs, &backend);
    walk(&mut reg, Path::new("/p"));

    // Two levels appear at once; only the deeper one is reported.
    fs.add_dir("/p/gen/out");
    let placed = walk_incremental(&mut reg, Path::new("/p/gen/out"), Path::new("/p"));

    assert_eq!(placed, 2);
    assert!(reg.contains(Path::new("/p/gen")));
    assert!(reg.contains(Path::new("/p/gen/out")));
}

#[test]
fn symlinked_directories_are_not_followed() {
    let fs = project();
    fs.add_symlink_dir("/p/src/link");
    fs.add_dir("/p/src/link/inner");

    let found = sorted(DirWalk::new(&fs, Path::new("/p")).collect());
    assert_eq!(found, paths(&["/p", "/p/src", "/p/src/main", "/p/src/test"]));

    assert_eq!(DirWalk::new(&fs, Path::new("/p/src/link")).count(), 0);
}

#[test]
fn incremental_walk_skips_a_new_symlinked_directory() {
    init_tracing();
    let fs = project();
    let backend = RecordingBackend::new();
    let mut reg = registry(&fs, &backend);
    walk(&mut reg, Path::new("/p"));
    let before = backend.watch_calls().len();

    fs.add_symlink_dir("/p/src/link");
    fs.add_dir("/p/src/link/inner");
    let placed = walk_incremental(&mut reg, Path::new("/p/src/link"), Path::new("/p"));

    assert_eq!(placed, 0);
    assert_eq!(backend.watch_calls().len(), before);
    assert!(!reg.contains(Path::new("/p/src/link/inner")));
}
