use std::error::Error;
use std::path::Path;

use goalwatch::watch::{ConfigResolver, WatchSet};
use goalwatch_test_utils::builders::WatchSetBuilder;

type TestResult = Result<(), Box<dyn Error>>;

fn compile(builder: WatchSetBuilder) -> WatchSet {
    WatchSet::compile(builder.build()).expect("patterns should compile")
}

#[test]
fn no_patterns_matches_everything() {
    let set = compile(WatchSetBuilder::new("/r"));

    assert!(set.matches("a.txt"));
    assert!(set.matches("deep/nested/B.java"));
}

#[test]
fn includes_restrict_to_matching_paths() {
    let set = compile(WatchSetBuilder::new("/r").include("**/*.java"));

    assert!(set.matches("A.java"));
    assert!(set.matches("pkg/A.java"));
    assert!(!set.matches("pkg/notes.txt"));
}

#[test]
fn excludes_alone_reject_only_what_they_match() {
    let set = compile(WatchSetBuilder::new("/r").exclude("tmp/*"));

    assert!(set.matches("src/a.txt"));
    assert!(!set.matches("tmp/a.txt"));
}

#[test]
fn exclude_wins_over_include() {
    let set = compile(WatchSetBuilder::new("/r").include("*.txt").exclude("tmp/*"));

    assert!(set.matches("a.txt"));
    // `*` crosses separators, so the include matches too; exclude still wins.
    assert!(!set.matches("tmp/a.txt"));
    assert!(!set.matches("a.java"));
}

#[test]
fn invalid_glob_is_rejected() {
    let err = WatchSet::compile(WatchSetBuilder::new("/r").include("src/[").build())
        .expect_err("unclosed class should not compile");

    assert!(format!("{err:#}").contains("src/["));
}

#[test]
fn resolver_picks_the_nearest_enclosing_root() -> TestResult {
    let mut resolver = ConfigResolver::new();
    resolver.insert(WatchSet::compile(WatchSetBuilder::new("/r").build())?);
    resolver.insert(WatchSet::compile(
        WatchSetBuilder::new("/r/gen").include("*.xml").build(),
    )?);

    let outer = resolver.resolve(Path::new("/r/src/A.java")).ok_or("outer")?;
    assert_eq!(outer.directory(), Path::new("/r"));

    let inner = resolver.resolve(Path::new("/r/gen/out/a.xml")).ok_or("inner")?;
    assert_eq!(inner.directory(), Path::new("/r/gen"));

    assert!(resolver.resolve(Path::new("/elsewhere/a.txt")).is_none());
    assert_eq!(resolver.len(), 2);

    Ok(())
}
