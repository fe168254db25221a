// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::build::{BuildTrigger, CommandBuildSession};
use crate::cli::CliArgs;
use crate::config::{load_and_validate, ConfigFile};
use crate::engine::{LoopEvent, Runtime};
use crate::errors::{GoalwatchError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::{NotifyBackend, WatchRegistry, WatchTree};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the `notify` backend and the watch registry
/// - the build trigger (command session + marker file)
/// - the debounce runtime
/// - Ctrl-C handling
///
/// Everything that can fail at setup fails here, before any watching starts.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let (event_tx, event_rx) = mpsc::unbounded_channel::<LoopEvent>();

    let backend = NotifyBackend::new(event_tx.clone())
        .map_err(|e| GoalwatchError::SetupError(format!("unable to create watch service: {e:#}")))?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let mut tree = WatchTree::new(WatchRegistry::new(backend, Arc::clone(&fs)));
    tree.register_all(cfg.watch_sets())?;

    let build = cfg.build_section();
    let session = CommandBuildSession::new(build.program.clone(), build.working_dir.clone());
    let trigger = BuildTrigger::new(session, Arc::clone(&fs), cfg.marker(), build.program.clone());
    let request = cfg.build_request()?;

    // Ctrl-C → graceful shutdown (after any build in progress).
    {
        let tx = event_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(LoopEvent::ShutdownRequested);
        });
    }
    drop(event_tx);

    info!(command = %request.command_line(&build.program), "watching for changes");

    let runtime = Runtime::new(cfg.timing(), tree, trigger, request, event_rx);
    runtime.run().await
}

/// Simple dry-run output: print watch sets and the build command.
fn print_dry_run(cfg: &ConfigFile) {
    let build = cfg.build_section();
    let timing = cfg.timing();

    println!("goalwatch dry-run");
    match cfg.build_request() {
        Ok(request) => println!("  command: {}", request.command_line(&build.program)),
        Err(e) => println!("  command: <invalid: {e}>"),
    }
    if let Some(dir) = &build.working_dir {
        println!("  working_dir: {}", dir.display());
    }
    match cfg.marker() {
        Some(marker) => println!("  marker: {}", marker.path().display()),
        None => println!("  marker: (disabled)"),
    }
    println!("  quiet_period: {:?}", timing.quiet_period);
    println!("  idle_wait: {:?}", timing.idle_wait);
    println!();

    println!("watch sets ({}):", cfg.watch_sets().len());
    for set in cfg.watch_sets() {
        println!("  - {}", set.directory.display());
        println!("      recursive: {}", set.recursive);
        if !set.includes.is_empty() {
            println!("      includes: {:?}", set.includes);
        }
        if !set.excludes.is_empty() {
            println!("      excludes: {:?}", set.excludes);
        }
    }

    debug!("dry-run complete (no watching)");
}
