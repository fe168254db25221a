// src/watch/mod.rs

//! Directory watching and change classification.
//!
//! This module is responsible for:
//! - Keeping one watch per directory in a [`WatchRegistry`], and reclaiming
//!   watches whose directories disappeared.
//! - Walking watch set roots (and newly created directories) to register
//!   watches recursively.
//! - Compiling include/exclude globs per watch set and resolving which set
//!   owns a path.
//! - Wiring up the OS notification layer (`notify`) behind [`WatchBackend`].
//!
//! It does **not** know about debouncing or builds; it only decides whether
//! a single raw event is a relevant change.

pub mod backend;
pub mod path_utils;
pub mod patterns;
pub mod registry;
pub mod resolver;
pub mod tree;
pub mod walker;

pub use backend::{translate_event, NotifyBackend, WatchBackend};
pub use patterns::WatchSet;
pub use registry::WatchRegistry;
pub use resolver::ConfigResolver;
pub use tree::{Classification, IgnoreReason, WatchTree};
pub use walker::{walk, walk_incremental, DirWalk};
