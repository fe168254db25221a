// src/build/mod.rs

//! Build execution layer.
//!
//! - [`request`] holds the immutable goals/profiles/properties for a build.
//! - [`session`] provides the `BuildSession` trait and the production
//!   `CommandBuildSession`, which tests replace with a fake.
//! - [`trigger`] runs one build and touches the marker file on success.

pub mod request;
pub mod session;
pub mod trigger;

pub use request::BuildRequest;
pub use session::{BuildOutcome, BuildSession, CommandBuildSession};
pub use trigger::{BuildTrigger, MarkerFile};
