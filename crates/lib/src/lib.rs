//! cibuild-lib: CI build orchestration
//!
//! This crate implements the actions driven by the `cibuild` binary:
//! - `actions`: build a CMake project, install dependencies, package with Conan
//! - `platform`: per-OS profiles and the scoped environment overlay
//! - `options`: CMake flag assembly
//! - `deps`: source-built GitHub dependencies
//! - `job`: the CI platform's workflow-command protocol
//! - `exec`: external process execution behind the [`exec::Runner`] trait

pub mod actions;
pub mod conan;
pub mod deps;
pub mod error;
pub mod exec;
pub mod inputs;
pub mod job;
pub mod options;
pub mod platform;
pub mod session;
pub mod util;

pub use error::ActionError;
pub use session::Session;
