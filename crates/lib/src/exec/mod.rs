//! External process execution.
//!
//! Every step of an action is an external process: `git`, `cmake`, `conan`
//! or a package manager. This module defines the [`CommandSpec`] describing
//! one invocation, the [`ProcessResult`] it produces, and the [`Runner`]
//! trait that actions are generic over so tests can record invocations
//! instead of spawning them.

mod process;
mod types;

pub use process::ProcessRunner;
pub use types::*;

use std::future::Future;

/// Executes a [`CommandSpec`] and waits for it to finish.
///
/// Implementations must not interpret the exit code: a non-zero exit is a
/// successful `run` whose [`ProcessResult`] reports the failure. Callers
/// decide whether that terminates the action.
pub trait Runner {
  fn run(&mut self, cmd: &CommandSpec) -> impl Future<Output = Result<ProcessResult, ExecError>> + Send;
}
