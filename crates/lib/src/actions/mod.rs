//! The three CI actions.
//!
//! Each action is an `async fn run` generic over the [`Runner`] so the same
//! code drives real processes in the CLI and a recording runner in tests:
//! - [`build_project`]: configure, build, install and test a CMake project
//! - [`install_deps`]: system packages, then source-built GitHub dependencies
//! - [`conan_package`]: create and upload a Conan package

pub mod build_project;
pub mod conan_package;
pub mod install_deps;

pub use build_project::BuildProjectInputs;
pub use conan_package::{ConanInputs, ConanOutcome};
pub use install_deps::InstallDepsInputs;

use std::path::{Path, PathBuf};

use crate::error::ActionError;
use crate::exec::Runner;
use crate::platform::PlatformProfile;
use crate::session::Session;

/// Surface the compiler warning and export the profile's variables.
fn export_profile<R: Runner>(session: &mut Session<R>, profile: &PlatformProfile) -> Result<(), ActionError> {
  if let Some(warning) = profile.compiler_warning() {
    session.job.warning(&warning);
  }
  for (name, value) in &profile.exports {
    session.job.export_variable(name, value)?;
  }
  Ok(())
}

/// Resolve an optional directory input against the session directory.
fn resolve_dir(cwd: &Path, dir: Option<&Path>) -> PathBuf {
  match dir {
    Some(dir) => dunce::simplified(&cwd.join(dir)).to_path_buf(),
    None => cwd.to_path_buf(),
  }
}
