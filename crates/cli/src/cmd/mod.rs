//! Subcommand implementations.
//!
//! Every action input is a long flag that falls back to the `INPUT_<NAME>`
//! variable the CI platform sets for action inputs.

mod build_project;
mod conan_package;
mod info;
mod install_deps;

pub use build_project::{BuildProjectArgs, cmd_build_project};
pub use conan_package::{ConanPackageArgs, cmd_conan_package};
pub use info::{InfoArgs, cmd_info};
pub use install_deps::{InstallDepsArgs, cmd_install_deps};

use std::path::PathBuf;

use anyhow::{Context, Result};

use cibuild_lib::exec::ProcessRunner;
use cibuild_lib::inputs::{InputError, parse_bool};
use cibuild_lib::job::Job;
use cibuild_lib::platform::{HostEnv, Os};
use cibuild_lib::session::Session;

fn host_os() -> Result<Os> {
  Os::current().context("Unsupported host operating system")
}

/// Session over real processes, wired to the CI job of this run.
fn session() -> Result<Session<ProcessRunner>> {
  let cwd = std::env::current_dir().context("Failed to read current directory")?;
  Ok(Session::new(ProcessRunner, Job::from_env(), HostEnv::capture(), cwd))
}

fn runtime() -> Result<tokio::runtime::Runtime> {
  tokio::runtime::Runtime::new().context("Failed to create async runtime")
}

/// Optional path input; the CI platform passes unset inputs as empty strings.
fn non_empty_path(value: &str) -> Option<PathBuf> {
  let value = value.trim();
  (!value.is_empty()).then(|| PathBuf::from(value))
}

/// Value parser for the boolean input `name`.
fn bool_input(name: &'static str) -> impl Fn(&str) -> Result<bool, InputError> + Clone + Send + Sync + 'static {
  move |value: &str| parse_bool(name, value)
}

fn non_empty(value: &str) -> Option<String> {
  let value = value.trim();
  (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_inputs_are_absent() {
    assert_eq!(non_empty_path(""), None);
    assert_eq!(non_empty_path("  "), None);
    assert_eq!(non_empty_path("sub/dir"), Some(PathBuf::from("sub/dir")));
    assert_eq!(non_empty(" 1.2.0 "), Some("1.2.0".to_string()));
  }

  #[test]
  fn bool_input_names_the_input() {
    let parse = bool_input("with-docker");
    assert!(parse("yes").unwrap());
    assert!(parse("maybe").unwrap_err().to_string().contains("input 'with-docker'"));
  }
}
