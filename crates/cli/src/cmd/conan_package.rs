use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Args};

use cibuild_lib::actions::conan_package::{self, bundled_docker_script};
use cibuild_lib::actions::ConanInputs;
use cibuild_lib::conan::RetryPolicy;
use cibuild_lib::inputs::{parse_docker_images, required};

use super::{bool_input, host_os, non_empty, non_empty_path, runtime, session};
use crate::output::{format_duration, print_info, print_stat, print_success};

#[derive(Debug, Args)]
pub struct ConanPackageArgs {
  /// Package name
  #[arg(long, env = "INPUT_PACKAGE", default_value = "")]
  pub package: String,

  /// Remote user
  #[arg(long, env = "INPUT_USER", default_value = "")]
  pub user: String,

  /// Remote repository, also the reference's user part
  #[arg(long, env = "INPUT_REPOSITORY", default_value = "")]
  pub repository: String,

  /// Remote URL, defaults to the user's bintray repository
  #[arg(long, env = "INPUT_REMOTE", default_value = "")]
  pub remote: String,

  /// Channel for tagged releases
  #[arg(long, env = "INPUT_STABLE-CHANNEL", default_value = "stable")]
  pub stable_channel: String,

  /// Channel for development snapshots
  #[arg(long, env = "INPUT_DEV-CHANNEL", default_value = "head")]
  pub dev_channel: String,

  /// Create Release and Debug packages
  #[arg(
    long,
    env = "INPUT_WITH-BUILD-TYPE",
    value_parser = bool_input("with-build-type"),
    action = ArgAction::Set,
    num_args = 0..=1,
    default_value = "false",
    default_missing_value = "true"
  )]
  pub with_build_type: bool,

  /// Upload whatever the trigger
  #[arg(
    long,
    env = "INPUT_FORCE-UPLOAD",
    value_parser = bool_input("force-upload"),
    action = ArgAction::Set,
    num_args = 0..=1,
    default_value = "false",
    default_missing_value = "true"
  )]
  pub force_upload: bool,

  /// Directory holding conanfile.py
  #[arg(long, env = "INPUT_WORKING-DIRECTORY", default_value = "")]
  pub working_directory: String,

  /// API key used to log into the remote
  #[arg(long = "api-key", env = "INPUT_BINTRAY_API_KEY", default_value = "", hide_env_values = true)]
  pub api_key: String,

  /// Package version, read from conanfile.py when empty
  #[arg(long, env = "INPUT_VERSION", default_value = "")]
  pub version: String,

  /// Repeat the build in docker images
  #[arg(
    long,
    env = "INPUT_WITH-DOCKER",
    value_parser = bool_input("with-docker"),
    action = ArgAction::Set,
    num_args = 0..=1,
    default_value = "false",
    default_missing_value = "true"
  )]
  pub with_docker: bool,

  /// YAML list of docker images
  #[arg(long, env = "INPUT_DOCKER-IMAGES", default_value = "")]
  pub docker_images: String,

  /// Script run once per docker image [default: docker-and-build.sh next to cibuild]
  #[arg(long, env = "INPUT_DOCKER-SCRIPT", default_value = "")]
  pub docker_script: String,

  /// Upload attempts before giving up
  #[arg(long, default_value_t = RetryPolicy::default().attempts)]
  pub upload_attempts: u32,

  /// Pause between upload attempts
  #[arg(long, default_value = "5s")]
  pub upload_delay: humantime::Duration,
}

impl ConanPackageArgs {
  fn into_inputs(self) -> Result<ConanInputs> {
    Ok(ConanInputs {
      package: required("package", &self.package)?,
      user: required("user", &self.user)?,
      repository: required("repository", &self.repository)?,
      remote: non_empty(&self.remote),
      stable_channel: required("stable-channel", &self.stable_channel)?,
      dev_channel: required("dev-channel", &self.dev_channel)?,
      with_build_type: self.with_build_type,
      force_upload: self.force_upload,
      working_directory: non_empty_path(&self.working_directory),
      api_key: self.api_key,
      version: non_empty(&self.version),
      with_docker: self.with_docker,
      docker_images: parse_docker_images(&self.docker_images)?,
      docker_script: non_empty_path(&self.docker_script).unwrap_or_else(bundled_docker_script),
      retry: RetryPolicy {
        attempts: self.upload_attempts,
        delay: self.upload_delay.into(),
      },
    })
  }
}

pub fn cmd_conan_package(args: ConanPackageArgs) -> Result<()> {
  let start = Instant::now();
  let os = host_os()?;
  let inputs = args.into_inputs()?;
  let mut session = session()?;

  let rt = runtime()?;
  let outcome = rt
    .block_on(conan_package::run(&mut session, os, &inputs))
    .context("Conan package failed")?;

  print_success(&format!("Package {} created", outcome.reference));
  if outcome.plan.upload {
    print_stat("Uploaded to", &inputs.remote());
    print_stat("Dispatch", outcome.plan.dispatch());
  } else {
    print_info("Upload skipped");
  }
  print_stat("Duration", &format_duration(start.elapsed()));
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::Parser;
  use std::path::PathBuf;

  #[derive(Parser)]
  struct TestCli {
    #[command(flatten)]
    args: ConanPackageArgs,
  }

  fn parse(extra: &[&str]) -> ConanInputs {
    let mut argv = vec!["cibuild", "--package", "pkg", "--user", "me", "--repository", "repo"];
    argv.extend_from_slice(extra);
    TestCli::try_parse_from(argv).unwrap().args.into_inputs().unwrap()
  }

  #[test]
  fn docker_script_defaults_next_to_executable() {
    let inputs = parse(&[]);
    assert_eq!(inputs.docker_script, bundled_docker_script());
    assert!(inputs.docker_script.is_absolute());
  }

  #[test]
  fn docker_script_input_overrides_default() {
    let inputs = parse(&["--docker-script", "ci/build.sh"]);
    assert_eq!(inputs.docker_script, PathBuf::from("ci/build.sh"));
  }
}
