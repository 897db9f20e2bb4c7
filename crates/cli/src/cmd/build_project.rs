use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Args};

use cibuild_lib::actions::{BuildProjectInputs, build_project};
use cibuild_lib::options::{BuildType, split_flags};
use cibuild_lib::platform::Compiler;

use super::{bool_input, host_os, non_empty_path, runtime, session};
use crate::output::{format_duration, print_stat, print_success};

#[derive(Debug, Args)]
pub struct BuildProjectArgs {
  /// CMake build type
  #[arg(long, env = "INPUT_BUILD-TYPE", default_value_t = BuildType::Release)]
  pub build_type: BuildType,

  /// Extra CMake options for every platform
  #[arg(long, env = "INPUT_OPTIONS", default_value = "", allow_hyphen_values = true)]
  pub options: String,

  /// Extra CMake options on Linux
  #[arg(long, env = "INPUT_LINUX-OPTIONS", default_value = "", allow_hyphen_values = true)]
  pub linux_options: String,

  /// Extra CMake options on macOS
  #[arg(long, env = "INPUT_MACOS-OPTIONS", default_value = "", allow_hyphen_values = true)]
  pub macos_options: String,

  /// Extra CMake options on Windows
  #[arg(long, env = "INPUT_WINDOWS-OPTIONS", default_value = "", allow_hyphen_values = true)]
  pub windows_options: String,

  /// Compiler used on Unix hosts (gcc or clang)
  #[arg(long, env = "INPUT_COMPILER", default_value = "gcc")]
  pub compiler: Compiler,

  /// Project directory, relative to the current directory
  #[arg(long, env = "INPUT_PROJECT-DIR", default_value = "")]
  pub project_dir: String,

  /// Skip the install step
  #[arg(
    long,
    env = "INPUT_SKIP-INSTALL",
    value_parser = bool_input("skip-install"),
    action = ArgAction::Set,
    num_args = 0..=1,
    default_value = "false",
    default_missing_value = "true"
  )]
  pub skip_install: bool,
}

impl BuildProjectArgs {
  fn into_inputs(self) -> BuildProjectInputs {
    BuildProjectInputs {
      build_type: self.build_type,
      options: split_flags(&self.options),
      linux_options: split_flags(&self.linux_options),
      macos_options: split_flags(&self.macos_options),
      windows_options: split_flags(&self.windows_options),
      compiler: self.compiler,
      project_dir: non_empty_path(&self.project_dir),
      skip_install: self.skip_install,
    }
  }
}

pub fn cmd_build_project(args: BuildProjectArgs) -> Result<()> {
  let start = Instant::now();
  let os = host_os()?;
  let inputs = args.into_inputs();
  let mut session = session()?;

  let rt = runtime()?;
  rt.block_on(build_project::run(&mut session, os, &inputs))
    .context("Build failed")?;

  print_success("Project built");
  print_stat("Build type", inputs.build_type.as_str());
  print_stat("Duration", &format_duration(start.elapsed()));
  Ok(())
}
