use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;

use cibuild_lib::actions::{InstallDepsInputs, install_deps};
use cibuild_lib::inputs::{DependencyBlock, parse_github_list};
use cibuild_lib::options::BuildType;
use cibuild_lib::platform::{Compiler, Os};

use super::{host_os, runtime, session};
use crate::output::{format_duration, print_stat, print_success};

#[derive(Debug, Args)]
pub struct InstallDepsArgs {
  /// Build type for GitHub dependencies
  #[arg(long, env = "INPUT_BUILD-TYPE", default_value_t = BuildType::Release)]
  pub build_type: BuildType,

  /// Compiler used on Linux (gcc or clang)
  #[arg(long, env = "INPUT_COMPILER", default_value = "gcc")]
  pub compiler: Compiler,

  /// Linux dependencies (YAML: apt, ppa, pip, github)
  #[arg(long, env = "INPUT_UBUNTU", default_value = "")]
  pub ubuntu: String,

  /// macOS dependencies (YAML: brew, pip, github)
  #[arg(long, env = "INPUT_MACOS", default_value = "")]
  pub macos: String,

  /// Windows dependencies (YAML: choco, pip, github)
  #[arg(long, env = "INPUT_WINDOWS", default_value = "")]
  pub windows: String,

  /// GitHub dependencies for every platform (YAML list of path, ref, options)
  #[arg(long, env = "INPUT_GITHUB", default_value = "")]
  pub github: String,
}

impl InstallDepsArgs {
  /// Parse the block for `os` and the shared list; other blocks are ignored.
  fn into_inputs(self, os: Os) -> Result<InstallDepsInputs> {
    let block = match os {
      Os::Linux => &self.ubuntu,
      Os::MacOs => &self.macos,
      Os::Windows => &self.windows,
    };
    Ok(InstallDepsInputs {
      build_type: self.build_type,
      compiler: self.compiler,
      block: DependencyBlock::parse(os, block)?,
      github: parse_github_list(&self.github)?,
    })
  }
}

pub fn cmd_install_deps(args: InstallDepsArgs) -> Result<()> {
  let start = Instant::now();
  let os = host_os()?;
  let inputs = args.into_inputs(os)?;
  let mut session = session()?;

  let rt = runtime()?;
  rt.block_on(install_deps::run(&mut session, &inputs))
    .context("Installing dependencies failed")?;

  let built = inputs.block.github().len() + inputs.github.len();
  print_success("Dependencies installed");
  print_stat("Package manager", os.package_manager());
  print_stat("GitHub dependencies", &built.to_string());
  print_stat("Duration", &format_duration(start.elapsed()));
  Ok(())
}
