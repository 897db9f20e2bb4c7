//! Configure, build, install and test a CMake project.

use std::path::{Path, PathBuf};

use tracing::info;

use super::{export_profile, resolve_dir};
use crate::error::ActionError;
use crate::exec::{CommandSpec, Runner};
use crate::options::{BuildConfig, BuildType, toolchain_flag};
use crate::platform::{Compiler, EnvScope, Os, PlatformProfile, resolve};
use crate::session::Session;

/// Parallelism handed to `cmake --build` for the rest of the job.
pub const BUILD_PARALLEL_LEVEL: &str = "2";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildProjectInputs {
  pub build_type: BuildType,
  /// Flags for every platform.
  pub options: Vec<String>,
  pub linux_options: Vec<String>,
  pub macos_options: Vec<String>,
  pub windows_options: Vec<String>,
  pub compiler: Compiler,
  /// Project root relative to the session directory.
  pub project_dir: Option<PathBuf>,
  pub skip_install: bool,
}

impl BuildProjectInputs {
  /// Caller flags for `os`: the shared ones then the OS-specific ones.
  pub fn user_options(&self, os: Os) -> Vec<String> {
    let extra = match os {
      Os::Linux => &self.linux_options,
      Os::MacOs => &self.macos_options,
      Os::Windows => &self.windows_options,
    };
    self.options.iter().chain(extra).cloned().collect()
  }
}

pub async fn run<R: Runner>(session: &mut Session<R>, os: Os, inputs: &BuildProjectInputs) -> Result<(), ActionError> {
  let profile = resolve(os, &inputs.compiler, inputs.build_type, session.host());
  export_profile(session, &profile)?;
  for fixup in profile.path_fixups.iter().filter(|f| f.persist) {
    session.export_fixup(fixup)?;
  }

  let options = BuildConfig::new(inputs.build_type)
    .with_base(toolchain_flag(session.host()))
    .with_platform(profile.cmake_options.iter().cloned())
    .with_user(inputs.user_options(os))
    .assemble();
  session
    .job
    .export_variable("CMAKE_BUILD_PARALLEL_LEVEL", BUILD_PARALLEL_LEVEL)?;

  let project_dir = resolve_dir(session.cwd(), inputs.project_dir.as_deref());
  let build_dir = project_dir.join("build");
  tokio::fs::create_dir_all(&build_dir)
    .await
    .map_err(|e| ActionError::io(&build_dir, e))?;
  info!(dir = %build_dir.display(), build_type = %inputs.build_type, "building project");

  let scope = EnvScope::from_profile(&profile, |name| session.env_var(name));
  session.enter_scope(scope);
  let result = build(session, &profile, inputs, &options, &build_dir).await;
  session.leave_scope();
  result
}

async fn build<R: Runner>(
  session: &mut Session<R>,
  profile: &PlatformProfile,
  inputs: &BuildProjectInputs,
  options: &[String],
  build_dir: &Path,
) -> Result<(), ActionError> {
  let config = inputs.build_type.as_str();

  session.job.start_group("Configure");
  session
    .exec(CommandSpec::new("cmake").arg("..").args(options.iter().cloned()).with_cwd(build_dir))
    .await?;
  session.job.end_group();

  session.job.start_group("Build");
  session
    .exec(
      CommandSpec::new("cmake")
        .args(["--build", ".", "--config", config])
        .with_cwd(build_dir),
    )
    .await?;
  session.job.end_group();

  if !inputs.skip_install {
    session.job.start_group("Install");
    session
      .exec(
        CommandSpec::new("cmake")
          .args(["--build", ".", "--target", "install", "--config", config])
          .with_cwd(build_dir)
          .elevated(profile.sudo_required),
      )
      .await?;
    session.job.end_group();
  }

  session.job.start_group("Test");
  session.exec(test_command(profile.os, inputs.build_type).with_cwd(build_dir)).await?;
  session.job.end_group();

  Ok(())
}

fn test_command(os: Os, build_type: BuildType) -> CommandSpec {
  match os {
    Os::Windows => CommandSpec::new("cmake").args([
      "-E",
      "env",
      "CTEST_OUTPUT_ON_FAILURE=1",
      "cmake",
      "--build",
      ".",
      "--target",
      "RUN_TESTS",
      "--config",
      build_type.as_str(),
    ]),
    Os::Linux | Os::MacOs => CommandSpec::new("ctest").args(["-V", "-C", build_type.as_str()]),
  }
}
