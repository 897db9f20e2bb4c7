//! Install system packages and source-built dependencies.
//!
//! The host's block (`ubuntu`, `macos` or `windows`) decides which package
//! manager runs. GitHub dependencies from the block are built first, then the
//! top-level `github` list.

use tracing::info;

use super::export_profile;
use crate::deps::{DependencyLayout, build_all};
use crate::error::ActionError;
use crate::exec::{CommandSpec, Runner};
use crate::inputs::{DependencyBlock, DependencySpec, MacOsDeps, UbuntuDeps, WindowsDeps};
use crate::options::BuildType;
use crate::platform::{Compiler, boost_library_fixup, resolve};
use crate::session::Session;

/// Flag shared by every dependency build.
pub const NO_TESTING_FLAG: &str = "-DBUILD_TESTING:BOOL=OFF";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallDepsInputs {
  pub build_type: BuildType,
  pub compiler: Compiler,
  /// Block for the host OS.
  pub block: DependencyBlock,
  /// Top-level `github` list.
  pub github: Vec<DependencySpec>,
}

pub async fn run<R: Runner>(session: &mut Session<R>, inputs: &InstallDepsInputs) -> Result<(), ActionError> {
  let os = inputs.block.os();
  let profile = resolve(os, &inputs.compiler, inputs.build_type, session.host());
  info!(os = %os, "installing dependencies");

  match &inputs.block {
    DependencyBlock::Ubuntu(deps) => {
      session.job.export_variable("BOOST_ROOT", "")?;
      session.job.export_variable("BOOST_ROOT_1_69_0", "")?;
      export_profile(session, &profile)?;
      let mut apt = deps.apt.clone();
      apt.extend(profile.compiler_packages().iter().map(|p| p.to_string()));
      install_ubuntu(session, deps, &apt).await?;
    }
    DependencyBlock::MacOs(deps) => {
      export_profile(session, &profile)?;
      install_macos(session, deps).await?;
    }
    DependencyBlock::Windows(deps) => {
      if let Some(fixup) = boost_library_fixup(session.host()) {
        session.export_fixup(&fixup)?;
      }
      install_windows(session, deps).await?;
    }
  }

  let mut options = vec![NO_TESTING_FLAG.to_string()];
  options.extend(profile.cmake_options.iter().cloned());
  let layout = DependencyLayout::for_os(os, session.cwd());

  for specs in [inputs.block.github(), inputs.github.as_slice()] {
    build_all(
      session,
      specs,
      inputs.build_type,
      &options,
      profile.sudo_required,
      &layout,
    )
    .await?;
  }
  Ok(())
}

async fn install_ubuntu<R: Runner>(session: &mut Session<R>, deps: &UbuntuDeps, apt: &[String]) -> Result<(), ActionError> {
  if deps.ppa.is_empty() {
    session
      .exec(CommandSpec::new("apt-get").arg("update").elevated(true))
      .await?;
  }
  for ppa in &deps.ppa {
    session
      .exec(
        CommandSpec::new("add-apt-repository")
          .args(["-y".to_string(), format!("ppa:{}", ppa)])
          .elevated(true),
      )
      .await?;
  }
  if !apt.is_empty() {
    session
      .exec(
        CommandSpec::new("apt-get")
          .args(["install", "-y"])
          .args(apt.iter().cloned())
          .elevated(true),
      )
      .await?;
  }
  pip_install(session, &deps.pip).await
}

async fn install_macos<R: Runner>(session: &mut Session<R>, deps: &MacOsDeps) -> Result<(), ActionError> {
  if !deps.brew.is_empty() {
    session
      .exec(CommandSpec::new("brew").arg("install").args(deps.brew.iter().cloned()))
      .await?;
  }
  pip_install(session, &deps.pip).await
}

async fn install_windows<R: Runner>(session: &mut Session<R>, deps: &WindowsDeps) -> Result<(), ActionError> {
  if !deps.choco.is_empty() {
    session
      .exec(
        CommandSpec::new("choco")
          .arg("install")
          .args(deps.choco.iter().cloned())
          .arg("-y"),
      )
      .await?;
  }
  if !deps.pip.is_empty() {
    session
      .exec(CommandSpec::new("pip").arg("install").args(deps.pip.iter().cloned()))
      .await?;
  }
  Ok(())
}

/// Unix hosts install Python packages for both interpreters, as root.
async fn pip_install<R: Runner>(session: &mut Session<R>, packages: &[String]) -> Result<(), ActionError> {
  if packages.is_empty() {
    return Ok(());
  }
  for pip in ["pip", "pip3"] {
    session
      .exec(
        CommandSpec::new(pip)
          .arg("install")
          .args(packages.iter().cloned())
          .elevated(true),
      )
      .await?;
  }
  Ok(())
}
