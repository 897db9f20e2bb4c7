//! CLI smoke tests for cibuild.
//!
//! These tests verify that the commands parse their inputs, report failures
//! through the CI protocol, and drive external tools in order.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

/// Get a Command for the cibuild binary, detached from any CI job.
fn cibuild_cmd() -> Command {
  let mut cmd = cargo_bin_cmd!("cibuild");
  for var in [
    "GITHUB_ENV",
    "GITHUB_OUTPUT",
    "GITHUB_REF",
    "GITHUB_ACTION",
    "INPUT_PACKAGE",
    "INPUT_USER",
    "INPUT_REPOSITORY",
  ] {
    cmd.env_remove(var);
  }
  cmd
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  cibuild_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  cibuild_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("cibuild"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["build-project", "conan-package", "install-deps", "info"] {
    cibuild_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

#[test]
fn unknown_build_type_is_rejected() {
  cibuild_cmd()
    .args(["build-project", "--build-type", "Fastest"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Fastest"));
}

#[test]
fn invalid_boolean_names_the_input() {
  cibuild_cmd()
    .args(["build-project", "--skip-install", "maybe"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("input 'skip-install'"));
}

// =============================================================================
// info
// =============================================================================

#[test]
fn info_prints_profile() {
  cibuild_cmd()
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("Package manager"));
}

#[test]
fn info_json_is_parseable() {
  let output = cibuild_cmd()
    .args(["info", "--format", "json", "--build-type", "Debug"])
    .output()
    .unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["build_type"], "Debug");
  assert!(json["profile"]["cmake_options"].is_array());
}

// =============================================================================
// failures
// =============================================================================

#[test]
fn invalid_dependency_yaml_fails_the_job() {
  let temp = TempDir::new().unwrap();

  cibuild_cmd()
    .current_dir(temp.path())
    .arg("install-deps")
    .args(["--ubuntu", "apt: [unclosed"])
    .args(["--macos", "brew: [unclosed"])
    .args(["--windows", "choco: [unclosed"])
    .assert()
    .failure()
    .stdout(predicate::str::contains("::error::"));
}

#[test]
fn missing_package_input_fails() {
  let temp = TempDir::new().unwrap();

  cibuild_cmd()
    .current_dir(temp.path())
    .arg("conan-package")
    .assert()
    .failure()
    .stderr(predicate::str::contains("input 'package' is required"));
}

#[test]
#[serial]
fn inputs_fall_back_to_environment() {
  let temp = TempDir::new().unwrap();

  cibuild_cmd()
    .current_dir(temp.path())
    .arg("conan-package")
    .env("INPUT_PACKAGE", "SpaceVecAlg")
    .env("INPUT_USER", "gergondet")
    .env("INPUT_REPOSITORY", "")
    .assert()
    .failure()
    .stderr(predicate::str::contains("input 'repository' is required"));
}

// =============================================================================
// build-project
// =============================================================================

#[cfg(target_os = "linux")]
mod linux {
  use super::*;
  use std::os::unix::fs::PermissionsExt;
  use std::path::Path;

  /// Install a fake tool that logs its arguments to `calls.log`.
  fn fake_tool(bin: &Path, name: &str) {
    let path = bin.join(name);
    let script = format!(
      "#!/bin/sh\necho \"{} $*\" >> \"{}\"\n",
      name,
      bin.join("calls.log").display()
    );
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  }

  #[test]
  #[serial]
  fn build_project_drives_cmake_and_ctest() {
    let temp = TempDir::new().unwrap();
    let bin = temp.path().join("bin");
    let project = temp.path().join("project");
    std::fs::create_dir_all(&bin).unwrap();
    std::fs::create_dir_all(&project).unwrap();
    fake_tool(&bin, "cmake");
    fake_tool(&bin, "ctest");
    let path = format!("{}:{}", bin.display(), std::env::var("PATH").unwrap_or_default());
    let env_file = temp.path().join("github_env");

    cibuild_cmd()
      .current_dir(&project)
      .env("PATH", path)
      .env("GITHUB_ENV", &env_file)
      .args(["build-project", "--skip-install", "--options", "-DFOO=ON"])
      .assert()
      .success()
      .stdout(predicate::str::contains("::group::Configure"))
      .stdout(predicate::str::contains("Project built"));

    let calls = std::fs::read_to_string(bin.join("calls.log")).unwrap();
    let lines: Vec<_> = calls.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("cmake .. "));
    assert!(lines[0].contains("-DFOO=ON"));
    assert!(lines[0].ends_with("-DCMAKE_BUILD_TYPE=Release"));
    assert_eq!(lines[1], "cmake --build . --config Release");
    assert_eq!(lines[2], "ctest -V -C Release");
    assert!(project.join("build").is_dir());

    let exported = std::fs::read_to_string(&env_file).unwrap();
    assert!(exported.contains("CMAKE_BUILD_PARALLEL_LEVEL<<"));
  }

  #[test]
  #[serial]
  fn failing_step_reports_error() {
    let temp = TempDir::new().unwrap();
    let bin = temp.path().join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    let cmake = bin.join("cmake");
    std::fs::write(&cmake, "#!/bin/sh\nexit 2\n").unwrap();
    std::fs::set_permissions(&cmake, std::fs::Permissions::from_mode(0o755)).unwrap();
    let path = format!("{}:{}", bin.display(), std::env::var("PATH").unwrap_or_default());

    cibuild_cmd()
      .current_dir(temp.path())
      .env("PATH", path)
      .args(["build-project", "--skip-install"])
      .assert()
      .failure()
      .stdout(predicate::str::contains("::error::"))
      .stderr(predicate::str::contains("exit code Some(2)"));
  }
}
