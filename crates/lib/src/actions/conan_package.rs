//! Create a Conan package and upload it to the project's remote.

use std::path::{Path, PathBuf};

use tracing::info;

use super::resolve_dir;
use crate::conan::{Reference, ReleasePlan, RetryPolicy, bintray_remote, plan_release, recipe, upload_with_retry};
use crate::error::ActionError;
use crate::exec::{CommandSpec, Runner};
use crate::options::BuildType;
use crate::platform::Os;
use crate::session::Session;

/// Script fanning the build out to one docker image.
pub const DOCKER_SCRIPT: &str = "docker-and-build.sh";

/// The fan-out script shipped next to the running executable.
pub fn bundled_docker_script() -> PathBuf {
  std::env::current_exe()
    .ok()
    .and_then(|exe| exe.parent().map(|dir| dir.join(DOCKER_SCRIPT)))
    .unwrap_or_else(|| PathBuf::from(DOCKER_SCRIPT))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConanInputs {
  pub package: String,
  pub user: String,
  pub repository: String,
  /// Overrides the default remote derived from `user` and `repository`.
  pub remote: Option<String>,
  pub stable_channel: String,
  pub dev_channel: String,
  pub with_build_type: bool,
  pub force_upload: bool,
  pub working_directory: Option<PathBuf>,
  pub api_key: String,
  /// Package version; read from the recipe when absent.
  pub version: Option<String>,
  pub with_docker: bool,
  pub docker_images: Vec<String>,
  /// Fan-out script, run from its own directory.
  pub docker_script: PathBuf,
  pub retry: RetryPolicy,
}

impl ConanInputs {
  pub fn remote(&self) -> String {
    self
      .remote
      .clone()
      .filter(|r| !r.is_empty())
      .unwrap_or_else(|| bintray_remote(&self.user, &self.repository))
  }
}

/// What a package run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConanOutcome {
  pub reference: Reference,
  pub plan: ReleasePlan,
}

pub async fn run<R: Runner>(session: &mut Session<R>, os: Os, inputs: &ConanInputs) -> Result<ConanOutcome, ActionError> {
  session.job.add_mask(&inputs.api_key);
  let remote = inputs.remote();

  session.job.start_group("Install and setup conan");
  setup(session, os, &inputs.repository, &remote).await?;
  session.job.end_group();

  let dir = resolve_dir(session.cwd(), inputs.working_directory.as_deref());

  session.job.start_group("Set build and upload parameters");
  let trigger = session.trigger();
  let plan = plan_release(&trigger, inputs.force_upload);
  if plan.checkout_latest_tag {
    checkout_latest_tag(session, &dir).await?;
  }
  let version = match inputs.version.as_deref().filter(|v| !v.is_empty()) {
    Some(version) => version.to_string(),
    None => recipe::extract_version(&recipe::read(&dir).await?).ok_or_else(|| ActionError::MissingVersion {
      recipe: dir.join(recipe::RECIPE_FILE),
    })?,
  };
  let channel = plan.channel(&inputs.stable_channel, &inputs.dev_channel).to_string();
  recipe::rewrite_file(
    &dir,
    &inputs.repository,
    &inputs.stable_channel,
    &inputs.dev_channel,
    &channel,
  )
  .await?;
  session
    .exec(CommandSpec::new("conan").args(["info", "."]).with_cwd(&dir))
    .await?;
  let reference = Reference {
    package: inputs.package.clone(),
    version,
    repository: inputs.repository.clone(),
    channel,
  };
  info!(channel = %reference.channel, upload = plan.upload, version = %reference.version, "package parameters");
  println!("Package channel: {}", reference.channel);
  println!("Package upload: {}", plan.upload);
  println!("Package version: {}", reference.version);
  session.job.end_group();

  session.job.start_group("Create conan package");
  let create = CommandSpec::new("conan")
    .args(["create", "."])
    .arg(reference.user_channel())
    .with_cwd(&dir);
  if inputs.with_build_type {
    for build_type in [BuildType::Release, BuildType::Debug] {
      session
        .exec(create.clone().args(["-s".to_string(), format!("build_type={}", build_type.as_str())]))
        .await?;
    }
  } else {
    session.exec(create).await?;
  }
  session.job.end_group();

  if plan.upload {
    session.job.start_group("Upload conan package");
    upload(session, inputs, &reference, &dir).await?;
    session.job.end_group();
  }
  session.job.set_output("dispatch", plan.dispatch())?;

  if inputs.with_docker {
    docker_fan_out(session, inputs, &remote, &reference, plan).await?;
  }

  Ok(ConanOutcome { reference, plan })
}

async fn setup<R: Runner>(session: &mut Session<R>, os: Os, repository: &str, remote: &str) -> Result<(), ActionError> {
  let linux = os == Os::Linux;
  if linux {
    session
      .exec(CommandSpec::new("apt").args(["install", "-y", "python3-setuptools"]).elevated(true))
      .await?;
    session
      .exec(
        CommandSpec::new("apt")
          .args(["remove", "-y", "python3-jwt", "python3-jinja2"])
          .elevated(true),
      )
      .await?;
  }
  session
    .exec(CommandSpec::new("pip3").args(["install", "conan"]).elevated(linux))
    .await?;
  // already registered on reused runners
  session
    .exec_unchecked(CommandSpec::new("conan").args(["remote", "add", repository, remote]))
    .await?;
  if linux {
    session
      .exec_unchecked(CommandSpec::new("conan").args(["profile", "new", "default", "--detect"]))
      .await?;
    session
      .exec(CommandSpec::new("conan").args([
        "profile",
        "update",
        "settings.compiler.libcxx=libstdc++11",
        "default",
      ]))
      .await?;
  }
  Ok(())
}

async fn checkout_latest_tag<R: Runner>(session: &mut Session<R>, dir: &Path) -> Result<(), ActionError> {
  let tags = session
    .exec_output(
      CommandSpec::new("git")
        .args(["tag", "--sort=committerdate", "--list", "v[0-9]*"])
        .with_cwd(dir),
    )
    .await?;
  let tag = tags
    .lines()
    .map(str::trim)
    .rfind(|t| !t.is_empty())
    .ok_or(ActionError::NoReleaseTag)?
    .to_string();
  info!(tag = %tag, "building latest release tag");

  session
    .exec(CommandSpec::new("git").args(["checkout", tag.as_str()]).with_cwd(dir))
    .await?;
  session
    .exec(CommandSpec::new("git").args(["submodule", "sync"]).with_cwd(dir))
    .await?;
  session
    .exec(CommandSpec::new("git").args(["submodule", "update", "--init"]).with_cwd(dir))
    .await?;
  Ok(())
}

async fn upload<R: Runner>(
  session: &mut Session<R>,
  inputs: &ConanInputs,
  reference: &Reference,
  dir: &Path,
) -> Result<(), ActionError> {
  session
    .exec(CommandSpec::new("conan").args([
      "user",
      "-p",
      inputs.api_key.as_str(),
      "-r",
      inputs.repository.as_str(),
      inputs.user.as_str(),
    ]))
    .await?;
  let latest = reference.latest();
  session
    .exec(
      CommandSpec::new("conan")
        .arg("alias")
        .arg(latest.to_string())
        .arg(reference.to_string())
        .with_cwd(dir),
    )
    .await?;
  for target in [reference, &latest] {
    let cmd = CommandSpec::new("conan")
      .arg("upload")
      .arg(target.to_string())
      .arg("--all")
      .arg(format!("-r={}", inputs.repository))
      .with_cwd(dir);
    upload_with_retry(session, cmd, inputs.retry).await?;
  }
  Ok(())
}

async fn docker_fan_out<R: Runner>(
  session: &mut Session<R>,
  inputs: &ConanInputs,
  remote: &str,
  reference: &Reference,
  plan: ReleasePlan,
) -> Result<(), ActionError> {
  let repo = session.trigger().repo_name().to_string();
  let working_repo = match &inputs.working_directory {
    Some(dir) => format!("{}/{}", repo, dir.display()),
    None => repo.clone(),
  };
  let upload = plan.upload.to_string();
  let exports = [
    ("REPO", repo.as_str()),
    ("WORKING_REPO", working_repo.as_str()),
    ("CONAN_REPOSITORY", reference.repository.as_str()),
    ("CONAN_REMOTE", remote),
    ("CONAN_PACKAGE", reference.package.as_str()),
    ("CONAN_PACKAGE_VERSION", reference.version.as_str()),
    ("CONAN_CHANNEL", reference.channel.as_str()),
    ("CONAN_UPLOAD", upload.as_str()),
    ("CONAN_USER", inputs.user.as_str()),
    ("BINTRAY_API_KEY", inputs.api_key.as_str()),
  ];
  for (name, value) in exports {
    session.job.export_variable(name, value)?;
  }

  let script = resolve_dir(session.cwd(), Some(inputs.docker_script.as_path()));
  let script_dir = script.parent().map(Path::to_path_buf).unwrap_or_else(|| session.cwd().to_path_buf());
  for image in &inputs.docker_images {
    session.job.start_group(&format!("Build conan package on {}", image));
    session
      .exec(
        CommandSpec::new(script.to_string_lossy())
          .arg(image.as_str())
          .with_cwd(&script_dir),
      )
      .await?;
    session.job.end_group();
  }
  Ok(())
}
