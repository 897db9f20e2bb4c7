//! Source-built GitHub dependencies.
//!
//! Each [`DependencySpec`] goes through clone, configure, build and install,
//! in declaration order. The first failing step aborts the whole run.
//! After the list completes, the processed `path#ref` entries are appended to
//! the `GIT_DEPENDENCIES` manifest exported to the rest of the job.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ActionError;
use crate::exec::{CommandSpec, Runner};
use crate::inputs::DependencySpec;
use crate::options::{BuildConfig, BuildType};
use crate::platform::Os;
use crate::session::Session;

/// Variable holding the dependency manifest.
pub const GIT_DEPENDENCIES: &str = "GIT_DEPENDENCIES";

/// Clone URL prefix for dependency paths.
pub const GITHUB_URL: &str = "https://github.com/";

/// Linux builds out of tree under this directory.
pub const LINUX_BUILD_ROOT: &str = "/tmp/_ci/build";

/// Where dependencies are cloned and built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyLayout {
  /// Directory receiving the clones, at `<workspace>/<owner>/<name>`.
  pub workspace: PathBuf,
  /// Out-of-tree build root; `None` builds in `<clone>/build`.
  pub build_root: Option<PathBuf>,
}

impl DependencyLayout {
  pub fn for_os(os: Os, workspace: &Path) -> Self {
    Self {
      workspace: workspace.to_path_buf(),
      build_root: (os == Os::Linux).then(|| PathBuf::from(LINUX_BUILD_ROOT)),
    }
  }

  pub fn source_dir(&self, spec: &DependencySpec) -> PathBuf {
    dunce::simplified(&self.workspace.join(&spec.path)).to_path_buf()
  }

  pub fn build_dir(&self, spec: &DependencySpec) -> PathBuf {
    match &self.build_root {
      Some(root) => root.join(&spec.path),
      None => self.source_dir(spec).join("build"),
    }
  }
}

/// Clone, configure, build and install one dependency.
///
/// `options` are the flags shared by every dependency; the dependency's own options
/// follow them and the build-type flag comes last.
pub async fn build<R: Runner>(
  session: &mut Session<R>,
  spec: &DependencySpec,
  build_type: BuildType,
  options: &[String],
  sudo_required: bool,
  layout: &DependencyLayout,
) -> Result<(), ActionError> {
  let source_dir = layout.source_dir(spec);
  let build_dir = layout.build_dir(spec);

  info!(path = %spec.path, git_ref = %spec.revision(), "cloning dependency");
  println!("--> Cloning {}", spec.path);
  session
    .exec(
      CommandSpec::new("git")
        .args(["clone", "--recursive"])
        .arg(format!("{}{}", GITHUB_URL, spec.path))
        .arg(&spec.path)
        .with_cwd(&layout.workspace),
    )
    .await?;
  if let Some(git_ref) = &spec.git_ref {
    session
      .exec(CommandSpec::new("git").args(["checkout", git_ref.as_str()]).with_cwd(&source_dir))
      .await?;
  }
  session
    .exec(
      CommandSpec::new("git")
        .args(["submodule", "update", "--init", "--recursive"])
        .with_cwd(&source_dir),
    )
    .await?;

  tokio::fs::create_dir_all(&build_dir)
    .await
    .map_err(|e| ActionError::io(&build_dir, e))?;

  println!("--> Configure {}", spec.path);
  let flags = BuildConfig::new(build_type)
    .with_platform(options.iter().cloned())
    .with_user(spec.options.iter().cloned())
    .assemble();
  session
    .exec(
      CommandSpec::new("cmake")
        .arg(source_dir.to_string_lossy())
        .args(flags)
        .with_cwd(&build_dir),
    )
    .await?;

  println!("--> Building {}", spec.path);
  session
    .exec(
      CommandSpec::new("cmake")
        .args(["--build", ".", "--config", build_type.as_str()])
        .with_cwd(&build_dir),
    )
    .await?;

  println!("--> Install {}", spec.path);
  session
    .exec(
      CommandSpec::new("cmake")
        .args(["--build", ".", "--target", "install", "--config", build_type.as_str()])
        .with_cwd(&build_dir)
        .elevated(sudo_required),
    )
    .await?;

  Ok(())
}

/// Build every dependency in order, then export the updated manifest.
///
/// Returns the exported manifest. An empty list runs nothing and exports the
/// trimmed previous manifest.
pub async fn build_all<R: Runner>(
  session: &mut Session<R>,
  specs: &[DependencySpec],
  build_type: BuildType,
  options: &[String],
  sudo_required: bool,
  layout: &DependencyLayout,
) -> Result<String, ActionError> {
  let mut manifest = session.env_var(GIT_DEPENDENCIES).unwrap_or_default().to_string();

  for spec in specs {
    manifest.push(' ');
    manifest.push_str(&spec.manifest_entry());
    build(session, spec, build_type, options, sudo_required, layout).await?;
  }

  let manifest = manifest.trim().to_string();
  session.job.export_variable(GIT_DEPENDENCIES, &manifest)?;
  Ok(manifest)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::{RecordingRunner, session, session_with_host};
  use tempfile::TempDir;

  fn layout(temp: &TempDir) -> DependencyLayout {
    DependencyLayout {
      workspace: temp.path().to_path_buf(),
      build_root: None,
    }
  }

  #[tokio::test]
  async fn builds_one_dependency_in_order() {
    let temp = TempDir::new().unwrap();
    let mut session = session(RecordingRunner::new(), temp.path());
    let spec = DependencySpec::new("jrl-umi3218/eigen-qld")
      .unwrap()
      .with_ref("v1.2.0")
      .with_options("-DUSE_F2C=ON");
    let options = vec!["-DBUILD_TESTING:BOOL=OFF".to_string()];

    build(&mut session, &spec, BuildType::Release, &options, true, &layout(&temp))
      .await
      .unwrap();

    let source = temp.path().join("jrl-umi3218/eigen-qld");
    assert_eq!(
      session.runner().lines(),
      vec![
        "git clone --recursive https://github.com/jrl-umi3218/eigen-qld jrl-umi3218/eigen-qld".to_string(),
        "git checkout v1.2.0".to_string(),
        "git submodule update --init --recursive".to_string(),
        format!(
          "cmake {} -DBUILD_TESTING:BOOL=OFF -DUSE_F2C=ON -DCMAKE_BUILD_TYPE=Release",
          source.display()
        ),
        "cmake --build . --config Release".to_string(),
        "sudo cmake --build . --target install --config Release".to_string(),
      ]
    );

    let calls = &session.runner().calls;
    assert_eq!(calls[0].cwd.as_deref(), Some(temp.path()));
    assert_eq!(calls[1].cwd.as_deref(), Some(source.as_path()));
    assert_eq!(calls[3].cwd.as_deref(), Some(source.join("build").as_path()));
    assert!(source.join("build").is_dir());
  }

  #[tokio::test]
  async fn default_branch_is_not_checked_out() {
    let temp = TempDir::new().unwrap();
    let mut session = session(RecordingRunner::new(), temp.path());
    let spec = DependencySpec::new("owner/main-only").unwrap();

    let manifest = build_all(&mut session, &[spec], BuildType::Release, &[], false, &layout(&temp))
      .await
      .unwrap();

    assert!(!session.runner().lines().iter().any(|l| l.starts_with("git checkout")));
    assert_eq!(session.runner().calls.len(), 5);
    assert_eq!(manifest, "owner/main-only#master");
  }

  #[tokio::test]
  async fn existing_build_dir_is_reused() {
    let temp = TempDir::new().unwrap();
    let build_root = temp.path().join("_ci/build");
    let layout = DependencyLayout {
      workspace: temp.path().join("work"),
      build_root: Some(build_root.clone()),
    };
    let spec = DependencySpec::new("owner/name").unwrap().with_ref("v1");
    std::fs::create_dir_all(layout.build_dir(&spec)).unwrap();
    let mut session = session(RecordingRunner::new(), temp.path());

    build(&mut session, &spec, BuildType::Release, &[], false, &layout)
      .await
      .unwrap();
    assert_eq!(session.runner().calls.len(), 6);

    // a second run over the same layout succeeds too
    build(&mut session, &spec, BuildType::Release, &[], false, &layout)
      .await
      .unwrap();
    let calls = &session.runner().calls;
    assert_eq!(calls.len(), 12);
    assert_eq!(calls[3].cwd.as_deref(), Some(build_root.join("owner/name").as_path()));
    assert!(build_root.join("owner/name").is_dir());
  }

  #[tokio::test]
  async fn clone_failure_aborts_before_configure() {
    let temp = TempDir::new().unwrap();
    let mut session = session(RecordingRunner::new().fail_on("git clone", 1), temp.path());
    let specs = vec![
      DependencySpec::new("owner/broken").unwrap(),
      DependencySpec::new("owner/never").unwrap(),
    ];

    let err = build_all(&mut session, &specs, BuildType::Debug, &[], false, &layout(&temp))
      .await
      .unwrap_err();

    assert!(matches!(err, ActionError::CommandFailed { .. }));
    assert_eq!(session.runner().calls.len(), 1);
    assert!(!temp.path().join("owner").exists());
    assert!(session.job.exported().get(GIT_DEPENDENCIES).is_none());
  }

  #[tokio::test]
  async fn empty_list_is_a_no_op() {
    let temp = TempDir::new().unwrap();
    let mut session = session(RecordingRunner::new(), temp.path());

    let manifest = build_all(&mut session, &[], BuildType::Release, &[], true, &layout(&temp))
      .await
      .unwrap();

    assert_eq!(manifest, "");
    assert!(session.runner().calls.is_empty());
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    assert_eq!(session.job.exported().get(GIT_DEPENDENCIES).map(String::as_str), Some(""));
  }

  #[tokio::test]
  async fn manifest_appends_to_previous_value() {
    let temp = TempDir::new().unwrap();
    let mut session = session_with_host(RecordingRunner::new(), temp.path(), [(GIT_DEPENDENCIES, "a/b#master")]);
    let specs = vec![
      DependencySpec::new("c/d").unwrap().with_ref("v1"),
      DependencySpec::new("e/f").unwrap(),
    ];

    let manifest = build_all(&mut session, &specs, BuildType::Release, &[], false, &layout(&temp))
      .await
      .unwrap();

    assert_eq!(manifest, "a/b#master c/d#v1 e/f#master");
    // second batch sees the first one's export
    let manifest = build_all(&mut session, &[], BuildType::Release, &[], false, &layout(&temp))
      .await
      .unwrap();
    assert_eq!(manifest, "a/b#master c/d#v1 e/f#master");
  }

  #[tokio::test]
  async fn dependency_options_do_not_leak() {
    let temp = TempDir::new().unwrap();
    let mut session = session(RecordingRunner::new(), temp.path());
    let specs = vec![
      DependencySpec::new("a/first").unwrap().with_options("-DFIRST=ON"),
      DependencySpec::new("a/second").unwrap(),
    ];

    build_all(&mut session, &specs, BuildType::Release, &[], false, &layout(&temp))
      .await
      .unwrap();

    let configures: Vec<_> = session
      .runner()
      .calls
      .iter()
      .filter(|c| c.bin == "cmake" && !c.args.iter().any(|a| a == "--build"))
      .collect();
    assert_eq!(configures.len(), 2);
    assert!(configures[0].args.iter().any(|a| a == "-DFIRST=ON"));
    assert!(!configures[1].args.iter().any(|a| a == "-DFIRST=ON"));
  }

  #[test]
  fn linux_builds_out_of_tree() {
    let layout = DependencyLayout::for_os(Os::Linux, Path::new("/work"));
    let spec = DependencySpec::new("owner/name").unwrap();

    assert_eq!(layout.build_dir(&spec), PathBuf::from("/tmp/_ci/build/owner/name"));
    assert_eq!(layout.source_dir(&spec), PathBuf::from("/work/owner/name"));

    let layout = DependencyLayout::for_os(Os::MacOs, Path::new("/work"));
    assert_eq!(layout.build_dir(&spec), PathBuf::from("/work/owner/name/build"));
  }
}
