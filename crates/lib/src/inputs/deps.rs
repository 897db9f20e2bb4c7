use serde::{Deserialize, Deserializer, Serialize};

use super::{InputError, parse_yaml};
use crate::options::split_flags;
use crate::platform::Os;

/// Revision recorded in the manifest when a dependency does not name one.
pub const DEFAULT_REF: &str = "master";

/// A GitHub-hosted CMake project built from source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDependency")]
pub struct DependencySpec {
  /// `owner/name` on GitHub; also the clone directory.
  pub path: String,
  /// Branch, tag or commit to build; `None` builds the default branch.
  #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
  pub git_ref: Option<String>,
  /// Extra CMake flags for this dependency only.
  pub options: Vec<String>,
}

impl DependencySpec {
  pub fn new(path: &str) -> Result<Self, InputError> {
    RawDependency {
      path: path.to_string(),
      git_ref: None,
      options: None,
    }
    .try_into()
  }

  pub fn with_ref(mut self, git_ref: &str) -> Self {
    self.git_ref = Some(git_ref.to_string());
    self
  }

  /// The declared ref, or [`DEFAULT_REF`].
  pub fn revision(&self) -> &str {
    self.git_ref.as_deref().unwrap_or(DEFAULT_REF)
  }

  pub fn with_options(mut self, options: &str) -> Self {
    self.options = split_flags(options);
    self
  }

  /// `path#ref`, the entry recorded in the dependency manifest.
  pub fn manifest_entry(&self) -> String {
    format!("{}#{}", self.path, self.revision())
  }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDependency {
  path: String,
  #[serde(rename = "ref", default)]
  git_ref: Option<String>,
  #[serde(default)]
  options: Option<String>,
}

impl TryFrom<RawDependency> for DependencySpec {
  type Error = InputError;

  fn try_from(raw: RawDependency) -> Result<Self, Self::Error> {
    let path = raw.path.trim().trim_matches('/').to_string();
    let valid = matches!(path.split_once('/'), Some((owner, name))
      if !owner.is_empty() && !name.is_empty() && !name.contains('/'));
    if !valid {
      return Err(InputError::DependencyPath { path: raw.path });
    }

    let git_ref = raw
      .git_ref
      .map(|r| r.trim().to_string())
      .filter(|r| !r.is_empty());

    Ok(Self {
      path,
      git_ref,
      options: raw.options.as_deref().map(split_flags).unwrap_or_default(),
    })
  }
}

/// Parse the top-level `github` input: a YAML list of dependencies.
pub fn parse_github_list(source: &str) -> Result<Vec<DependencySpec>, InputError> {
  parse_yaml("github", source)
}

/// A package name as YAML may type it: `pip: [numpy, 3]` or `apt: true`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Word {
  Text(String),
  Bool(bool),
  Int(i64),
  Float(f64),
}

impl Word {
  fn into_string(self) -> String {
    match self {
      Word::Text(s) => s,
      Word::Bool(b) => b.to_string(),
      Word::Int(n) => n.to_string(),
      Word::Float(f) => f.to_string(),
    }
  }
}

/// Package lists accept either a space-separated string or a YAML sequence.
fn words<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Words {
    One(Word),
    Many(Vec<Word>),
  }

  let items = match Option::<Words>::deserialize(deserializer)? {
    None => Vec::new(),
    Some(Words::One(word)) => vec![word.into_string()],
    Some(Words::Many(items)) => items.into_iter().map(Word::into_string).collect(),
  };
  Ok(
    items
      .iter()
      .flat_map(|item| item.split_whitespace())
      .map(str::to_string)
      .collect(),
  )
}

/// The `ubuntu` input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UbuntuDeps {
  #[serde(default, deserialize_with = "words")]
  pub apt: Vec<String>,
  /// PPAs added before installing; when present they replace the plain `apt-get update`.
  #[serde(default, deserialize_with = "words")]
  pub ppa: Vec<String>,
  #[serde(default, deserialize_with = "words")]
  pub pip: Vec<String>,
  #[serde(default)]
  pub github: Vec<DependencySpec>,
}

/// The `macos` input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MacOsDeps {
  #[serde(default, deserialize_with = "words")]
  pub brew: Vec<String>,
  #[serde(default, deserialize_with = "words")]
  pub pip: Vec<String>,
  #[serde(default)]
  pub github: Vec<DependencySpec>,
}

/// The `windows` input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowsDeps {
  #[serde(default, deserialize_with = "words")]
  pub choco: Vec<String>,
  #[serde(default, deserialize_with = "words")]
  pub pip: Vec<String>,
  #[serde(default)]
  pub github: Vec<DependencySpec>,
}

/// Dependencies declared for the host OS.
///
/// Only the block matching the host is parsed; each variant rejects fields
/// belonging to another platform's package manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyBlock {
  Ubuntu(UbuntuDeps),
  MacOs(MacOsDeps),
  Windows(WindowsDeps),
}

impl DependencyBlock {
  /// Parse the block input for `os` (see [`Os::dependency_input`]).
  pub fn parse(os: Os, source: &str) -> Result<Self, InputError> {
    let name = os.dependency_input();
    Ok(match os {
      Os::Linux => DependencyBlock::Ubuntu(parse_yaml(name, source)?),
      Os::MacOs => DependencyBlock::MacOs(parse_yaml(name, source)?),
      Os::Windows => DependencyBlock::Windows(parse_yaml(name, source)?),
    })
  }

  pub fn os(&self) -> Os {
    match self {
      DependencyBlock::Ubuntu(_) => Os::Linux,
      DependencyBlock::MacOs(_) => Os::MacOs,
      DependencyBlock::Windows(_) => Os::Windows,
    }
  }

  pub fn github(&self) -> &[DependencySpec] {
    match self {
      DependencyBlock::Ubuntu(deps) => &deps.github,
      DependencyBlock::MacOs(deps) => &deps.github,
      DependencyBlock::Windows(deps) => &deps.github,
    }
  }

  pub fn pip(&self) -> &[String] {
    match self {
      DependencyBlock::Ubuntu(deps) => &deps.pip,
      DependencyBlock::MacOs(deps) => &deps.pip,
      DependencyBlock::Windows(deps) => &deps.pip,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dependency_defaults_to_master() {
    let deps = parse_github_list("- path: jrl-umi3218/eigen-qld\n").unwrap();

    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].path, "jrl-umi3218/eigen-qld");
    assert_eq!(deps[0].git_ref, None);
    assert_eq!(deps[0].revision(), "master");
    assert!(deps[0].options.is_empty());
    assert_eq!(deps[0].manifest_entry(), "jrl-umi3218/eigen-qld#master");
  }

  #[test]
  fn dependency_ref_and_options() {
    let source = r#"
- path: jrl-umi3218/SpaceVecAlg
  ref: v1.1.0
  options: -DBUILD_TESTING=OFF -DNAME="with space"
- path: humanoid-path-planner/hpp-spline
  ref: ""
"#;
    let deps = parse_github_list(source).unwrap();

    assert_eq!(deps[0].git_ref.as_deref(), Some("v1.1.0"));
    assert_eq!(deps[0].options, vec!["-DBUILD_TESTING=OFF", "-DNAME=with space"]);
    assert_eq!(deps[1].git_ref, None);
    assert_eq!(deps[1].manifest_entry(), "humanoid-path-planner/hpp-spline#master");
  }

  #[test]
  fn dependency_path_must_be_owner_and_name() {
    for path in ["eigen-qld", "a/b/c", "/name", "owner/"] {
      let err = DependencySpec::new(path).unwrap_err();
      assert!(matches!(err, InputError::DependencyPath { .. }), "{path}");
    }
    assert_eq!(DependencySpec::new("/owner/name/").unwrap().path, "owner/name");
  }

  #[test]
  fn invalid_path_in_yaml_is_reported() {
    let err = parse_github_list("- path: not-a-repo\n").unwrap_err();
    assert!(err.to_string().contains("github"));
  }

  #[test]
  fn empty_github_input_is_empty_list() {
    assert!(parse_github_list("").unwrap().is_empty());
    assert!(parse_github_list("null").unwrap().is_empty());
  }

  #[test]
  fn ubuntu_block_accepts_strings_and_lists() {
    let source = r#"
apt: libboost-all-dev doxygen
ppa: [pierre-gergondet+ppa/multi-contact-unstable]
pip: [Cython, "coverage nose"]
github:
  - path: jrl-umi3218/Eigen3ToPython
"#;
    let block = DependencyBlock::parse(Os::Linux, source).unwrap();

    let DependencyBlock::Ubuntu(deps) = &block else {
      panic!("expected ubuntu block");
    };
    assert_eq!(deps.apt, vec!["libboost-all-dev", "doxygen"]);
    assert_eq!(deps.ppa, vec!["pierre-gergondet+ppa/multi-contact-unstable"]);
    assert_eq!(block.pip(), &["Cython", "coverage", "nose"]);
    assert_eq!(block.github().len(), 1);
    assert_eq!(block.os(), Os::Linux);
  }

  #[test]
  fn package_lists_accept_scalar_items() {
    let block = DependencyBlock::parse(Os::Linux, "apt: true\npip: [numpy, 3, 1.5, false]\n").unwrap();

    let DependencyBlock::Ubuntu(deps) = &block else {
      panic!("expected ubuntu block");
    };
    assert_eq!(deps.apt, vec!["true"]);
    assert_eq!(deps.pip, vec!["numpy", "3", "1.5", "false"]);
  }

  #[test]
  fn blank_block_is_default() {
    assert_eq!(
      DependencyBlock::parse(Os::MacOs, "").unwrap(),
      DependencyBlock::MacOs(MacOsDeps::default())
    );
  }

  #[test]
  fn block_rejects_other_platform_fields() {
    let err = DependencyBlock::parse(Os::Windows, "apt: cmake\n").unwrap_err();
    assert!(matches!(err, InputError::Yaml { ref name, .. } if name == "windows"));
  }
}
