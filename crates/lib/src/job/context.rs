//! What triggered the current run.

use std::collections::BTreeMap;

/// Trigger context of the run, read from the CI platform's variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trigger {
  /// Fully qualified git ref, e.g. `refs/tags/v1.2.0`.
  pub git_ref: String,
  /// Name of the action or dispatch that started the run.
  pub action: String,
  /// `owner/name` of the repository being built.
  pub repository: String,
}

impl Trigger {
  /// Read `GITHUB_REF`, `GITHUB_ACTION` and `GITHUB_REPOSITORY`.
  pub fn from_vars(vars: &BTreeMap<String, String>) -> Self {
    let var = |name: &str| vars.get(name).cloned().unwrap_or_default();
    Self {
      git_ref: var("GITHUB_REF"),
      action: var("GITHUB_ACTION"),
      repository: var("GITHUB_REPOSITORY"),
    }
  }

  pub fn is_tag(&self) -> bool {
    self.git_ref.starts_with("refs/tags/")
  }

  pub fn is_master(&self) -> bool {
    self.git_ref == "refs/heads/master"
  }

  /// Repository name without its owner.
  pub fn repo_name(&self) -> &str {
    self
      .repository
      .rsplit_once('/')
      .map(|(_, name)| name)
      .unwrap_or(&self.repository)
  }
}
