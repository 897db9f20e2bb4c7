//! Host environment snapshot and the scoped overlay applied to child processes.

use std::collections::BTreeMap;

use super::profile::PlatformProfile;

/// Snapshot of the process environment taken once at startup.
///
/// Actions read variables such as `PATH` or `BOOST_ROOT` from this snapshot
/// instead of the live process environment, which is never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEnv {
  vars: BTreeMap<String, String>,
}

impl HostEnv {
  /// Capture the current process environment.
  pub fn capture() -> Self {
    Self {
      vars: std::env::vars().collect(),
    }
  }

  pub fn from_pairs<I, K, V>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    Self {
      vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
    }
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.vars.get(name).map(String::as_str)
  }

  /// Value of `name`, treating an empty value as unset.
  pub fn non_empty(&self, name: &str) -> Option<&str> {
    self.get(name).filter(|v| !v.is_empty())
  }

  pub fn vars(&self) -> &BTreeMap<String, String> {
    &self.vars
  }
}

/// Variables overridden for the duration of one action run.
///
/// Built from a [`PlatformProfile`]'s scoped path fix-ups. The overlay is
/// layered on every child process while the scope is active and simply
/// dropped when the run ends, which restores the original values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvScope {
  vars: BTreeMap<String, String>,
}

impl EnvScope {
  /// Apply the profile's scoped fix-ups to the current values returned by `lookup`.
  pub fn from_profile<'a>(profile: &PlatformProfile, lookup: impl Fn(&str) -> Option<&'a str>) -> Self {
    let vars = profile
      .path_fixups
      .iter()
      .filter(|fixup| !fixup.persist)
      .map(|fixup| {
        let current = lookup(&fixup.variable).unwrap_or_default();
        (fixup.variable.clone(), fixup.apply(current))
      })
      .collect();
    Self { vars }
  }

  pub fn vars(&self) -> &BTreeMap<String, String> {
    &self.vars
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.vars.get(name).map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.vars.is_empty()
  }
}
