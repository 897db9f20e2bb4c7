use std::fmt;

use serde::Serialize;

/// Host operating systems an action can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// Detect the host operating system at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Returns the lowercase identifier used in per-OS input names
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "macos",
      Self::Windows => "windows",
    }
  }

  /// Name of the per-OS dependency block input (`ubuntu`, `macos`, `windows`)
  pub fn dependency_input(&self) -> &'static str {
    match self {
      Self::Linux => "ubuntu",
      Self::MacOs => "macos",
      Self::Windows => "windows",
    }
  }

  /// Native package manager used to install system packages
  pub fn package_manager(&self) -> &'static str {
    match self {
      Self::Linux => "apt-get",
      Self::MacOs => "brew",
      Self::Windows => "choco",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn current_returns_supported_os() {
    assert!(Os::current().is_some(), "Current OS should be supported");
  }

  #[test]
  fn linux_dependencies_come_from_ubuntu_block() {
    assert_eq!(Os::Linux.dependency_input(), "ubuntu");
    assert_eq!(Os::Linux.package_manager(), "apt-get");
    assert_eq!(Os::Windows.package_manager(), "choco");
  }
}
