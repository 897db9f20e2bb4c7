//! Conan packaging helpers.
//!
//! - [`plan_release`] decides the channel and whether to upload
//! - [`recipe`] reads and rewrites `conanfile.py`
//! - [`upload_with_retry`] is the one retried network call

mod channel;
pub mod recipe;
mod retry;

pub use channel::{DISPATCH_MASTER, DISPATCH_RELEASE, ReleasePlan, plan_release};
pub use retry::{RetryPolicy, upload_with_retry};

use std::fmt;

/// Default remote for a user's repository.
pub fn bintray_remote(user: &str, repository: &str) -> String {
  format!("https://api.bintray.com/conan/{}/{}", user, repository)
}

/// A fully qualified package reference, `name/version@user/channel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
  pub package: String,
  pub version: String,
  pub repository: String,
  pub channel: String,
}

impl Reference {
  /// The `user/channel` half, as passed to `conan create`.
  pub fn user_channel(&self) -> String {
    format!("{}/{}", self.repository, self.channel)
  }

  /// Same package and channel, pointing at the `latest` alias.
  pub fn latest(&self) -> Self {
    Self {
      version: "latest".to_string(),
      ..self.clone()
    }
  }
}

impl fmt::Display for Reference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}@{}/{}", self.package, self.version, self.repository, self.channel)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reference_formats() {
    let reference = Reference {
      package: "eigen-qld".to_string(),
      version: "1.2.0".to_string(),
      repository: "multi-contact".to_string(),
      channel: "stable".to_string(),
    };

    assert_eq!(reference.to_string(), "eigen-qld/1.2.0@multi-contact/stable");
    assert_eq!(reference.latest().to_string(), "eigen-qld/latest@multi-contact/stable");
    assert_eq!(reference.user_channel(), "multi-contact/stable");
  }

  #[test]
  fn bintray_remote_url() {
    assert_eq!(
      bintray_remote("gergondet", "multi-contact"),
      "https://api.bintray.com/conan/gergondet/multi-contact"
    );
  }
}
