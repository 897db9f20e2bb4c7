use crate::job::Trigger;

/// Dispatch emitted after uploading a stable package.
pub const DISPATCH_RELEASE: &str = "conan-release";

/// Dispatch emitted after uploading a development snapshot.
pub const DISPATCH_MASTER: &str = "conan-master";

/// Channel and upload decision for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleasePlan {
  pub stable: bool,
  pub upload: bool,
  /// Build the most recent release tag instead of the checked-out commit.
  pub checkout_latest_tag: bool,
}

impl ReleasePlan {
  pub fn channel<'a>(&self, stable_channel: &'a str, dev_channel: &'a str) -> &'a str {
    if self.stable { stable_channel } else { dev_channel }
  }

  /// Follow-up action to dispatch, empty when nothing was uploaded.
  pub fn dispatch(&self) -> &'static str {
    match (self.upload, self.stable) {
      (false, _) => "",
      (true, true) => DISPATCH_RELEASE,
      (true, false) => DISPATCH_MASTER,
    }
  }
}

/// Decide the channel and upload for `trigger`.
///
/// A run dispatched as `conan-master` uploads a dev snapshot and one
/// dispatched as `conan-release` uploads the latest tag as stable. Otherwise
/// tags are stable and uploaded, `master` is uploaded to dev, and anything
/// else is built without uploading. `force_upload` always uploads.
pub fn plan_release(trigger: &Trigger, force_upload: bool) -> ReleasePlan {
  let mut plan = match trigger.action.as_str() {
    DISPATCH_MASTER => ReleasePlan {
      stable: false,
      upload: true,
      checkout_latest_tag: false,
    },
    DISPATCH_RELEASE => ReleasePlan {
      stable: true,
      upload: true,
      checkout_latest_tag: true,
    },
    _ => ReleasePlan {
      stable: trigger.is_tag(),
      upload: trigger.is_tag() || trigger.is_master(),
      checkout_latest_tag: false,
    },
  };
  plan.upload |= force_upload;
  plan
}
