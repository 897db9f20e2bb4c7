use std::time::Duration;

use tracing::{info, warn};

use crate::error::ActionError;
use crate::exec::{CommandSpec, Runner};
use crate::session::Session;

/// Bounded retry of a flaky network command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  pub attempts: u32,
  pub delay: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      attempts: 10,
      delay: Duration::from_secs(5),
    }
  }
}

/// Run `cmd` until it succeeds or `policy.attempts` runs have failed.
///
/// Returns the number of attempts used.
pub async fn upload_with_retry<R: Runner>(
  session: &mut Session<R>,
  cmd: CommandSpec,
  policy: RetryPolicy,
) -> Result<u32, ActionError> {
  let attempts = policy.attempts.max(1);
  for attempt in 1..=attempts {
    let result = session.exec_unchecked(cmd.clone()).await?;
    if result.success() {
      info!(attempt, "upload succeeded");
      return Ok(attempt);
    }
    warn!(attempt, attempts, exit_code = ?result.exit_code, "upload failed");
    if attempt < attempts && !policy.delay.is_zero() {
      tokio::time::sleep(policy.delay).await;
    }
  }
  Err(ActionError::UploadFailed {
    cmd: cmd.to_string(),
    attempts,
  })
}
