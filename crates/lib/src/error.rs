//! Top-level error type for action runs.
//!
//! Every failure inside an action propagates up to the CLI as an
//! [`ActionError`], where it is reported once as the run's failure reason.

use std::path::PathBuf;

use thiserror::Error;

use crate::exec::ExecError;
use crate::inputs::InputError;
use crate::job::JobError;

/// Errors that terminate an action run.
#[derive(Debug, Error)]
pub enum ActionError {
  /// A declarative input was missing or malformed.
  #[error(transparent)]
  Input(#[from] InputError),

  /// An external process could not be started.
  #[error(transparent)]
  Exec(#[from] ExecError),

  /// An external process exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CommandFailed { cmd: String, code: Option<i32> },

  /// The package upload still failed after every retry.
  #[error("upload failed after {attempts} attempt(s): {cmd}")]
  UploadFailed { cmd: String, attempts: u32 },

  /// No `version` input and no version line in the recipe.
  #[error("no version input and none declared in {}", recipe.display())]
  MissingVersion { recipe: PathBuf },

  /// A release build was requested but the repository has no `v*` tag.
  #[error("no release tag matching 'v[0-9]*' found")]
  NoReleaseTag,

  /// Writing to the CI job's command files failed.
  #[error(transparent)]
  Job(#[from] JobError),

  /// A filesystem operation on a known path failed.
  #[error("failed to access '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl ActionError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    ActionError::Io {
      path: path.into(),
      source,
    }
  }
}
