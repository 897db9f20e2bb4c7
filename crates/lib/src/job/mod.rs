//! Bridge to the CI job running the action.
//!
//! The CI platform communicates with actions through a small protocol:
//! - workflow commands printed to stdout (`::group::`, `::warning::`, ...)
//! - a file named by `GITHUB_ENV` receiving variables for later steps
//! - a file named by `GITHUB_OUTPUT` receiving step outputs
//!
//! [`Job`] implements that protocol and mirrors exported variables in memory
//! so that later processes of the same run see them too.

mod context;

pub use context::Trigger;

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Environment variable naming the exported-variables file.
pub const ENV_FILE_VAR: &str = "GITHUB_ENV";

/// Environment variable naming the step-outputs file.
pub const OUTPUT_FILE_VAR: &str = "GITHUB_OUTPUT";

const DELIMITER: &str = "__CIBUILD_EOF__";

/// Errors writing to the job's command files.
#[derive(Debug, Error)]
pub enum JobError {
  #[error("failed to write '{name}' to {path}: {source}")]
  Write {
    name: String,
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("value of '{name}' contains the reserved delimiter")]
  Delimiter { name: String },
}

/// Handle on the CI job executing this run.
#[derive(Debug, Default)]
pub struct Job {
  env_file: Option<PathBuf>,
  output_file: Option<PathBuf>,
  exported: BTreeMap<String, String>,
  outputs: BTreeMap<String, String>,
}

impl Job {
  pub fn new(env_file: Option<PathBuf>, output_file: Option<PathBuf>) -> Self {
    Self {
      env_file,
      output_file,
      ..Default::default()
    }
  }

  /// Job wired to the files named by `GITHUB_ENV` and `GITHUB_OUTPUT`.
  ///
  /// Outside of CI neither is set and exports only live for this run.
  pub fn from_env() -> Self {
    let file = |var: &str| std::env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from);
    Self::new(file(ENV_FILE_VAR), file(OUTPUT_FILE_VAR))
  }

  /// Export a variable to the remaining steps of the job and to every
  /// process started later in this run.
  pub fn export_variable(&mut self, name: &str, value: &str) -> Result<(), JobError> {
    debug!(name, value, "exporting variable");
    if let Some(path) = &self.env_file {
      append_entry(path, name, value)?;
    }
    self.exported.insert(name.to_string(), value.to_string());
    Ok(())
  }

  /// Variables exported so far, in name order.
  pub fn exported(&self) -> &BTreeMap<String, String> {
    &self.exported
  }

  pub fn set_output(&mut self, name: &str, value: &str) -> Result<(), JobError> {
    info!(name, value, "setting output");
    if let Some(path) = &self.output_file {
      append_entry(path, name, value)?;
    }
    self.outputs.insert(name.to_string(), value.to_string());
    Ok(())
  }

  pub fn output(&self, name: &str) -> Option<&str> {
    self.outputs.get(name).map(String::as_str)
  }

  pub fn start_group(&self, name: &str) {
    println!("::group::{}", name);
  }

  pub fn end_group(&self) {
    println!("::endgroup::");
  }

  /// Register a secret so the job log masks it.
  pub fn add_mask(&self, secret: &str) {
    if !secret.is_empty() {
      println!("::add-mask::{}", secret);
    }
  }

  /// Non-fatal condition surfaced as an annotation.
  pub fn warning(&self, message: &str) {
    warn!("{}", message);
    println!("::warning::{}", escape_data(message));
  }

  /// Report the run's failure reason.
  pub fn set_failed(message: &str) {
    error!("{}", message);
    println!("::error::{}", escape_data(message));
  }
}

fn append_entry(path: &Path, name: &str, value: &str) -> Result<(), JobError> {
  if value.contains(DELIMITER) || name.contains(DELIMITER) {
    return Err(JobError::Delimiter { name: name.to_string() });
  }
  let write_err = |source| JobError::Write {
    name: name.to_string(),
    path: path.to_path_buf(),
    source,
  };
  let mut file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .map_err(write_err)?;
  write!(file, "{name}<<{DELIMITER}\n{value}\n{DELIMITER}\n").map_err(write_err)
}

/// Escape a message for use in a workflow command.
fn escape_data(message: &str) -> String {
  message.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}
