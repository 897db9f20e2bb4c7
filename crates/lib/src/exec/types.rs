use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised before a process produced an exit status.
#[derive(Debug, Error)]
pub enum ExecError {
  /// The binary could not be spawned (not found, not executable, ...).
  #[error("failed to run '{cmd}': {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: std::io::Error,
  },
}

/// A single external process invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
  /// The program to run, resolved through `PATH`.
  pub bin: String,
  /// Arguments passed verbatim, without shell interpretation.
  pub args: Vec<String>,
  /// Variables set on top of the inherited environment.
  pub env: BTreeMap<String, String>,
  /// Working directory. `None` inherits the current directory.
  pub cwd: Option<PathBuf>,
  /// Capture stdout instead of streaming it to the job log.
  pub capture: bool,
}

impl CommandSpec {
  pub fn new(bin: impl Into<String>) -> Self {
    Self {
      bin: bin.into(),
      ..Default::default()
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
    self.cwd = Some(cwd.into());
    self
  }

  pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.insert(key.into(), value.into());
    self
  }

  pub fn capture_stdout(mut self) -> Self {
    self.capture = true;
    self
  }

  /// Prefix the command with `sudo` when `sudo` is true.
  pub fn elevated(self, sudo: bool) -> Self {
    if !sudo {
      return self;
    }
    let mut args = Vec::with_capacity(self.args.len() + 1);
    args.push(self.bin);
    args.extend(self.args);
    Self {
      bin: "sudo".to_string(),
      args,
      ..self
    }
  }
}

impl fmt::Display for CommandSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.bin)?;
    for arg in &self.args {
      if arg.is_empty() || arg.contains(char::is_whitespace) {
        write!(f, " \"{}\"", arg)?;
      } else {
        write!(f, " {}", arg)?;
      }
    }
    Ok(())
  }
}

/// Outcome of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
  /// Exit code, `None` when the process was killed by a signal.
  pub exit_code: Option<i32>,
  /// Trimmed stdout, present only for captured commands.
  pub stdout: Option<String>,
}

impl ProcessResult {
  pub fn success(&self) -> bool {
    self.exit_code == Some(0)
  }
}
