//! The state threaded through one action run.
//!
//! A [`Session`] owns the process [`Runner`], the CI [`Job`], the host
//! environment snapshot and the working directory. It is the single place
//! where environment changes meet child processes:
//! - variables exported through the job reach every later process
//! - an [`EnvScope`] overlay is applied by [`Session::enter_scope`] and
//!   reversed by [`Session::leave_scope`]

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::ActionError;
use crate::exec::{CommandSpec, ProcessResult, Runner};
use crate::job::{Job, Trigger};
use crate::platform::{EnvScope, HostEnv, PathFixup};

pub struct Session<R> {
  runner: R,
  pub job: Job,
  host: HostEnv,
  cwd: PathBuf,
  scope: Option<EnvScope>,
}

impl<R: Runner> Session<R> {
  pub fn new(runner: R, job: Job, host: HostEnv, cwd: impl Into<PathBuf>) -> Self {
    Self {
      runner,
      job,
      host,
      cwd: cwd.into(),
      scope: None,
    }
  }

  pub fn runner(&self) -> &R {
    &self.runner
  }

  pub fn host(&self) -> &HostEnv {
    &self.host
  }

  /// Directory the action was started in; relative inputs resolve against it.
  pub fn cwd(&self) -> &Path {
    &self.cwd
  }

  pub fn trigger(&self) -> Trigger {
    Trigger::from_vars(self.host.vars())
  }

  /// Effective value of `name` as a child process would see it.
  pub fn env_var(&self, name: &str) -> Option<&str> {
    self
      .scope
      .as_ref()
      .and_then(|scope| scope.get(name))
      .or_else(|| self.job.exported().get(name).map(String::as_str))
      .or_else(|| self.host.get(name))
  }

  /// Layer `scope` on every process started until [`Session::leave_scope`].
  pub fn enter_scope(&mut self, scope: EnvScope) {
    if !scope.is_empty() {
      self.job.start_group("Modified environment");
      for (name, value) in scope.vars() {
        info!(name, value, "scoped variable");
        println!("{}={}", name, value);
      }
      self.job.end_group();
    }
    self.scope = Some(scope);
  }

  /// Drop the active overlay, restoring the original values.
  pub fn leave_scope(&mut self) -> Option<EnvScope> {
    let scope = self.scope.take();
    if scope.as_ref().is_some_and(|s| !s.is_empty()) {
      debug!("restored environment");
    }
    scope
  }

  /// Apply a persistent fix-up and export the result to the job.
  pub fn export_fixup(&mut self, fixup: &PathFixup) -> Result<(), ActionError> {
    let current = self.env_var(&fixup.variable).unwrap_or_default();
    let value = fixup.apply(current);
    if value != current {
      self.job.export_variable(&fixup.variable, &value)?;
    }
    Ok(())
  }

  /// Run `cmd` and fail the action on a non-zero exit.
  pub async fn exec(&mut self, cmd: CommandSpec) -> Result<ProcessResult, ActionError> {
    let result = self.exec_unchecked(cmd.clone()).await?;
    if !result.success() {
      return Err(ActionError::CommandFailed {
        cmd: cmd.to_string(),
        code: result.exit_code,
      });
    }
    Ok(result)
  }

  /// Run `cmd` and return its result whatever the exit code.
  pub async fn exec_unchecked(&mut self, cmd: CommandSpec) -> Result<ProcessResult, ActionError> {
    let cmd = self.prepare(cmd);
    Ok(self.runner.run(&cmd).await?)
  }

  /// Run `cmd`, capturing its trimmed stdout.
  pub async fn exec_output(&mut self, cmd: CommandSpec) -> Result<String, ActionError> {
    let result = self.exec(cmd.capture_stdout()).await?;
    Ok(result.stdout.unwrap_or_default())
  }

  /// Layer exported and scoped variables under the command's own, and
  /// default the working directory to the session's.
  fn prepare(&self, mut cmd: CommandSpec) -> CommandSpec {
    let mut env = self.job.exported().clone();
    if let Some(scope) = &self.scope {
      env.extend(scope.vars().iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    env.append(&mut cmd.env);
    cmd.env = env;
    if cmd.cwd.is_none() {
      cmd.cwd = Some(self.cwd.clone());
    }
    cmd
  }
}
