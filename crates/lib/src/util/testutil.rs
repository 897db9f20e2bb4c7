//! Test utilities for cibuild-lib.
//!
//! [`RecordingRunner`] stands in for [`ProcessRunner`](crate::exec::ProcessRunner):
//! it records every command instead of spawning it and answers with
//! scripted exit codes and stdout.

use std::path::Path;

use crate::exec::{CommandSpec, ExecError, ProcessResult, Runner};
use crate::job::Job;
use crate::platform::HostEnv;
use crate::session::Session;

#[derive(Debug, Default)]
pub struct RecordingRunner {
  /// Every command received, in order.
  pub calls: Vec<CommandSpec>,
  /// (substring of the command line, remaining failures)
  failures: Vec<(String, u32)>,
  /// (substring of the command line, stdout for captured commands)
  outputs: Vec<(String, String)>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Exit with code 1 the next `times` commands whose line contains `pattern`.
  pub fn fail_on(mut self, pattern: &str, times: u32) -> Self {
    self.failures.push((pattern.to_string(), times));
    self
  }

  /// Answer captured commands containing `pattern` with `stdout`.
  pub fn respond(mut self, pattern: &str, stdout: &str) -> Self {
    self.outputs.push((pattern.to_string(), stdout.to_string()));
    self
  }

  /// Command lines received, as displayed in the job log.
  pub fn lines(&self) -> Vec<String> {
    self.calls.iter().map(ToString::to_string).collect()
  }
}

impl Runner for RecordingRunner {
  async fn run(&mut self, cmd: &CommandSpec) -> Result<ProcessResult, ExecError> {
    self.calls.push(cmd.clone());
    let line = cmd.to_string();

    for (pattern, remaining) in &mut self.failures {
      if *remaining > 0 && line.contains(pattern.as_str()) {
        *remaining -= 1;
        return Ok(ProcessResult {
          exit_code: Some(1),
          stdout: cmd.capture.then(String::new),
        });
      }
    }

    let stdout = cmd.capture.then(|| {
      self
        .outputs
        .iter()
        .find(|(pattern, _)| line.contains(pattern.as_str()))
        .map(|(_, out)| out.clone())
        .unwrap_or_default()
    });

    Ok(ProcessResult {
      exit_code: Some(0),
      stdout,
    })
  }
}

/// Session over a [`RecordingRunner`] with an empty host environment.
pub fn session(runner: RecordingRunner, cwd: &Path) -> Session<RecordingRunner> {
  Session::new(runner, Job::default(), HostEnv::default(), cwd)
}

/// Same as [`session`] with the given host variables.
pub fn session_with_host<const N: usize>(
  runner: RecordingRunner,
  cwd: &Path,
  vars: [(&str, &str); N],
) -> Session<RecordingRunner> {
  Session::new(runner, Job::default(), HostEnv::from_pairs(vars), cwd)
}
