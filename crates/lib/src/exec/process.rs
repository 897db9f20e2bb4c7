//! Tokio-backed process runner.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use super::{CommandSpec, ExecError, ProcessResult, Runner};

/// Spawns real processes.
///
/// The command line is echoed to stdout as `[command]...` before spawning,
/// the way CI logs show every external step. Output of non-captured commands
/// streams straight into the job log.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl Runner for ProcessRunner {
  async fn run(&mut self, spec: &CommandSpec) -> Result<ProcessResult, ExecError> {
    info!(cmd = %spec, "executing command");
    println!("[command]{}", spec);

    let mut command = Command::new(&spec.bin);
    command.args(&spec.args).envs(&spec.env).stdin(Stdio::null());
    if let Some(cwd) = &spec.cwd {
      command.current_dir(cwd);
    }

    debug!(bin = %spec.bin, cwd = ?spec.cwd, env = ?spec.env.keys().collect::<Vec<_>>(), "spawning process");

    let spawn_err = |source| ExecError::Spawn {
      cmd: spec.to_string(),
      source,
    };

    let result = if spec.capture {
      let output = command
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .output()
        .await
        .map_err(spawn_err)?;
      let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
      if !stdout.is_empty() {
        debug!(stdout = %stdout, "command output");
      }
      ProcessResult {
        exit_code: output.status.code(),
        stdout: Some(stdout),
      }
    } else {
      let status = command.status().await.map_err(spawn_err)?;
      ProcessResult {
        exit_code: status.code(),
        stdout: None,
      }
    };

    debug!(code = ?result.exit_code, "process exited");
    Ok(result)
  }
}
