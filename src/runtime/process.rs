//! Child processes whose standard streams are wired straight to ours.

use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

use super::RealRuntime;
use crate::error::ScaffoldError;

/// A fully resolved command line for a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) async fn run_inherited_impl(&self, spec: &ProcessSpec) -> Result<i32> {
        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| ScaffoldError::Spawn(format!("{}: {}", spec.program, e)))?;

        debug!("Spawned {} (pid {:?})", spec.program, child.id());

        let status = child
            .wait()
            .await
            .with_context(|| format!("Failed to wait for {}", spec.program))?;

        Ok(exit_code(status))
    }
}

/// Maps an exit status to a shell-style exit code (128 + signal when killed).
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
