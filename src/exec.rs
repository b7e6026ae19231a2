//! Thin wrapper around the X11 command line utilities this tool drives.

use std::process::{Command, ExitStatus};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to run '{tool}' (is it installed?)")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{tool}' exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Run `program` with `args`, returning stdout on success.
///
/// Non-zero exit status is surfaced with the trimmed stderr so callers can log it verbatim.
pub fn run_tool<S: AsRef<str>>(program: &str, args: &[S]) -> Result<String, ToolError> {
    let argv: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
    debug!(program, ?argv, "running");
    let output = Command::new(program)
        .args(&argv)
        .output()
        .map_err(|source| ToolError::Spawn {
            tool: program.to_string(),
            source,
        })?;
    if !output.status.success() {
        return Err(ToolError::Failed {
            tool: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
