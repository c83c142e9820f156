//! Subprocess execution for allowed commands.

use std::process::Command;

use thiserror::Error;

/// A failed run, carrying whatever the process printed before failing.
#[derive(Debug, Error)]
pub enum RunError {
    /// The binary could not be started at all.
    #[error("while starting {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited unsuccessfully.
    #[error("exit status {}", exit_code(.code))]
    Exited { output: String, code: Option<i32> },
}

fn exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}

impl RunError {
    /// Output captured before the failure; empty when the spawn failed.
    pub fn output(&self) -> &str {
        match self {
            RunError::Spawn { .. } => "",
            RunError::Exited { output, .. } => output,
        }
    }
}

/// Runs a binary and returns its combined stdout and stderr.
///
/// Implementations choose how the two streams are combined; callers only
/// rely on both being present. Blocks until the process exits. Cancellation
/// belongs to the caller.
pub trait CommandRunner: Send + Sync {
    fn run_combined_output(&self, binary: &str, args: &[String]) -> Result<String, RunError>;
}

/// Spawns real processes.
///
/// stdout and stderr are captured separately and joined back to back, stdout
/// first. Unlike a shared pipe, lines written to the two streams are not
/// interleaved in the order the process wrote them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run_combined_output(&self, binary: &str, args: &[String]) -> Result<String, RunError> {
        let out = Command::new(binary)
            .args(args)
            .output()
            .map_err(|source| RunError::Spawn {
                binary: binary.to_string(),
                source,
            })?;

        let mut combined = String::from_utf8_lossy(&out.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&out.stderr));

        if out.status.success() {
            Ok(combined)
        } else {
            Err(RunError::Exited {
                output: combined,
                code: out.status.code(),
            })
        }
    }
}
