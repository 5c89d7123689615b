//! Printer driver.
//!
//! Sends a rendered page to the OS print spooler via `lp` (or a configured
//! replacement). Each invocation is bounded by a timeout; the child process
//! is killed if it does not exit in time.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::AgentError;

/// Something that can print a rendered page.
#[async_trait]
pub trait Printer: Send + Sync {
    async fn print(&self, file: &Path, copies: i16) -> Result<(), AgentError>;
}

/// Prints by running an `lp`-compatible command.
#[derive(Debug, Clone)]
pub struct CommandPrinter {
    program: String,
    printer: Option<String>,
    timeout: Duration,
}

impl CommandPrinter {
    pub fn new(program: impl Into<String>, printer: Option<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            printer,
            timeout,
        }
    }

    /// Arguments for one invocation:
    /// `[-d <printer>] -n <copies> -o fit-to-page <file>`.
    pub fn args(&self, file: &Path, copies: i16) -> Vec<String> {
        let mut args = Vec::with_capacity(7);
        if let Some(printer) = &self.printer {
            args.push("-d".to_string());
            args.push(printer.clone());
        }
        args.push("-n".to_string());
        args.push(copies.max(1).to_string());
        args.push("-o".to_string());
        args.push("fit-to-page".to_string());
        args.push(file.display().to_string());
        args
    }
}

#[async_trait]
impl Printer for CommandPrinter {
    async fn print(&self, file: &Path, copies: i16) -> Result<(), AgentError> {
        let args = self.args(file, copies);

        tracing::debug!(program = %self.program, ?args, "Running print command");

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.program)
                .args(&args)
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| AgentError::Timeout(self.timeout))?
        .map_err(|e| AgentError::Print(format!("cannot run {}: {e}", self.program)))?;

        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            tracing::info!(output = %stdout.trim(), "Print command accepted job");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(AgentError::Print(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )))
        }
    }
}
