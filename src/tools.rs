//! External tool invocation
//!
//! Bundlers, style/template compilers, minifiers, and the autoprefixer are
//! external collaborators: each is configured as a command line and invoked
//! as an opaque transform. Two call shapes cover the tools in the wild:
//!
//! - [`ToolCommand::run_on_file`]: the source path is appended to the argv
//!   (bundlers and compilers resolve imports relative to the entry file),
//!   stdout is captured as the transformed content.
//! - [`ToolCommand::run_filter`]: content is piped through stdin→stdout
//!   (minifiers, autoprefixer).
//!
//! The command string is split on whitespace; no shell is involved, so no
//! quoting rules apply.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{PipelineError, PipelineResult};

/// A configured external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
}

impl ToolCommand {
    /// Parse a whitespace-separated command line. Returns `None` for an
    /// empty or blank string (meaning: no tool configured, pass through).
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// The command line as configured, for error messages
    pub fn render(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }

    /// Run with `path` appended to the argv; capture stdout.
    pub fn run_on_file(&self, path: &Path) -> PipelineResult<Vec<u8>> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| self.spawn_error(e))?;
        self.check(output)
    }

    /// Pipe `input` through stdin; capture stdout.
    pub fn run_filter(&self, input: &[u8]) -> PipelineResult<Vec<u8>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin.write_all(input)?;
        }
        drop(child.stdin.take());

        let output = child.wait_with_output()?;
        self.check(output)
    }

    fn check(&self, output: std::process::Output) -> PipelineResult<Vec<u8>> {
        if output.status.success() {
            Ok(output.stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(PipelineError::Tool {
                command: self.render(),
                message: format!(
                    "exited with {}: {}",
                    output.status,
                    stderr.trim().lines().last().unwrap_or("no stderr")
                ),
            })
        }
    }

    fn spawn_error(&self, err: std::io::Error) -> PipelineError {
        PipelineError::Tool {
            command: self.render(),
            message: err.to_string(),
        }
    }
}
