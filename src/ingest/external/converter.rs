//! Source-to-tree converter collaborator.
//!
//! The external normalization tool is a black box: it receives raw source
//! text and a language discriminator and answers with a [`TreeNode`]. Any
//! implementation of [`TreeConverter`] can stand in for it.

use crate::config::ExternalToolConfig;
use crate::error::{Result, ScanError};
use crate::ingest::external::tree::TreeNode;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use which::which;

/// Converts source text into an exchange tree.
pub trait TreeConverter: Send + Sync {
    /// Check the converter can run at all.
    ///
    /// Called once per non-empty batch; an error here fails the backend.
    fn ensure_available(&self) -> Result<()> {
        Ok(())
    }

    /// Convert one file's source text.
    fn convert(&self, source: &str, discriminator: &str) -> Result<TreeNode>;
}

/// Runs the normalization tool as a child process.
///
/// Invocation: `<program> <args...> --language <discriminator>`, source on
/// stdin, one JSON tree on stdout.
#[derive(Debug, Clone)]
pub struct ProcessConverter {
    program: String,
    args: Vec<String>,
}

impl ProcessConverter {
    /// Create a converter for `program` with leading `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Create a converter from configuration.
    pub fn from_config(config: &ExternalToolConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    fn resolve(&self) -> Result<PathBuf> {
        which(&self.program).map_err(|e| ScanError::ToolNotFound {
            program: self.program.clone(),
            reason: e.to_string(),
        })
    }

    fn tool_error(&self, message: String) -> ScanError {
        ScanError::ExternalTool {
            program: self.program.clone(),
            message,
        }
    }
}

impl TreeConverter for ProcessConverter {
    fn ensure_available(&self) -> Result<()> {
        self.resolve().map(|_| ())
    }

    fn convert(&self, source: &str, discriminator: &str) -> Result<TreeNode> {
        let program = self.resolve()?;

        let mut child = Command::new(&program)
            .args(&self.args)
            .args(["--language", discriminator])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => ScanError::ToolNotFound {
                    program: self.program.clone(),
                    reason: e.to_string(),
                },
                _ => self.tool_error(format!("failed to spawn: {}", e)),
            })?;

        // Feed stdin from a separate thread so a tool that streams output
        // before reading all input cannot deadlock against us.
        let stdin = child.stdin.take();
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(source.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (output, written)
        });

        let output = output.map_err(|e| self.tool_error(format!("failed to wait: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.tool_error(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        // A tool may exit successfully without draining stdin.
        if let Err(e) = written {
            log::trace!("{} closed stdin early: {}", self.program, e);
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}
