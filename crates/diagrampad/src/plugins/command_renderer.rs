//! Renderer that shells out to an external program
//!
//! Source goes to the program's stdin and the picture comes back on stdout.
//! A non-zero exit is a diagnostic; whatever the program printed on stderr
//! becomes the diagnostic message.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::core::{DiagramRenderer, RenderDiagnostic, RenderTarget, RenderedDiagram};

/// Environment variable carrying the render target id to the child
pub const RENDER_TARGET_ENV: &str = "DIAGRAMPAD_RENDER_TARGET";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a whitespace-separated command line such as `figurehead convert`
    ///
    /// Returns `None` for a blank line.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let program = words.next()?;
        Some(Self::new(program, words))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[async_trait]
impl DiagramRenderer for CommandRenderer {
    async fn render(
        &self,
        target: &RenderTarget,
        source: &str,
    ) -> Result<RenderedDiagram, RenderDiagnostic> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(RENDER_TARGET_ENV, target.id())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                warn!(program = %self.program, error = %e, "Renderer failed to start");
                RenderDiagnostic::new(format!(
                    "Failed to start renderer '{}': {}",
                    self.program, e
                ))
            })?;

        let stdin = child.stdin.take();
        let input = source.as_bytes().to_vec();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                // The child may exit before reading everything; its exit
                // status is what decides the outcome.
                if let Err(e) = stdin.write_all(&input).await {
                    debug!(error = %e, "Renderer closed stdin early");
                }
            }
        };

        let ((), output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|e| {
            RenderDiagnostic::new(format!("Renderer '{}' failed: {}", self.program, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("Renderer exited with {}", output.status)
            } else {
                stderr
            };
            debug!(target_id = %target, status = %output.status, "Renderer reported a diagnostic");
            return Err(RenderDiagnostic::new(message));
        }

        let body = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(target_id = %target, bytes = body.len(), "Renderer finished");
        Ok(RenderedDiagram::new(target.clone(), body))
    }
}
