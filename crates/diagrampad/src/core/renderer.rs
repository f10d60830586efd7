//! Rendering collaborator contract
//!
//! Turning diagram source into a picture is somebody else's job. The editor
//! hands source text to a [`DiagramRenderer`] together with a fresh
//! [`RenderTarget`] and gets back either a [`RenderedDiagram`] or a
//! [`RenderDiagnostic`] carrying the collaborator's own message.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Identity of one render attempt
///
/// Every attempt gets a new target so a collaborator that keys output by
/// element id never sees the same id twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderTarget {
    id: String,
}

impl RenderTarget {
    /// Target for the given render generation
    pub fn for_generation(generation: u64) -> Self {
        Self {
            id: format!("diagram-preview-{}", generation),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// A successfully rendered diagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiagram {
    pub target: RenderTarget,
    /// Renderer output, e.g. SVG markup or text art
    pub body: String,
}

impl RenderedDiagram {
    pub fn new(target: RenderTarget, body: impl Into<String>) -> Self {
        Self {
            target,
            body: body.into(),
        }
    }
}

/// Diagnostic reported by the renderer for source it could not draw
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RenderDiagnostic {
    pub message: String,
}

impl RenderDiagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// External diagram renderer
#[async_trait]
pub trait DiagramRenderer: Send + Sync {
    /// Render `source` for `target`
    async fn render(
        &self,
        target: &RenderTarget,
        source: &str,
    ) -> Result<RenderedDiagram, RenderDiagnostic>;
}
