//! Preview renderer bridge
//!
//! Keeps the preview pane in step with the editor text. Each render attempt
//! gets a generation number; a completion is applied only if no newer
//! attempt has started since, so a slow render can never overwrite the
//! result of a faster, later one.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::core::{DiagramRenderer, RenderDiagnostic, RenderTarget, RenderedDiagram};

/// Shown in place of a diagram when the editor is empty
pub const PLACEHOLDER_MESSAGE: &str = "Start typing to see your diagram";

/// Where the syntax error panel points for example syntax
pub const EXAMPLES_LINK: &str = "cheatsheet.html";

/// What the preview pane currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    /// Empty editor
    Placeholder,
    /// A render is in flight
    Rendering { generation: u64 },
    Rendered(RenderedDiagram),
    /// The renderer rejected the source
    SyntaxError { message: String, help: String },
}

impl PreviewState {
    fn syntax_error(diagnostic: RenderDiagnostic) -> Self {
        PreviewState::SyntaxError {
            message: diagnostic.message,
            help: format!("View examples: {}", EXAMPLES_LINK),
        }
    }
}

impl fmt::Display for PreviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewState::Placeholder => write!(f, "{}", PLACEHOLDER_MESSAGE),
            PreviewState::Rendering { .. } => write!(f, "Rendering diagram..."),
            PreviewState::Rendered(diagram) => write!(f, "{}", diagram.body),
            PreviewState::SyntaxError { message, help } => {
                write!(f, "Syntax Error\n{}\n{}", message, help)
            }
        }
    }
}

/// A render that has been started but not yet run
///
/// Produced by [`PreviewBridge::begin`]; run it anywhere, then hand the
/// resulting [`RenderCompletion`] back to [`PreviewBridge::complete`].
pub struct RenderJob {
    generation: u64,
    target: RenderTarget,
    source: String,
    renderer: Arc<dyn DiagramRenderer>,
}

impl fmt::Debug for RenderJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderJob")
            .field("generation", &self.generation)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl RenderJob {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    pub async fn run(self) -> RenderCompletion {
        trace!(target_id = %self.target, "Render started");
        let result = self.renderer.render(&self.target, &self.source).await;
        RenderCompletion {
            generation: self.generation,
            result,
        }
    }
}

/// Outcome of a [`RenderJob`]
#[derive(Debug, Clone)]
pub struct RenderCompletion {
    pub generation: u64,
    pub result: Result<RenderedDiagram, RenderDiagnostic>,
}

/// Drives the renderer and tracks the preview state
pub struct PreviewBridge {
    renderer: Arc<dyn DiagramRenderer>,
    generation: u64,
    state: PreviewState,
}

impl fmt::Debug for PreviewBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewBridge")
            .field("generation", &self.generation)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl PreviewBridge {
    pub fn new(renderer: Arc<dyn DiagramRenderer>) -> Self {
        Self {
            renderer,
            generation: 0,
            state: PreviewState::Placeholder,
        }
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    /// Generation of the most recent render attempt
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_rendering(&self) -> bool {
        matches!(self.state, PreviewState::Rendering { .. })
    }

    /// Start a render of `source`
    ///
    /// Any earlier attempt is superseded and its artifact dropped. Returns
    /// `None` for empty or whitespace-only source, which shows the
    /// placeholder without involving the renderer.
    pub fn begin(&mut self, source: &str) -> Option<RenderJob> {
        self.generation += 1;
        if source.trim().is_empty() {
            trace!(generation = self.generation, "Empty source, showing placeholder");
            self.state = PreviewState::Placeholder;
            return None;
        }

        self.state = PreviewState::Rendering {
            generation: self.generation,
        };
        Some(RenderJob {
            generation: self.generation,
            target: RenderTarget::for_generation(self.generation),
            source: source.to_string(),
            renderer: Arc::clone(&self.renderer),
        })
    }

    /// Apply a finished render
    ///
    /// Returns false, leaving the state alone, when the completion belongs
    /// to a superseded attempt.
    pub fn complete(&mut self, completion: RenderCompletion) -> bool {
        if completion.generation != self.generation {
            debug!(
                stale = completion.generation,
                current = self.generation,
                "Discarding stale render"
            );
            return false;
        }

        self.state = match completion.result {
            Ok(diagram) => PreviewState::Rendered(diagram),
            Err(diagnostic) => {
                debug!(message = %diagnostic, "Renderer reported a syntax error");
                PreviewState::syntax_error(diagnostic)
            }
        };
        true
    }

    /// Render `source` to completion
    pub async fn refresh(&mut self, source: &str) -> &PreviewState {
        if let Some(job) = self.begin(source) {
            let completion = job.run().await;
            self.complete(completion);
        }
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes the source back, or fails on sources starting with `!`
    #[derive(Default)]
    struct EchoRenderer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DiagramRenderer for EchoRenderer {
        async fn render(
            &self,
            target: &RenderTarget,
            source: &str,
        ) -> Result<RenderedDiagram, RenderDiagnostic> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match source.strip_prefix('!') {
                Some(message) => Err(RenderDiagnostic::new(message)),
                None => Ok(RenderedDiagram::new(target.clone(), format!("<svg>{}</svg>", source))),
            }
        }
    }

    fn bridge() -> (Arc<EchoRenderer>, PreviewBridge) {
        let renderer = Arc::new(EchoRenderer::default());
        let bridge = PreviewBridge::new(renderer.clone());
        (renderer, bridge)
    }

    #[tokio::test]
    async fn test_blank_source_never_reaches_renderer() {
        let (renderer, mut bridge) = bridge();
        for source in ["", "   ", "\n\t\n"] {
            assert_eq!(bridge.refresh(source).await, &PreviewState::Placeholder);
        }
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(format!("{}", bridge.state()), PLACEHOLDER_MESSAGE);
    }

    #[tokio::test]
    async fn test_successful_render() {
        let (renderer, mut bridge) = bridge();
        let state = bridge.refresh("graph TD").await.clone();
        let PreviewState::Rendered(diagram) = state else {
            panic!("expected a rendered diagram");
        };
        assert_eq!(diagram.body, "<svg>graph TD</svg>");
        assert_eq!(diagram.target.id(), "diagram-preview-1");
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_diagnostic_is_shown_verbatim() {
        let (_, mut bridge) = bridge();
        let state = bridge.refresh("!Parse error on line 1").await;
        match state {
            PreviewState::SyntaxError { message, help } => {
                assert_eq!(message, "Parse error on line 1");
                assert!(help.contains(EXAMPLES_LINK));
            }
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_each_attempt_gets_a_fresh_target() {
        let (_, mut bridge) = bridge();
        let first = bridge.begin("a").unwrap();
        let second = bridge.begin("b").unwrap();
        assert_ne!(first.target(), second.target());
        assert!(bridge.is_rendering());
    }

    #[tokio::test]
    async fn test_stale_completion_is_discarded() {
        let (_, mut bridge) = bridge();
        let slow = bridge.begin("old").unwrap();
        let fast = bridge.begin("new").unwrap();

        assert!(bridge.complete(fast.run().await));
        assert!(!bridge.complete(slow.run().await));

        let PreviewState::Rendered(diagram) = bridge.state() else {
            panic!("expected a rendered diagram");
        };
        assert_eq!(diagram.body, "<svg>new</svg>");
    }

    #[tokio::test]
    async fn test_clearing_the_editor_supersedes_a_pending_render() {
        let (_, mut bridge) = bridge();
        let pending = bridge.begin("graph TD").unwrap();
        assert!(bridge.begin("").is_none());
        assert!(!bridge.complete(pending.run().await));
        assert_eq!(bridge.state(), &PreviewState::Placeholder);
    }
}
