//! Tracing spans and events emitted while the editor works

use diagrampad::core::logging::{init_logging, LogFormat};
use diagrampad::prelude::*;
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::test]
async fn test_editor_operations_run_under_a_subscriber() {
    let _guard = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .set_default();

    let store = Arc::new(MemoryStore::new());
    let renderer = Arc::new(CommandRendererStub);
    let mut editor = Editor::init(Arc::clone(&store), TextBuffer::default(), renderer)
        .await
        .unwrap();
    editor.dispatch(Command::Save, &mut AutoConfirm(true)).await;
    editor.dispatch(Command::DeleteCurrent, &mut AutoConfirm(true)).await;

    assert!(store.list().await.unwrap().is_empty());
}

#[test]
fn test_init_logging_rejects_unknown_format() {
    let err = init_logging(Some("debug"), Some("xml")).unwrap_err();
    assert!(err.to_string().contains("Invalid log format"));
}

#[test]
fn test_init_logging_twice_does_not_panic() {
    let _ = init_logging(Some("off"), Some("compact"));
    let _ = init_logging(Some("debug"), Some("json"));
}

#[test]
fn test_log_format_names_round_trip() {
    for name in LogFormat::variants() {
        assert!(LogFormat::from_str(name).is_ok(), "{name} should parse");
    }
}

struct CommandRendererStub;

#[async_trait::async_trait]
impl DiagramRenderer for CommandRendererStub {
    async fn render(
        &self,
        target: &RenderTarget,
        source: &str,
    ) -> Result<RenderedDiagram, RenderDiagnostic> {
        Ok(RenderedDiagram::new(target.clone(), source.len().to_string()))
    }
}
