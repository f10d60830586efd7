//! diagrampad - a local-first diagram editor core
//!
//! Everything a diagram editor needs short of drawing pixels: a persisted
//! record model, a file manager over an asynchronous record store, a preview
//! bridge to an external renderer, and the zoom, pan and layout state of the
//! editor window. Hosts drive it through [`editor::Editor`] and a
//! [`editor::Command`] enum; no UI toolkit is assumed.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use diagrampad::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let store = FileStore::open("/tmp/diagrams").await?;
//! let renderer = Arc::new(CommandRenderer::new("figurehead", ["convert"]));
//! let mut editor = Editor::init(store, TextBuffer::default(), renderer).await?;
//!
//! editor
//!     .dispatch(Command::Edit("graph LR; A-->B".into()), &mut AutoConfirm(true))
//!     .await;
//! editor.dispatch(Command::Save, &mut AutoConfirm(true)).await;
//! println!("{}", editor.preview());
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod editor;
pub mod plugins;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        AutoConfirm, Confirm, Confirmation, DiagramRecord, DiagramRenderer, EditingSurface,
        EditorError, Listing, ListingEntry, NotificationLevel, RecordId, RecordStore,
        RenderDiagnostic, RenderTarget, RenderedDiagram, StoreError, TextBuffer, Viewport,
    };
    pub use crate::editor::{
        Command, DeleteOutcome, Editor, FileManager, KeyPress, PreviewBridge, PreviewState,
        Reaction, SaveOutcome,
    };
    pub use crate::plugins::MemoryStore;
    #[cfg(not(target_arch = "wasm32"))]
    pub use crate::plugins::{CommandRenderer, FileStore};
}

/// Open the on-disk store at `data_dir` and start an editor rendering through
/// `renderer_command` (e.g. `figurehead convert`)
///
/// # Example
/// ```rust,no_run
/// # async fn demo() -> anyhow::Result<()> {
/// let editor = diagrampad::open_editor("/tmp/diagrams", "figurehead convert").await?;
/// println!("{} diagrams", editor.listing().len());
/// # Ok(())
/// # }
/// ```
#[cfg(not(target_arch = "wasm32"))]
pub async fn open_editor(
    data_dir: impl Into<std::path::PathBuf>,
    renderer_command: &str,
) -> anyhow::Result<editor::Editor<plugins::FileStore>> {
    use anyhow::Context as _;
    use std::sync::Arc;

    let renderer = plugins::CommandRenderer::from_command_line(renderer_command)
        .context("Renderer command is empty")?;
    let store = plugins::FileStore::open(data_dir).await?;
    let editor = editor::Editor::init(store, TextBuffer::default(), Arc::new(renderer)).await?;
    Ok(editor)
}
