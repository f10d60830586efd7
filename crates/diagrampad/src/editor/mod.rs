//! The editor: every piece of UI state behind one command interface
//!
//! [`Editor`] owns the file manager, the preview bridge, the viewport, the
//! layout and the notification queue. Hosts translate their events into
//! [`Command`]s and hand them to [`Editor::dispatch`]; no error escapes a
//! dispatched command, each one becomes a notification instead.

mod manager;
mod preview;
mod shortcuts;

pub use manager::*;
pub use preview::*;
pub use shortcuts::*;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::core::{
    timestamp_now, Confirm, DiagramRenderer, EditingSurface, EditorError, Listing, Notification,
    NotificationLevel, Notifications, RecordId, RecordStore, Sidebar, SplitLayout, TextBuffer,
    Viewport, PLACEHOLDER_CONTENT,
};

/// Posted once the editor is ready
pub const WELCOME_MESSAGE: &str = "Welcome to diagrampad!";

/// A user-facing trigger
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    New,
    Open(RecordId),
    Save,
    SaveAs,
    Delete(RecordId),
    DeleteCurrent,
    BeginRename,
    /// The name input changed
    EditName(String),
    /// Enter or blur on the name input
    CommitRename,
    /// Escape on the name input
    CancelRename,
    /// Replace the editor text
    Edit(String),
    /// The editing surface changed on its own
    TextChanged,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    PointerEnter,
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    PointerLeave,
    Wheel { delta_y: f64 },
    ToggleSidebar,
    BeginResize,
    ResizeTo {
        pointer_x: f64,
        container_left: f64,
        container_width: f64,
    },
    EndResize,
    /// Re-read the listing
    Refresh,
}

/// What the host should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Done,
    /// Swallow the triggering event (page scroll, browser shortcut)
    SuppressDefault,
    /// The command failed; an error notification was posted
    Failed,
}

pub struct Editor<S, E = TextBuffer> {
    files: FileManager<S, E>,
    preview: PreviewBridge,
    viewport: Viewport,
    layout: SplitLayout,
    sidebar: Sidebar,
    notifications: Notifications,
}

impl<S, E> Editor<S, E>
where
    S: RecordStore,
    E: EditingSurface,
{
    /// Bring up an editor over `store`
    ///
    /// Loads the listing and renders whatever the surface holds (the
    /// placeholder diagram when it is empty). An unavailable store is the one
    /// failure that is returned; any other listing error becomes a
    /// notification and the editor starts with an empty listing.
    #[instrument(skip_all)]
    pub async fn init(
        store: S,
        mut surface: E,
        renderer: Arc<dyn DiagramRenderer>,
    ) -> Result<Self, EditorError> {
        if surface.value().is_empty() {
            surface.set_value(PLACEHOLDER_CONTENT);
        }

        let mut editor = Self {
            files: FileManager::new(store, surface),
            preview: PreviewBridge::new(renderer),
            viewport: Viewport::new(),
            layout: SplitLayout::default(),
            sidebar: Sidebar::default(),
            notifications: Notifications::new(),
        };

        let now = timestamp_now();
        let loaded = editor.files.refresh(now).await.map(|_| ());
        match loaded {
            Err(e) if e.is_fatal() => {
                error!(error = %e, "Failed to open diagram store");
                return Err(e);
            }
            Err(e) => {
                warn!(error = %e, "Failed to load diagrams");
                editor.notify_listing_error(e, now);
            }
            Ok(()) => {}
        }
        editor.render().await;
        editor
            .notifications
            .post(NotificationLevel::Info, WELCOME_MESSAGE, now);
        info!(diagrams = editor.files.listing().len(), "Editor ready");
        Ok(editor)
    }

    /// Set the initial sidebar state for the host window width
    pub fn fit_window(&mut self, width: f64) {
        self.sidebar = Sidebar::for_window_width(width);
    }

    /// Run one command, turning any failure into a notification
    pub async fn dispatch(&mut self, command: Command, confirm: &mut dyn Confirm) -> Reaction {
        self.dispatch_at(command, confirm, timestamp_now()).await
    }

    /// [`Editor::dispatch`] with an explicit clock reading
    ///
    /// Notifications that have expired by `now` are dropped first.
    pub async fn dispatch_at(
        &mut self,
        command: Command,
        confirm: &mut dyn Confirm,
        now: DateTime<Utc>,
    ) -> Reaction {
        self.notifications.prune(now);
        debug!(?command, "Dispatching");
        let reaction = match self.execute(command, confirm, now).await {
            Ok(reaction) => reaction,
            Err(e) => {
                warn!(error = %e, "Command failed");
                self.notify(NotificationLevel::Error, e.to_string(), now);
                Reaction::Failed
            }
        };
        if let Some(e) = self.files.take_listing_error() {
            self.notify_listing_error(e, now);
        }
        reaction
    }

    /// Resolve a key press and dispatch the command it maps to
    ///
    /// Returns `None` when the key is not a shortcut.
    pub async fn key(&mut self, press: &KeyPress, confirm: &mut dyn Confirm) -> Option<Reaction> {
        let command = resolve_shortcut(press, self.files.name().is_editing())?;
        match self.dispatch(command, confirm).await {
            Reaction::Done => Some(Reaction::SuppressDefault),
            other => Some(other),
        }
    }

    async fn execute(
        &mut self,
        command: Command,
        confirm: &mut dyn Confirm,
        now: DateTime<Utc>,
    ) -> Result<Reaction, CommandError> {
        match command {
            Command::New => {
                self.files
                    .new_diagram(now)
                    .await
                    .map_err(CommandError::during(CREATING))?;
                self.render().await;
            }
            Command::Open(id) => {
                let record = self
                    .files
                    .open(&id, now)
                    .await
                    .map_err(CommandError::during(OPENING))?;
                let message = format!("Opened \"{}\"", record.name);
                self.notify(NotificationLevel::Success, message, now);
                self.render().await;
            }
            Command::Save => {
                let outcome = self
                    .files
                    .save(confirm, now)
                    .await
                    .map_err(CommandError::during(SAVING))?;
                match outcome {
                    SaveOutcome::Created(_) => {
                        self.notify(NotificationLevel::Success, "Diagram saved!", now)
                    }
                    SaveOutcome::Updated(_) => {
                        self.notify(NotificationLevel::Success, "Diagram updated!", now)
                    }
                    SaveOutcome::Declined => {}
                }
            }
            Command::SaveAs => {
                self.files
                    .save_as(now)
                    .await
                    .map_err(CommandError::during(SAVING))?;
                self.notify(NotificationLevel::Success, "Saved as new diagram!", now);
            }
            Command::Delete(id) => {
                let outcome = self
                    .files
                    .delete(&id, confirm, now)
                    .await
                    .map_err(CommandError::during(DELETING))?;
                self.after_delete(outcome, now).await;
            }
            Command::DeleteCurrent => {
                let outcome = self
                    .files
                    .delete_current(confirm, now)
                    .await
                    .map_err(CommandError::during(DELETING))?;
                self.after_delete(outcome, now).await;
            }
            Command::BeginRename => self.files.name_mut().begin_edit(),
            Command::EditName(value) => self.files.name_mut().set(value),
            Command::CommitRename => self.files.name_mut().commit(),
            Command::CancelRename => self.files.name_mut().cancel(),
            Command::Edit(text) => {
                self.files.surface_mut().set_value(&text);
                self.render().await;
            }
            Command::TextChanged => self.render().await,
            Command::ZoomIn => {
                self.viewport.zoom_in();
            }
            Command::ZoomOut => {
                self.viewport.zoom_out();
            }
            Command::ResetZoom => self.viewport.reset(),
            Command::PointerEnter => self.viewport.pointer_enter(),
            Command::PointerDown { x, y } => self.viewport.pointer_down(x, y),
            Command::PointerMove { x, y } => {
                self.viewport.pointer_move(x, y);
            }
            Command::PointerUp => self.viewport.pointer_up(),
            Command::PointerLeave => self.viewport.pointer_leave(),
            Command::Wheel { delta_y } => {
                if self.viewport.wheel(delta_y) {
                    return Ok(Reaction::SuppressDefault);
                }
            }
            Command::ToggleSidebar => {
                self.sidebar.toggle();
            }
            Command::BeginResize => self.layout.begin_resize(),
            Command::ResizeTo {
                pointer_x,
                container_left,
                container_width,
            } => {
                self.layout
                    .resize_to(pointer_x, container_left, container_width);
            }
            Command::EndResize => self.layout.end_resize(),
            Command::Refresh => {
                self.files
                    .refresh(now)
                    .await
                    .map_err(CommandError::during(LOADING))?;
            }
        }
        Ok(Reaction::Done)
    }

    async fn after_delete(&mut self, outcome: DeleteOutcome, now: DateTime<Utc>) {
        if let DeleteOutcome::Deleted { cleared_selection } = outcome {
            self.notify(NotificationLevel::Success, "Diagram deleted", now);
            if cleared_selection {
                self.render().await;
            }
        }
    }

    async fn render(&mut self) {
        let source = self.files.surface().value();
        self.preview.refresh(&source).await;
    }

    fn notify(&mut self, level: NotificationLevel, message: impl Into<String>, now: DateTime<Utc>) {
        self.notifications.post(level, message, now);
    }

    fn notify_listing_error(&mut self, error: EditorError, now: DateTime<Utc>) {
        let message = CommandError::during(LOADING)(error).to_string();
        self.notify(NotificationLevel::Error, message, now);
    }

    /// Start a render of the current text without waiting for it
    ///
    /// For hosts that run render jobs concurrently; pair with
    /// [`Editor::complete_render`].
    pub fn begin_render(&mut self) -> Option<RenderJob> {
        let source = self.files.surface().value();
        self.preview.begin(&source)
    }

    /// Apply a finished render; stale completions are ignored
    pub fn complete_render(&mut self, completion: RenderCompletion) -> bool {
        self.preview.complete(completion)
    }

    pub fn files(&self) -> &FileManager<S, E> {
        &self.files
    }

    pub fn listing(&self) -> &Listing {
        self.files.listing()
    }

    pub fn current(&self) -> Option<&RecordId> {
        self.files.current()
    }

    pub fn title(&self) -> String {
        self.files.title()
    }

    pub fn save_label(&self) -> &'static str {
        self.files.save_label()
    }

    pub fn text(&self) -> String {
        self.files.surface().value()
    }

    pub fn surface_mut(&mut self) -> &mut E {
        self.files.surface_mut()
    }

    pub fn preview(&self) -> &PreviewState {
        self.preview.state()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn layout(&self) -> &SplitLayout {
        &self.layout
    }

    pub fn sidebar(&self) -> Sidebar {
        self.sidebar
    }

    /// Notifications still visible at `now`
    pub fn active_notifications(&self, now: DateTime<Utc>) -> Vec<&Notification> {
        self.notifications.active(now).collect()
    }

    /// Take every pending notification, expired or not
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    /// Notifications held, including expired ones not yet dropped
    pub fn pending_notifications(&self) -> usize {
        self.notifications.len()
    }
}

const OPENING: &str = "Error loading diagram";
const SAVING: &str = "Error saving diagram";
const DELETING: &str = "Error deleting diagram";
const CREATING: &str = "Error creating diagram";
const LOADING: &str = "Error loading diagrams";

/// A failed command as the user sees it
#[derive(Error, Debug)]
enum CommandError {
    /// Shown as is; the id says everything
    #[error(transparent)]
    NotFound(EditorError),

    #[error("{action}: {source}")]
    Failed {
        action: &'static str,
        #[source]
        source: EditorError,
    },
}

impl CommandError {
    /// Attach the failed action to an editor error
    fn during(action: &'static str) -> impl FnOnce(EditorError) -> Self {
        move |source| match source {
            missing @ EditorError::NotFound { .. } => Self::NotFound(missing),
            source => Self::Failed { action, source },
        }
    }
}
