//! File manager: list, open, save, save-as, delete and new
//!
//! The manager owns the current selection, the name field and the editing
//! surface, and talks to the record store for everything else. It never
//! posts notifications itself; callers turn its outcomes and errors into
//! user-facing messages.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::core::{
    copy_name, effective_name, Confirm, Confirmation, DiagramRecord, EditingSurface, EditorError,
    Listing, RecordId, RecordStore, TextBuffer, DEFAULT_NAME, PLACEHOLDER_CONTENT,
};

/// The editable diagram name
///
/// `value` is what the input currently shows; `committed` is the last value
/// accepted with Enter or blur, and is what the title displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameField {
    value: String,
    committed: String,
    editing: bool,
}

impl Default for NameField {
    fn default() -> Self {
        Self::new(DEFAULT_NAME)
    }
}

impl NameField {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            committed: value.clone(),
            value,
            editing: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Title text: the committed name, or the default name when empty
    pub fn title(&self) -> String {
        effective_name(&self.committed)
    }

    pub fn begin_edit(&mut self) {
        self.editing = true;
    }

    /// Replace the in-progress value
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.editing = true;
    }

    /// Accept the in-progress value (Enter or blur)
    pub fn commit(&mut self) {
        self.committed = self.value.clone();
        self.editing = false;
    }

    /// Discard the in-progress value (Escape)
    pub fn cancel(&mut self) {
        self.value = self.committed.clone();
        self.editing = false;
    }

    /// Overwrite both values, ending any edit
    pub fn reset(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.committed = value.clone();
        self.value = value;
        self.editing = false;
    }
}

/// Result of [`FileManager::save`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new record was written
    Created(RecordId),
    /// The selected record was overwritten
    Updated(RecordId),
    /// The user declined the rename; nothing was written
    Declined,
}

/// Result of [`FileManager::delete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted {
        /// The deleted record was the current selection
        cleared_selection: bool,
    },
    Declined,
    NothingSelected,
}

/// Owns the selection and mediates every store operation
pub struct FileManager<S, E = TextBuffer> {
    store: S,
    surface: E,
    current: Option<RecordId>,
    name: NameField,
    listing: Listing,
    listing_error: Option<EditorError>,
}

impl<S, E> FileManager<S, E>
where
    S: RecordStore,
    E: EditingSurface,
{
    /// Manager with nothing selected and an empty listing
    ///
    /// The surface keeps whatever text it already holds.
    pub fn new(store: S, surface: E) -> Self {
        Self {
            store,
            surface,
            current: None,
            name: NameField::default(),
            listing: Listing::default(),
            listing_error: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn surface(&self) -> &E {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut E {
        &mut self.surface
    }

    pub fn current(&self) -> Option<&RecordId> {
        self.current.as_ref()
    }

    pub fn name(&self) -> &NameField {
        &self.name
    }

    pub fn name_mut(&mut self) -> &mut NameField {
        &mut self.name
    }

    /// Listing as of the last refresh
    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    /// Label for the save button
    pub fn save_label(&self) -> &'static str {
        if self.current.is_some() {
            "Update"
        } else {
            "Save"
        }
    }

    pub fn title(&self) -> String {
        self.name.title()
    }

    /// Re-read every record and rebuild the sorted listing
    pub async fn refresh(&mut self, now: DateTime<Utc>) -> Result<&Listing, EditorError> {
        let records = self.store.list().await?;
        self.listing = Listing::build(records, self.current.as_ref(), now);
        self.listing_error = None;
        debug!(count = self.listing.len(), "Listing refreshed");
        Ok(&self.listing)
    }

    /// The listing failure left behind by the last operation, if any
    ///
    /// Operations that already changed the store or the selection do not
    /// fail when only the listing cannot be rebuilt; the previous listing
    /// stays in place and the error waits here.
    pub fn take_listing_error(&mut self) -> Option<EditorError> {
        self.listing_error.take()
    }

    async fn relist(&mut self, now: DateTime<Utc>) {
        if let Err(e) = self.refresh(now).await.map(|_| ()) {
            warn!(error = %e, "Listing refresh failed");
            self.listing_error = Some(e);
        }
    }

    /// Load a stored diagram into the editor
    ///
    /// An absent id is [`EditorError::NotFound`] and leaves the selection
    /// untouched. Returns the opened record.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn open(
        &mut self,
        id: &RecordId,
        now: DateTime<Utc>,
    ) -> Result<DiagramRecord, EditorError> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| EditorError::not_found(id.as_str()))?;

        self.current = Some(record.id.clone());
        self.name.reset(record.name.clone());
        self.surface.set_value(&record.content);
        self.relist(now).await;

        info!(name = %record.name, "Diagram opened");
        Ok(record)
    }

    /// Write the editor contents to the store
    ///
    /// Creates a record when nothing is selected. Otherwise overwrites the
    /// selected record, keeping its `created` time; a name change must be
    /// confirmed first, and declining reverts the name field.
    #[instrument(skip_all, fields(current = ?self.current.as_ref().map(RecordId::as_str)))]
    pub async fn save(
        &mut self,
        confirm: &mut dyn Confirm,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, EditorError> {
        let name = effective_name(self.name.value());
        let content = self.surface.value();

        let Some(id) = self.current.clone() else {
            let record = DiagramRecord::new(RecordId::generate(), name, content, now);
            let id = self.store.put(record).await?;
            self.current = Some(id.clone());
            self.name.commit();
            self.relist(now).await;
            info!(id = %id, "Diagram created");
            return Ok(SaveOutcome::Created(id));
        };

        let existing = self.store.get(&id).await?;
        if let Some(existing) = &existing {
            if existing.name != name {
                let request = Confirmation::Rename {
                    from: existing.name.clone(),
                    to: name.clone(),
                };
                if !confirm.confirm(&request) {
                    debug!(id = %id, "Rename declined");
                    self.name.reset(existing.name.clone());
                    return Ok(SaveOutcome::Declined);
                }
            }
        }

        let created = existing.as_ref().map_or(now, |record| record.created);
        let record = DiagramRecord {
            id: id.clone(),
            name,
            content,
            created,
            last_modified: Some(now.max(created)),
        };
        self.store.put(record).await?;
        self.name.commit();
        self.relist(now).await;
        info!(id = %id, reinserted = existing.is_none(), "Diagram updated");
        Ok(SaveOutcome::Updated(id))
    }

    /// Save the editor contents as a new record named `<name> (copy)`
    pub async fn save_as(&mut self, now: DateTime<Utc>) -> Result<RecordId, EditorError> {
        let name = copy_name(self.name.value());
        let record = DiagramRecord::new(RecordId::generate(), name.clone(), self.surface.value(), now);
        let id = self.store.put(record).await?;

        self.current = Some(id.clone());
        self.name.reset(name);
        self.relist(now).await;
        info!(id = %id, "Diagram copied");
        Ok(id)
    }

    /// Delete a stored diagram after confirmation
    ///
    /// Deleting the current selection resets the editor to a new diagram.
    #[instrument(skip_all, fields(id = %id))]
    pub async fn delete(
        &mut self,
        id: &RecordId,
        confirm: &mut dyn Confirm,
        now: DateTime<Utc>,
    ) -> Result<DeleteOutcome, EditorError> {
        let Some(record) = self.store.get(id).await? else {
            self.relist(now).await;
            return Err(EditorError::not_found(id.as_str()));
        };

        let request = Confirmation::Delete {
            name: record.display_name().to_string(),
        };
        if !confirm.confirm(&request) {
            debug!("Delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        self.store.delete(id).await?;
        let cleared_selection = self.current.as_ref() == Some(id);
        if cleared_selection {
            self.reset_to_new();
        }
        self.relist(now).await;
        info!(cleared_selection, "Diagram deleted");
        Ok(DeleteOutcome::Deleted { cleared_selection })
    }

    /// Delete the current selection, if any
    pub async fn delete_current(
        &mut self,
        confirm: &mut dyn Confirm,
        now: DateTime<Utc>,
    ) -> Result<DeleteOutcome, EditorError> {
        match self.current.clone() {
            Some(id) => self.delete(&id, confirm, now).await,
            None => Ok(DeleteOutcome::NothingSelected),
        }
    }

    /// Start a fresh, unsaved diagram; nothing is deleted
    pub async fn new_diagram(&mut self, now: DateTime<Utc>) -> Result<(), EditorError> {
        self.reset_to_new();
        self.relist(now).await;
        Ok(())
    }

    fn reset_to_new(&mut self) {
        self.current = None;
        self.name.reset(DEFAULT_NAME);
        self.surface.set_value(PLACEHOLDER_CONTENT);
    }
}
