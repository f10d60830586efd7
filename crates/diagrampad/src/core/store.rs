//! Record store contract
//!
//! The editor never talks to a storage engine directly. Everything goes
//! through [`RecordStore`], a small asynchronous key-value contract keyed by
//! [`RecordId`].

use async_trait::async_trait;
use std::sync::Arc;

use super::{DiagramRecord, RecordId, StoreError};

/// Asynchronous key-value store for diagram records
///
/// Implementations must make `put` atomic: a reader sees either the previous
/// record or the new one, never a partial write. `get` answers `None` for an
/// absent id, and `delete` of an absent id succeeds.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or fully overwrite a record, returning its id
    async fn put(&self, record: DiagramRecord) -> Result<RecordId, StoreError>;

    /// Fetch a record by id
    async fn get(&self, id: &RecordId) -> Result<Option<DiagramRecord>, StoreError>;

    /// Fetch every record, in no particular order
    async fn list(&self) -> Result<Vec<DiagramRecord>, StoreError>;

    /// Remove a record
    async fn delete(&self, id: &RecordId) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    async fn put(&self, record: DiagramRecord) -> Result<RecordId, StoreError> {
        (**self).put(record).await
    }

    async fn get(&self, id: &RecordId) -> Result<Option<DiagramRecord>, StoreError> {
        (**self).get(id).await
    }

    async fn list(&self) -> Result<Vec<DiagramRecord>, StoreError> {
        (**self).list().await
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }
}
