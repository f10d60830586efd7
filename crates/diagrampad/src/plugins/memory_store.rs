//! In-process record store
//!
//! Keeps records in a map behind an async lock. Nothing survives the
//! process; useful for tests and for hosts without a filesystem.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::core::{DiagramRecord, RecordId, RecordStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<RecordId, DiagramRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `records`
    pub fn with_records(records: impl IntoIterator<Item = DiagramRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self {
            records: RwLock::new(map),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn put(&self, record: DiagramRecord) -> Result<RecordId, StoreError> {
        record.validate()?;
        let id = record.id.clone();
        self.records.write().await.insert(id.clone(), record);
        Ok(id)
    }

    async fn get(&self, id: &RecordId) -> Result<Option<DiagramRecord>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<DiagramRecord>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        self.records.write().await.remove(id);
        Ok(())
    }
}
