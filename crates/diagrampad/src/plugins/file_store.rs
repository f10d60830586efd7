//! Flat-file record store
//!
//! One JSON document per record, `<id>.json`, inside a store directory that
//! also carries a `store.json` metadata file with the schema version.
//! Writes land in a temporary sibling first and are renamed over the target,
//! so readers never observe a half-written record.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::{debug, info, span, trace, warn, Instrument, Level};

use crate::core::{DiagramRecord, RecordId, RecordStore, StoreError};

/// Schema version written by this build
pub const STORE_VERSION: u32 = 1;

const META_FILENAME: &str = "store.json";
const META_STEM: &str = "store";
const RECORD_EXTENSION: &str = "json";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize, Deserialize)]
struct StoreMeta {
    version: u32,
}

/// Record store backed by a directory of JSON files
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating or upgrading as needed) the store at `root`
    ///
    /// Fails with [`StoreError::Unavailable`] when the directory cannot be
    /// created, is not a directory, or was written by a newer schema.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        let open_span = span!(Level::INFO, "open_file_store", root = %root.display());
        Self::open_at(root).instrument(open_span).await
    }

    async fn open_at(root: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&root).await.map_err(|e| {
            StoreError::unavailable(format!(
                "cannot create store directory {}: {}",
                root.display(),
                e
            ))
        })?;

        let metadata = fs::metadata(&root).await.map_err(|e| {
            StoreError::unavailable(format!("cannot inspect {}: {}", root.display(), e))
        })?;
        if !metadata.is_dir() {
            return Err(StoreError::unavailable(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let store = Self { root };
        let version = store.read_version().await?;
        match version {
            Some(v) if v == STORE_VERSION => {
                debug!(version = v, "Store schema is current");
            }
            Some(v) if v > STORE_VERSION => {
                return Err(StoreError::unavailable(format!(
                    "store schema version {} is newer than supported version {}",
                    v, STORE_VERSION
                )));
            }
            previous => {
                store.upgrade(previous.unwrap_or(0)).await?;
            }
        }

        info!("Store opened");
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_version(&self) -> Result<Option<u32>, StoreError> {
        let meta_path = self.root.join(META_FILENAME);
        match fs::read(&meta_path).await {
            Ok(bytes) => {
                let meta: StoreMeta = serde_json::from_slice(&bytes).map_err(|e| {
                    StoreError::unavailable(format!(
                        "unreadable store metadata {}: {}",
                        meta_path.display(),
                        e
                    ))
                })?;
                Ok(Some(meta.version))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::unavailable(format!(
                "cannot read store metadata {}: {}",
                meta_path.display(),
                e
            ))),
        }
    }

    /// Bring an older (or brand new) directory up to [`STORE_VERSION`]
    ///
    /// Version 0 is a directory without metadata. Its record files already
    /// use the current layout, so the upgrade only stamps the version.
    async fn upgrade(&self, from: u32) -> Result<(), StoreError> {
        info!(from, to = STORE_VERSION, "Upgrading store schema");
        let meta = StoreMeta {
            version: STORE_VERSION,
        };
        let bytes = serde_json::to_vec_pretty(&meta)?;
        self.write_atomic(&self.root.join(META_FILENAME), &bytes)
            .await
            .map_err(|e| StoreError::unavailable(format!("cannot write store metadata: {}", e)))
    }

    fn record_path(&self, id: &RecordId) -> Result<PathBuf, StoreError> {
        validate_id(id)?;
        Ok(self
            .root
            .join(format!("{}.{}", id.as_str(), RECORD_EXTENSION)))
    }

    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp = path.with_file_name(format!(
            ".{}.{}.{}.tmp",
            file_name,
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        fs::write(&temp, bytes).await?;
        if let Err(e) = fs::rename(&temp, path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn read_record(&self, path: &Path) -> Result<Option<DiagramRecord>, StoreError> {
        match fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    path: path.to_path_buf(),
                    source,
                }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Reject ids that are empty, hidden, reserved, or could leave the directory
fn validate_id(id: &RecordId) -> Result<(), StoreError> {
    let raw = id.as_str();
    let bad = raw.trim().is_empty()
        || raw.starts_with('.')
        || raw == META_STEM
        || raw.contains(['/', '\\', '\0']);
    if bad {
        return Err(StoreError::invalid_id(raw));
    }
    Ok(())
}

fn is_record_file(path: &Path) -> bool {
    let is_json = path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXTENSION);
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    is_json && name != META_FILENAME && !name.starts_with('.')
}

#[async_trait]
impl RecordStore for FileStore {
    async fn put(&self, record: DiagramRecord) -> Result<RecordId, StoreError> {
        let path = self.record_path(&record.id)?;
        record.validate()?;

        let bytes = serde_json::to_vec_pretty(&record)?;
        self.write_atomic(&path, &bytes).await?;
        debug!(id = %record.id, bytes = bytes.len(), "Record written");
        Ok(record.id)
    }

    async fn get(&self, id: &RecordId) -> Result<Option<DiagramRecord>, StoreError> {
        let path = self.record_path(id)?;
        let record = self.read_record(&path).await?;
        trace!(id = %id, found = record.is_some(), "Record read");
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<DiagramRecord>, StoreError> {
        let mut paths = Vec::new();
        let mut dir = fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if is_record_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            // A record deleted between read_dir and read is simply gone
            if let Some(record) = self.read_record(&path).await? {
                records.push(record);
            }
        }
        debug!(count = records.len(), "Records listed");
        Ok(records)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        let path = self.record_path(id)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(id = %id, "Record deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(id = %id, "Delete of absent record");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
