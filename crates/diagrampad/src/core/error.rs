//! Core error types for the editor
//!
//! Two layers: [`StoreError`] is what a record store backend reports, and
//! [`EditorError`] is what the file manager and editor surface to callers.
//! A record that does not exist is never an error at the store layer; the
//! store answers `None` and the file manager decides whether that matters.

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by a record store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Invalid record id: {id:?}")]
    InvalidId { id: String },

    #[error("Invalid record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("Corrupt record file {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Create a new unavailable-store error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a new invalid-id error
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId { id: id.into() }
    }

    /// Create a new invalid-record error
    pub fn invalid_record(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// True when the store could not be opened or used at all
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Errors surfaced by the file manager and the editor
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Diagram not found: {id}")]
    NotFound { id: String },

    #[error("Store error: {source}")]
    Store {
        #[source]
        source: StoreError,
    },
}

impl EditorError {
    /// Create a new not-found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// True for errors that should stop the editor from starting
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}

impl From<StoreError> for EditorError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Unavailable { message } => Self::StoreUnavailable { message },
            source => Self::Store { source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_error() {
        let error = StoreError::unavailable("directory is a file");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Store unavailable"));
        assert!(error_msg.contains("directory is a file"));
        assert!(error.is_unavailable());
    }

    #[test]
    fn test_invalid_id_error() {
        let error = StoreError::invalid_id("../escape");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Invalid record id"));
        assert!(error_msg.contains("../escape"));
        assert!(!error.is_unavailable());
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io;
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only");
        let error: StoreError = io_err.into();
        assert!(matches!(error, StoreError::Io { .. }));
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("IO error"));
        assert!(error_msg.contains("read-only"));
    }

    #[test]
    fn test_unavailable_stays_distinct_from_not_found() {
        let error: EditorError = StoreError::unavailable("cannot open").into();
        assert!(matches!(error, EditorError::StoreUnavailable { .. }));
        assert!(error.is_fatal());

        let missing = EditorError::not_found("file_1");
        assert!(!missing.is_fatal());
        assert!(format!("{}", missing).contains("file_1"));
    }

    #[test]
    fn test_other_store_errors_wrap() {
        let error: EditorError = StoreError::invalid_id("").into();
        assert!(matches!(error, EditorError::Store { .. }));
        assert!(format!("{}", error).contains("Store error"));
    }
}
