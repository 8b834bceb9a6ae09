//! # Storage Driver Errors

use thiserror::Error;

/// Result type for storage driver operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage driver errors
///
/// Every variant that concerns a single key carries that key, so the failing
/// key can be recovered from the error itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    // Construction
    #[error("Invalid storage config: {0}")]
    InvalidConfig(String),

    // Containment
    #[error("Path {path} is out of storage root {root}")]
    PathOutOfRoot { key: String, path: String, root: String },

    // Object errors
    #[error("Key not found: {0}")]
    NotFound(String),

    // I/O errors
    #[error("Failed to read {key}: {reason}")]
    ReadFailure { key: String, reason: String },

    #[error("Failed to write {key}: {reason}")]
    WriteFailure { key: String, reason: String },

    #[error("Failed to create directory {path}: {reason}")]
    DirectoryCreationFailure { path: String, reason: String },
}

impl StorageError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StorageError::InvalidConfig(_) => "DEPOT_STORAGE_INVALID_CONFIG",
            StorageError::PathOutOfRoot { .. } => "DEPOT_STORAGE_PATH_OUT_OF_ROOT",
            StorageError::NotFound(_) => "DEPOT_STORAGE_NOT_FOUND",
            StorageError::ReadFailure { .. } => "DEPOT_STORAGE_READ_FAILED",
            StorageError::WriteFailure { .. } => "DEPOT_STORAGE_WRITE_FAILED",
            StorageError::DirectoryCreationFailure { .. } => "DEPOT_STORAGE_MKDIR_FAILED",
        }
    }

    /// The key that caused the failure, if the error concerns one
    pub fn key(&self) -> Option<&str> {
        match self {
            StorageError::PathOutOfRoot { key, .. }
            | StorageError::ReadFailure { key, .. }
            | StorageError::WriteFailure { key, .. } => Some(key.as_str()),
            StorageError::NotFound(key) => Some(key.as_str()),
            StorageError::InvalidConfig(_) | StorageError::DirectoryCreationFailure { .. } => None,
        }
    }

    pub(crate) fn read(key: &str, err: impl std::fmt::Display) -> Self {
        StorageError::ReadFailure {
            key: key.to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn write(key: &str, err: impl std::fmt::Display) -> Self {
        StorageError::WriteFailure {
            key: key.to_string(),
            reason: err.to_string(),
        }
    }
}
