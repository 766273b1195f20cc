//! Error types for the result store

use lca_core::ProjectId;
use std::path::PathBuf;

/// Result store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No result stored under the id
    #[error("result not found: {0}")]
    NotFound(ProjectId),

    /// Durable medium could not be read or written
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Persisted snapshot could not be decoded
    #[error("corrupt snapshot at {path}: {source}")]
    Corrupt {
        /// File involved
        path: PathBuf,
        /// Decode error
        #[source]
        source: serde_json::Error,
    },

    /// Snapshot could not be encoded
    #[error("snapshot encoding failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Persisted snapshot written by an unknown format version
    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version on disk
        found: u32,
        /// Version this build writes
        expected: u32,
    },
}

impl StoreError {
    /// Check if the error is a missing entry rather than a storage failure
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = StoreError::NotFound(ProjectId::from_millis(7));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "result not found: proj_7");
    }

    #[test]
    fn io_is_not_not_found() {
        let err = StoreError::io(
            "/tmp/x.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("/tmp/x.json"));
    }
}
