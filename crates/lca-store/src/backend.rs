//! Durable storage backends
//!
//! A backend moves whole [`Snapshot`]s in and out of a medium that outlives
//! the process. The store above it holds the working copy; backends only see
//! `load` at startup and `save` after every mutation.

use crate::error::StoreError;
use lca_core::{ImpactResult, ProjectId, ProjectInput};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Format version written by this build
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything the store persists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Format version
    pub version: u32,
    /// Most recently stored result
    #[serde(default)]
    pub latest: Option<ImpactResult>,
    /// All results by id
    #[serde(default)]
    pub results: BTreeMap<ProjectId, ImpactResult>,
    /// In-progress wizard input
    #[serde(default)]
    pub draft: Option<ProjectInput>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            latest: None,
            results: BTreeMap::new(),
            draft: None,
        }
    }
}

/// Durable medium for snapshots
pub trait StorageBackend: Send + Sync {
    /// Read the persisted snapshot; an empty medium yields `Snapshot::default()`
    ///
    /// # Errors
    /// [`StoreError`] when the medium is unreadable or holds corrupt data.
    fn load(&self) -> Result<Snapshot, StoreError>;

    /// Replace the persisted snapshot
    ///
    /// # Errors
    /// [`StoreError`] when the medium cannot be written.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}

/// Process-local backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: Mutex<Option<Snapshot>>,
    saves: Mutex<u64>,
}

impl MemoryBackend {
    /// Empty backend
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-seeded with `snapshot`
    #[must_use]
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            inner: Mutex::new(Some(snapshot)),
            saves: Mutex::new(0),
        }
    }

    /// Last saved snapshot
    #[must_use]
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.inner.lock().clone()
    }

    /// Number of `save` calls so far
    #[must_use]
    pub fn save_count(&self) -> u64 {
        *self.saves.lock()
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self) -> Result<Snapshot, StoreError> {
        Ok(self.inner.lock().clone().unwrap_or_default())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        *self.inner.lock() = Some(snapshot.clone());
        *self.saves.lock() += 1;
        Ok(())
    }
}

/// Single JSON document on the local filesystem
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Backend persisting to `path`
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "lca-storage".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StorageBackend for JsonFileBackend {
    fn load(&self) -> Result<Snapshot, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No snapshot on disk, starting empty");
                return Ok(Snapshot::default());
            }
            Err(err) => return Err(StoreError::io(&self.path, err)),
        };

        let snapshot: Snapshot =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec_pretty(snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
        }

        let temp = self.temp_path();
        let mut file = fs::File::create(&temp).map_err(|err| StoreError::io(&temp, err))?;
        file.write_all(&encoded)
            .and_then(|()| file.sync_all())
            .map_err(|err| StoreError::io(&temp, err))?;
        fs::rename(&temp, &self.path).map_err(|err| StoreError::io(&self.path, err))?;
        Ok(())
    }
}
