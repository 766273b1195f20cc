//! Two-tier result store
//!
//! Tier 1 is a single hot slot holding the most recently stored result (the
//! common "just generated, now viewing" path). Tier 2 is the keyed map of every
//! result. Both tiers live in one [`Snapshot`] that is written through to the
//! backend on every mutation, so they can never drift apart.

use crate::backend::{Snapshot, StorageBackend};
use crate::error::StoreError;
use lca_core::{ImpactResult, ProjectId, ProjectInput};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Where a lookup was answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Most-recent slot
    Hot,
    /// Keyed map
    Durable,
}

/// Store statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of stored results
    pub entry_count: usize,
    /// Whether a draft is persisted
    pub has_draft: bool,
}

/// Keyed, durable storage of impact results
pub struct ResultStore {
    backend: Arc<dyn StorageBackend>,
    state: RwLock<Snapshot>,
}

impl fmt::Debug for ResultStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultStore")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl ResultStore {
    /// Open a store over `backend`, loading whatever it already holds
    ///
    /// # Errors
    /// [`StoreError`] if the backend cannot be read.
    pub fn open<B: StorageBackend + 'static>(backend: B) -> Result<Self, StoreError> {
        Self::open_shared(Arc::new(backend))
    }

    /// [`ResultStore::open`] over a backend shared with the caller
    ///
    /// # Errors
    /// [`StoreError`] if the backend cannot be read.
    pub fn open_shared(backend: Arc<dyn StorageBackend>) -> Result<Self, StoreError> {
        let mut snapshot = backend.load()?;

        // A hot slot without a keyed entry means the snapshot was edited by
        // hand; keep the tiers consistent.
        if let Some(latest) = &snapshot.latest {
            snapshot
                .results
                .entry(latest.project_id.clone())
                .or_insert_with(|| latest.clone());
        }

        tracing::info!(results = snapshot.results.len(), "Opened result store");
        Ok(Self {
            backend,
            state: RwLock::new(snapshot),
        })
    }

    /// Store `result` under its id, replacing any previous entry
    ///
    /// Updates both tiers and persists before returning. On a persistence
    /// failure neither tier changes.
    ///
    /// # Errors
    /// [`StoreError`] if the backend cannot be written.
    pub fn put(&self, result: ImpactResult) -> Result<(), StoreError> {
        let id = result.project_id.clone();
        let replaced = self.commit(|next| {
            next.latest = Some(result.clone());
            next.results.insert(result.project_id.clone(), result).is_some()
        })?;

        tracing::info!(project_id = %id, replaced, "Stored result");
        Ok(())
    }

    /// Fetch the result stored under `id`
    ///
    /// # Errors
    /// [`StoreError::NotFound`] when no result has that id.
    pub fn get(&self, id: &ProjectId) -> Result<ImpactResult, StoreError> {
        self.lookup(id).map(|(result, _)| result)
    }

    /// [`ResultStore::get`] also reporting which tier answered
    ///
    /// # Errors
    /// [`StoreError::NotFound`] when no result has that id.
    pub fn lookup(&self, id: &ProjectId) -> Result<(ImpactResult, Tier), StoreError> {
        let state = self.state.read();

        if let Some(hot) = state.latest.as_ref().filter(|r| &r.project_id == id) {
            tracing::debug!(project_id = %id, "Hot slot hit");
            return Ok((hot.clone(), Tier::Hot));
        }

        match state.results.get(id) {
            Some(result) => {
                tracing::debug!(project_id = %id, "Durable map hit");
                Ok((result.clone(), Tier::Durable))
            }
            None => {
                tracing::debug!(project_id = %id, "Result not found");
                Err(StoreError::NotFound(id.clone()))
            }
        }
    }

    /// Most recently stored result
    #[must_use]
    pub fn latest(&self) -> Option<ImpactResult> {
        self.state.read().latest.clone()
    }

    /// Remove every result and the draft
    ///
    /// # Errors
    /// [`StoreError`] if the backend cannot be written.
    pub fn clear(&self) -> Result<(), StoreError> {
        let removed = self.commit(|next| {
            let removed = next.results.len();
            *next = Snapshot::default();
            removed
        })?;
        tracing::info!(removed, "Cleared result store");
        Ok(())
    }

    /// Persist the in-progress wizard input
    ///
    /// # Errors
    /// [`StoreError`] if the backend cannot be written.
    pub fn save_draft(&self, draft: &ProjectInput) -> Result<(), StoreError> {
        self.commit(|next| next.draft = Some(draft.clone()))
    }

    /// Forget the persisted wizard input
    ///
    /// # Errors
    /// [`StoreError`] if the backend cannot be written.
    pub fn clear_draft(&self) -> Result<(), StoreError> {
        self.commit(|next| next.draft = None)
    }

    /// Persisted wizard input, if any
    #[must_use]
    pub fn draft(&self) -> Option<ProjectInput> {
        self.state.read().draft.clone()
    }

    /// Stored ids in ascending order
    #[must_use]
    pub fn ids(&self) -> Vec<ProjectId> {
        self.state.read().results.keys().cloned().collect()
    }

    /// Number of stored results
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().results.len()
    }

    /// Whether no results are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest timestamp among stored ids, used to seed id generation
    #[must_use]
    pub fn newest_id_millis(&self) -> Option<i64> {
        self.state
            .read()
            .results
            .keys()
            .filter_map(ProjectId::millis)
            .max()
    }

    /// Current statistics
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let state = self.state.read();
        StoreStats {
            entry_count: state.results.len(),
            has_draft: state.draft.is_some(),
        }
    }

    /// Apply `change` to a copy of the state, persist it, then publish it
    fn commit<T>(&self, change: impl FnOnce(&mut Snapshot) -> T) -> Result<T, StoreError> {
        let mut state = self.state.write();
        let mut next = state.clone();
        let out = change(&mut next);
        if let Err(err) = self.backend.save(&next) {
            tracing::error!(error = %err, "Failed to persist result store");
            return Err(err);
        }
        *state = next;
        Ok(out)
    }
}
