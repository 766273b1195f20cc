//! LCA Store - durable keyed storage of impact results
//!
//! Provides:
//! - A two-tier [`ResultStore`] (hot most-recent slot + keyed map)
//! - The [`StorageBackend`] seam with JSON-file and in-memory implementations
//! - Draft persistence for the input wizard
//!
//! # Example
//!
//! ```rust
//! use lca_core::{ProjectInput, ScoringEngine};
//! use lca_store::{MemoryBackend, ResultStore};
//!
//! let store = ResultStore::open(MemoryBackend::new()).unwrap();
//! let result = ScoringEngine::seeded(1)
//!     .score(&ProjectInput::create().with_name("Rod"))
//!     .unwrap();
//! store.put(result.clone()).unwrap();
//! assert_eq!(store.get(&result.project_id).unwrap(), result);
//! ```

#![warn(unreachable_pub)]

pub mod backend;
pub mod error;
pub mod store;

pub use backend::{JsonFileBackend, MemoryBackend, Snapshot, StorageBackend, SNAPSHOT_VERSION};
pub use error::StoreError;
pub use store::{ResultStore, StoreStats, Tier};
