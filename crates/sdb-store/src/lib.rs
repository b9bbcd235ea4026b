//! Entity storage for sdb.
//!
//! The variable store and its command log never talk to a concrete backend.
//! They go through the [`EntityStore`] trait, a small key/value interface in
//! the shape of a document datastore: entities are addressed by a
//! `(kind, name)` [`EntityKey`], carry named JSON properties, and can be
//! queried per kind with an optional equality [`Filter`].
//!
//! # Storage Backends
//!
//! - [`InMemoryEntityStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`FileEntityStore`] -- the same map, snapshotted to a JSON file after
//!   every mutation
//!
//! # Design Rules
//!
//! 1. `put` is an upsert; `delete` of a missing key is not an error.
//! 2. Query results are ordered by key.
//! 3. The store never interprets entity properties beyond filter equality.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod entity;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use entity::{Entity, EntityKey, Filter};
pub use error::{StoreError, StoreResult};
pub use file::FileEntityStore;
pub use memory::InMemoryEntityStore;
pub use traits::EntityStore;
