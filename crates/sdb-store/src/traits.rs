use std::sync::Arc;

use crate::entity::{Entity, EntityKey, Filter};
use crate::error::StoreResult;

/// Key/value entity store.
///
/// All implementations must satisfy these invariants:
/// - `put` replaces any existing entity under the same key.
/// - `delete` is idempotent; deleting a missing key returns `Ok(false)`.
/// - `query` returns only entities of the requested kind, ordered by key.
/// - All I/O errors are propagated, never silently ignored.
///
/// Individual calls are atomic, but sequences of calls are not. Callers that
/// need several calls to appear as one unit must serialise them themselves.
pub trait EntityStore: Send + Sync {
    /// Read an entity by key.
    ///
    /// Returns `Ok(None)` if the entity does not exist.
    fn get(&self, key: &EntityKey) -> StoreResult<Option<Entity>>;

    /// Insert or replace an entity.
    fn put(&self, entity: &Entity) -> StoreResult<()>;

    /// Delete an entity by key. Returns `true` if the entity existed.
    fn delete(&self, key: &EntityKey) -> StoreResult<bool>;

    /// All entities of `kind` that pass `filter`.
    fn query(&self, kind: &str, filter: &Filter) -> StoreResult<Vec<Entity>>;

    /// Number of entities of `kind` that pass `filter`.
    ///
    /// Default implementation materialises the query. Backends may override
    /// to count without cloning entities.
    fn count(&self, kind: &str, filter: &Filter) -> StoreResult<usize> {
        Ok(self.query(kind, filter)?.len())
    }

    /// Delete several entities.
    ///
    /// Default implementation calls `delete()` for each key. Backends may
    /// override for better performance (e.g., a single flush).
    fn delete_batch(&self, keys: &[EntityKey]) -> StoreResult<()> {
        for key in keys {
            self.delete(key)?;
        }
        Ok(())
    }
}

impl<T: EntityStore + ?Sized> EntityStore for Box<T> {
    fn get(&self, key: &EntityKey) -> StoreResult<Option<Entity>> {
        (**self).get(key)
    }

    fn put(&self, entity: &Entity) -> StoreResult<()> {
        (**self).put(entity)
    }

    fn delete(&self, key: &EntityKey) -> StoreResult<bool> {
        (**self).delete(key)
    }

    fn query(&self, kind: &str, filter: &Filter) -> StoreResult<Vec<Entity>> {
        (**self).query(kind, filter)
    }

    fn count(&self, kind: &str, filter: &Filter) -> StoreResult<usize> {
        (**self).count(kind, filter)
    }

    fn delete_batch(&self, keys: &[EntityKey]) -> StoreResult<()> {
        (**self).delete_batch(keys)
    }
}

impl<T: EntityStore + ?Sized> EntityStore for Arc<T> {
    fn get(&self, key: &EntityKey) -> StoreResult<Option<Entity>> {
        (**self).get(key)
    }

    fn put(&self, entity: &Entity) -> StoreResult<()> {
        (**self).put(entity)
    }

    fn delete(&self, key: &EntityKey) -> StoreResult<bool> {
        (**self).delete(key)
    }

    fn query(&self, kind: &str, filter: &Filter) -> StoreResult<Vec<Entity>> {
        (**self).query(kind, filter)
    }

    fn count(&self, kind: &str, filter: &Filter) -> StoreResult<usize> {
        (**self).count(kind, filter)
    }

    fn delete_batch(&self, keys: &[EntityKey]) -> StoreResult<()> {
        (**self).delete_batch(keys)
    }
}
