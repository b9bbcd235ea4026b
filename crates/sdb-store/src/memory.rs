use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::entity::{Entity, EntityKey, Filter};
use crate::error::{StoreError, StoreResult};
use crate::traits::EntityStore;

/// In-memory, `BTreeMap`-based entity store.
///
/// Intended for tests and embedding. All entities are held in memory behind a
/// `RwLock` for safe concurrent access. Entities are cloned on read/write.
pub struct InMemoryEntityStore {
    entities: RwLock<BTreeMap<EntityKey, Entity>>,
}

impl InMemoryEntityStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a store pre-populated with `entities`. Later duplicates win.
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let map = entities
            .into_iter()
            .map(|entity| (entity.key.clone(), entity))
            .collect();
        Self {
            entities: RwLock::new(map),
        }
    }

    /// Number of entities currently stored, across all kinds.
    pub fn len(&self) -> usize {
        self.entities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every stored entity, ordered by key.
    pub fn snapshot(&self) -> StoreResult<Vec<Entity>> {
        Ok(self.read_map()?.values().cloned().collect())
    }

    /// Apply `change` to a copy of the map, hand the copy to `commit`, and
    /// install it only if `commit` succeeds. Readers never see the copy
    /// before it is installed, and a failed commit leaves the map untouched.
    pub(crate) fn transact<T>(
        &self,
        change: impl FnOnce(&mut BTreeMap<EntityKey, Entity>) -> T,
        commit: impl FnOnce(&BTreeMap<EntityKey, Entity>) -> StoreResult<()>,
    ) -> StoreResult<T> {
        let mut map = self.write_map()?;
        let mut next = map.clone();
        let out = change(&mut next);
        commit(&next)?;
        *map = next;
        Ok(out)
    }

    fn read_map(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<EntityKey, Entity>>> {
        self.entities.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_map(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<EntityKey, Entity>>> {
        self.entities.write().map_err(|_| StoreError::LockPoisoned)
    }
}

/// Entities of `kind` in key order, using the map's ordering on `(kind, name)`.
fn of_kind<'a>(
    map: &'a BTreeMap<EntityKey, Entity>,
    kind: &'a str,
) -> impl Iterator<Item = &'a Entity> + 'a {
    map.range(EntityKey::new(kind, "")..)
        .take_while(move |(key, _)| key.kind == kind)
        .map(|(_, entity)| entity)
}

impl Default for InMemoryEntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore for InMemoryEntityStore {
    fn get(&self, key: &EntityKey) -> StoreResult<Option<Entity>> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn put(&self, entity: &Entity) -> StoreResult<()> {
        self.write_map()?.insert(entity.key.clone(), entity.clone());
        Ok(())
    }

    fn delete(&self, key: &EntityKey) -> StoreResult<bool> {
        Ok(self.write_map()?.remove(key).is_some())
    }

    fn query(&self, kind: &str, filter: &Filter) -> StoreResult<Vec<Entity>> {
        let map = self.read_map()?;
        Ok(of_kind(&map, kind)
            .filter(|entity| filter.matches(entity))
            .cloned()
            .collect())
    }

    fn count(&self, kind: &str, filter: &Filter) -> StoreResult<usize> {
        let map = self.read_map()?;
        Ok(of_kind(&map, kind)
            .filter(|entity| filter.matches(entity))
            .count())
    }

    fn delete_batch(&self, keys: &[EntityKey]) -> StoreResult<()> {
        let mut map = self.write_map()?;
        for key in keys {
            map.remove(key);
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryEntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryEntityStore")
            .field("entity_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn variable(name: &str, value: &str) -> Entity {
        Entity::new(EntityKey::new("Variable", name)).with_property("value", value)
    }

    // -----------------------------------------------------------------------
    // Core CRUD
    // -----------------------------------------------------------------------

    #[test]
    fn put_and_get() {
        let store = InMemoryEntityStore::new();
        let entity = variable("a", "10");
        store.put(&entity).unwrap();

        let read_back = store.get(&entity.key).unwrap().expect("should exist");
        assert_eq!(read_back, entity);
    }

    #[test]
    fn get_missing_returns_none() {
        let store = InMemoryEntityStore::new();
        assert!(store.get(&EntityKey::new("Variable", "nope")).unwrap().is_none());
    }

    #[test]
    fn put_replaces_existing() {
        let store = InMemoryEntityStore::new();
        store.put(&variable("a", "10")).unwrap();
        store.put(&variable("a", "30")).unwrap();

        assert_eq!(store.len(), 1);
        let read_back = store.get(&EntityKey::new("Variable", "a")).unwrap().unwrap();
        assert_eq!(read_back.property("value"), Some(&json!("30")));
    }

    #[test]
    fn delete_is_idempotent() {
        let store = InMemoryEntityStore::new();
        let entity = variable("a", "10");
        store.put(&entity).unwrap();

        assert!(store.delete(&entity.key).unwrap());
        assert!(!store.delete(&entity.key).unwrap());
        assert!(store.is_empty());
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[test]
    fn query_is_scoped_to_kind() {
        let store = InMemoryEntityStore::new();
        store.put(&variable("a", "10")).unwrap();
        store.put(&variable("b", "20")).unwrap();
        store
            .put(&Entity::new(EntityKey::new("CommandStack", "undo")).with_property("value", "10"))
            .unwrap();
        store
            .put(&Entity::new(EntityKey::new("Variables", "c")).with_property("value", "10"))
            .unwrap();

        let all = store.query("Variable", &Filter::All).unwrap();
        let names: Vec<&str> = all.iter().map(|e| e.key.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn query_with_equality_filter() {
        let store = InMemoryEntityStore::new();
        store.put(&variable("a", "10")).unwrap();
        store.put(&variable("b", "20")).unwrap();
        store.put(&variable("c", "10")).unwrap();

        let tens = store.query("Variable", &Filter::equals("value", "10")).unwrap();
        assert_eq!(tens.len(), 2);
        assert_eq!(store.count("Variable", &Filter::equals("value", "10")).unwrap(), 2);
        assert_eq!(store.count("Variable", &Filter::equals("value", "30")).unwrap(), 0);
    }

    #[test]
    fn delete_batch_removes_all_listed() {
        let store = InMemoryEntityStore::new();
        store.put(&variable("a", "1")).unwrap();
        store.put(&variable("b", "2")).unwrap();
        store.put(&variable("c", "3")).unwrap();

        store
            .delete_batch(&[
                EntityKey::new("Variable", "a"),
                EntityKey::new("Variable", "c"),
                EntityKey::new("Variable", "missing"),
            ])
            .unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.get(&EntityKey::new("Variable", "b")).unwrap().is_some());
    }

    #[test]
    fn from_entities_and_snapshot() {
        let store =
            InMemoryEntityStore::from_entities(vec![variable("b", "2"), variable("a", "1")]);
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].key.name, "a");
    }

    #[test]
    fn failed_commit_leaves_map_untouched() {
        let store = InMemoryEntityStore::new();
        store.put(&variable("a", "1")).unwrap();

        let result = store.transact(
            |map| map.clear(),
            |next| {
                assert!(next.is_empty());
                Err(StoreError::Serialization("refused".into()))
            },
        );
        assert!(result.is_err());
        assert_eq!(store.len(), 1);

        let removed = store
            .transact(|map| map.remove(&EntityKey::new("Variable", "a")).is_some(), |_| Ok(()))
            .unwrap();
        assert!(removed);
        assert!(store.is_empty());
    }

    #[test]
    fn works_through_dyn_box() {
        let store: Box<dyn EntityStore> = Box::new(InMemoryEntityStore::new());
        store.put(&variable("a", "1")).unwrap();
        assert_eq!(store.count("Variable", &Filter::All).unwrap(), 1);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryEntityStore::new();
        store.put(&variable("a", "1")).unwrap();
        let dbg = format!("{:?}", store);
        assert!(dbg.contains("InMemoryEntityStore"));
        assert!(dbg.contains("1"));
    }
}
