//! The variable store: current name → value mapping.
//!
//! Each variable is one entity of kind [`VARIABLE_KIND`] named after the
//! variable, holding its value as a JSON string under [`VALUE_PROPERTY`].
//! This module knows nothing about undo; the command log drives it.

use sdb_store::{Entity, EntityKey, EntityStore, Filter};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};

pub const VARIABLE_KIND: &str = "Variable";
pub const VALUE_PROPERTY: &str = "value";

/// Entity key of the variable `name`.
pub fn variable_key(name: &str) -> EntityKey {
    EntityKey::new(VARIABLE_KIND, name)
}

/// View of the variables held in an [`EntityStore`].
pub struct Variables<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: EntityStore + ?Sized> Variables<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Current value of `name`, or `None` if it is unset.
    pub fn get(&self, name: &str) -> CoreResult<Option<String>> {
        self.store
            .get(&variable_key(name))?
            .map(|entity| value_of(&entity))
            .transpose()
    }

    /// Write `value` for `name` and return the value it replaced.
    pub fn set(&self, name: &str, value: &str) -> CoreResult<Option<String>> {
        let old = self.get(name)?;
        let entity = Entity::new(variable_key(name)).with_property(VALUE_PROPERTY, value);
        self.store.put(&entity)?;
        Ok(old)
    }

    /// Remove `name` and return the value it held. Removing an unset
    /// variable returns `None` and touches nothing.
    pub fn delete(&self, name: &str) -> CoreResult<Option<String>> {
        let old = self.get(name)?;
        if old.is_some() {
            self.store.delete(&variable_key(name))?;
        }
        Ok(old)
    }

    /// Number of variables whose value equals `value` exactly.
    pub fn count_equal(&self, value: &str) -> CoreResult<usize> {
        Ok(self
            .store
            .count(VARIABLE_KIND, &Filter::equals(VALUE_PROPERTY, value))?)
    }

    /// Keys of every variable currently set.
    pub fn keys(&self) -> CoreResult<Vec<EntityKey>> {
        Ok(self
            .store
            .query(VARIABLE_KIND, &Filter::All)?
            .into_iter()
            .map(|entity| entity.key)
            .collect())
    }
}

fn value_of(entity: &Entity) -> CoreResult<String> {
    entity
        .property(VALUE_PROPERTY)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| CoreError::CorruptVariable {
            name: entity.key.name.clone(),
        })
}
