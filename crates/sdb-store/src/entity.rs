use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Address of an entity: its kind (collection) and its name within the kind.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: String,
    pub name: String,
}

impl EntityKey {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// A keyed record with named JSON properties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub key: EntityKey,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl Entity {
    /// Create an entity with no properties.
    pub fn new(key: EntityKey) -> Self {
        Self {
            key,
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property setter.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_property(name, value);
        self
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

/// Selection applied by [`EntityStore::query`](crate::EntityStore::query).
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// Every entity of the queried kind.
    All,
    /// Entities whose `property` is present and equal to `value`.
    Equals { property: String, value: Value },
}

impl Filter {
    pub fn equals(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals {
            property: property.into(),
            value: value.into(),
        }
    }

    /// Whether `entity` passes this filter. Kind is checked by the caller.
    pub fn matches(&self, entity: &Entity) -> bool {
        match self {
            Self::All => true,
            Self::Equals { property, value } => entity.property(property) == Some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_display() {
        let key = EntityKey::new("Variable", "a");
        assert_eq!(key.to_string(), "Variable/a");
    }

    #[test]
    fn keys_order_by_kind_then_name() {
        let mut keys = vec![
            EntityKey::new("Variable", "b"),
            EntityKey::new("CommandStack", "undo"),
            EntityKey::new("Variable", "a"),
        ];
        keys.sort();
        assert_eq!(keys[0].kind, "CommandStack");
        assert_eq!(keys[1].name, "a");
        assert_eq!(keys[2].name, "b");
    }

    #[test]
    fn property_builder() {
        let entity = Entity::new(EntityKey::new("Variable", "a")).with_property("value", "10");
        assert_eq!(entity.property("value"), Some(&json!("10")));
        assert!(entity.property("missing").is_none());
    }

    #[test]
    fn equals_filter_is_exact() {
        let entity = Entity::new(EntityKey::new("Variable", "a")).with_property("value", "10");
        assert!(Filter::All.matches(&entity));
        assert!(Filter::equals("value", "10").matches(&entity));
        assert!(!Filter::equals("value", "1").matches(&entity));
        assert!(!Filter::equals("value", "10 ").matches(&entity));
        assert!(!Filter::equals("other", "10").matches(&entity));
    }

    #[test]
    fn entity_json_shape() {
        let entity = Entity::new(EntityKey::new("Variable", "a")).with_property("value", "10");
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(
            json,
            json!({"key": {"kind": "Variable", "name": "a"}, "properties": {"value": "10"}})
        );
    }
}
