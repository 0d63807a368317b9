use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::types::EntityId;

/// A record served by the admin API.
///
/// Only `id` is interpreted by the data layer; every other column is kept as
/// raw JSON and rendered by whatever table is showing the resource.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Entity {
    #[must_use]
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            fields: Map::new(),
        }
    }

    /// Builder-style helper used when seeding rows.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Decodes one row of a list response.
    ///
    /// Returns `None` when the row is not an object or carries no positive
    /// integer `id` (numeric strings are accepted).
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            return None;
        };
        let raw_id = fields.remove("id")?;
        let id = match &raw_id {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }?;
        let id = EntityId::new(id).ok()?;
        Some(Self { id, fields })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Returns the string value of a column when it holds one.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Interprets a column as a boolean flag the way the backend encodes them.
    pub fn flag(&self, key: &str) -> bool {
        match self.fields.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
            Some(Value::String(s)) => matches!(s.as_str(), "1" | "true"),
            _ => false,
        }
    }

    /// Human readable label: `name`, then `title`, then `Item <id>`.
    pub fn display_title(&self) -> String {
        ["name", "title"]
            .iter()
            .filter_map(|key| self.str_field(key))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Item {}", self.id))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn from_value_requires_positive_integer_id() {
        assert!(Entity::from_value(json!({"name": "no id"})).is_none());
        assert!(Entity::from_value(json!({"id": 0})).is_none());
        assert!(Entity::from_value(json!([1, 2])).is_none());

        let entity = Entity::from_value(json!({"id": "5", "name": "Brand"})).unwrap();
        assert_eq!(entity.id.get(), 5);
        assert_eq!(entity.str_field("name"), Some("Brand"));
        assert!(entity.get("id").is_none());
    }

    #[test]
    fn display_title_falls_back_in_order() {
        let id = EntityId::new(3).unwrap();
        assert_eq!(
            Entity::new(id).with_field("title", "T").display_title(),
            "T"
        );
        assert_eq!(
            Entity::new(id)
                .with_field("name", "N")
                .with_field("title", "T")
                .display_title(),
            "N"
        );
        assert_eq!(
            Entity::new(id).with_field("name", "  ").display_title(),
            "Item 3"
        );
    }

    #[test]
    fn flag_understands_backend_encodings() {
        let id = EntityId::new(1).unwrap();
        let entity = Entity::new(id)
            .with_field("a", true)
            .with_field("b", 1)
            .with_field("c", "1")
            .with_field("d", "0");
        assert!(entity.flag("a"));
        assert!(entity.flag("b"));
        assert!(entity.flag("c"));
        assert!(!entity.flag("d"));
        assert!(!entity.flag("missing"));
    }

    #[test]
    fn serializes_id_alongside_fields() {
        let entity = Entity::new(EntityId::new(9).unwrap()).with_field("name", "Box");
        assert_eq!(
            serde_json::to_value(&entity).unwrap(),
            json!({"id": 9, "name": "Box"})
        );
    }
}
