//! Field storage.

use std::collections::HashMap;

use log::debug;

use super::Field;
use crate::error::{FormError, Result};

/// Registered fields in registration order.
///
/// The store never computes validity; it only holds what the validator writes.
#[derive(Debug, Default)]
pub struct FieldStore {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field.
    ///
    /// Returns `Ok(false)` without touching the existing entry when the id is
    /// already registered. Fails when the id is empty.
    pub fn register(&mut self, field: Field) -> Result<bool> {
        if field.id().trim().is_empty() {
            return Err(FormError::invalid_field(field.id(), "field id is empty"));
        }
        if self.index.contains_key(field.id()) {
            debug!("Field '{}' already registered, ignoring", field.id());
            return Ok(false);
        }

        self.index.insert(field.id().to_string(), self.fields.len());
        self.fields.push(field);
        Ok(true)
    }

    pub fn get(&self, id: &str) -> Option<&Field> {
        self.index.get(id).map(|&i| &self.fields[i])
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Field> {
        let i = *self.index.get(id)?;
        self.fields.get_mut(i)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Fields in registration order, optionally filtered by group.
    pub fn all(&self, group: Option<&str>) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.in_group(group)).collect()
    }

    /// Ids of [`all`](Self::all), for callers that mutate while iterating.
    pub fn ids(&self, group: Option<&str>) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.in_group(group))
            .map(|f| f.id().to_string())
            .collect()
    }

    /// Remove a field, keeping the order of the rest.
    pub fn remove(&mut self, id: &str) -> Option<Field> {
        let i = self.index.remove(id)?;
        let field = self.fields.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldSpec;
    use serde_json::json;

    fn field(id: &str, value: serde_json::Value, group: Option<&str>) -> Field {
        let mut spec = FieldSpec::new(id, value);
        if let Some(group) = group {
            spec = spec.group(group);
        }
        Field::new(&spec, "any", None)
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut store = FieldStore::new();
        assert!(store.register(field("a", json!("first"), None)).unwrap());
        assert!(!store.register(field("a", json!("second"), None)).unwrap());

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().value(), &json!("first"));
    }

    #[test]
    fn test_register_rejects_empty_id() {
        let mut store = FieldStore::new();
        let err = store.register(field("", json!(null), None)).unwrap_err();
        assert!(matches!(err, FormError::InvalidField { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_all_filters_by_group_in_order() {
        let mut store = FieldStore::new();
        store.register(field("a", json!(1), Some("g"))).unwrap();
        store.register(field("b", json!(2), None)).unwrap();
        store.register(field("c", json!(3), Some("g"))).unwrap();

        let ids: Vec<_> = store.all(Some("g")).iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(store.all(None).len(), 3);
        assert_eq!(store.ids(Some("g")), vec!["a", "c"]);
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let mut store = FieldStore::new();
        store.register(field("a", json!(1), None)).unwrap();
        store.register(field("b", json!(2), None)).unwrap();
        store.register(field("c", json!(3), None)).unwrap();

        assert!(store.remove("a").is_some());
        assert!(store.remove("a").is_none());
        assert!(!store.exists("a"));
        assert_eq!(store.get("c").unwrap().value(), &json!(3));
        assert_eq!(store.get_mut("b").unwrap().value(), &json!(2));
    }
}
