use serde_json::Value;

use crate::{Document, DocumentId, StoredDocument};

/// Read predicate accepted by [`crate::StoreSession::find_by_filter`]
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `field` is exactly `value`
    FieldEquals { field: &'static str, value: Value },
    /// `field` is an array with `value` among its elements
    FieldContains { field: &'static str, value: Value },
    /// Document identifier is one of the given ids
    IdIn(Vec<DocumentId>),
}

impl Filter {
    pub fn field_equals(field: &'static str, value: impl Into<Value>) -> Self {
        Self::FieldEquals {
            field,
            value: value.into(),
        }
    }

    pub fn field_contains(field: &'static str, value: impl Into<Value>) -> Self {
        Self::FieldContains {
            field,
            value: value.into(),
        }
    }

    pub fn id_in(ids: impl IntoIterator<Item = DocumentId>) -> Self {
        Self::IdIn(ids.into_iter().collect())
    }

    /// Evaluate the predicate against a document held in memory
    pub fn matches(&self, document: &StoredDocument) -> bool {
        match self {
            Filter::FieldEquals { field, value } => document.body.get(*field) == Some(value),
            Filter::FieldContains { field, value } => match document.body.get(*field) {
                Some(Value::Array(items)) => items.contains(value),
                _ => false,
            },
            Filter::IdIn(ids) => ids.contains(&document.id),
        }
    }
}

/// Explicit set of field assignments for a partial update.
///
/// Only fields put here are written; everything else on the document is left
/// as it was. Assigning the same field twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdateSet {
    fields: Vec<(&'static str, Value)>,
}

impl FieldUpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &'static str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
        self
    }

    pub fn with(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(name, _)| *name).collect()
    }

    /// Apply the assignments to a document body
    pub fn apply_to(&self, body: &mut Document) {
        for (name, value) in self.iter() {
            body.insert(name.to_string(), value.clone());
        }
    }

    /// Assignments as a JSON object, for backends that merge server-side
    pub fn to_document(&self) -> Document {
        let mut document = Document::new();
        self.apply_to(&mut document);
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, body: Value) -> StoredDocument {
        StoredDocument {
            id: DocumentId::from(id),
            body: body.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_field_equals_matches_exact_value() {
        let document = doc("a1", json!({ "email": "a@x.com" }));
        assert!(Filter::field_equals("email", "a@x.com").matches(&document));
        assert!(!Filter::field_equals("email", "b@x.com").matches(&document));
        assert!(!Filter::field_equals("name", "a@x.com").matches(&document));
    }

    #[test]
    fn test_field_contains_requires_array_membership() {
        let document = doc("p1", json!({ "likes": ["a1", "a2"], "author": "a1" }));
        assert!(Filter::field_contains("likes", "a2").matches(&document));
        assert!(!Filter::field_contains("likes", "a3").matches(&document));
        // scalar fields never "contain" anything
        assert!(!Filter::field_contains("author", "a1").matches(&document));
    }

    #[test]
    fn test_id_in_matches_identifier_only() {
        let document = doc("p1", json!({ "content": "p2" }));
        assert!(Filter::id_in(vec![DocumentId::from("p1")]).matches(&document));
        assert!(!Filter::id_in(vec![DocumentId::from("p2")]).matches(&document));
        assert!(!Filter::id_in(Vec::new()).matches(&document));
    }

    #[test]
    fn test_update_set_keeps_last_assignment() {
        let mut updates = FieldUpdateSet::new();
        updates.set("name", "first").set("email", "e@x.com").set("name", "second");

        assert_eq!(updates.len(), 2);
        assert_eq!(updates.get("name"), Some(&json!("second")));
        assert_eq!(updates.field_names(), vec!["name", "email"]);
    }

    #[test]
    fn test_apply_only_touches_listed_fields() {
        let mut body = json!({ "name": "A", "email": "a@x.com" })
            .as_object()
            .cloned()
            .unwrap();
        FieldUpdateSet::new().with("name", "B").apply_to(&mut body);

        assert_eq!(body.get("name"), Some(&json!("B")));
        assert_eq!(body.get("email"), Some(&json!("a@x.com")));
    }
}
