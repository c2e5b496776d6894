// src/query.rs
//! Equality filters over documents
//!
//! A filter is a mapping from field name to the exact value the field must
//! hold. The empty filter matches every document. Filtering on `_id`
//! compares against the identifier's string form.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::document::{Document, ID_FIELD};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: BTreeMap<String, Value>,
}

impl Filter {
    /// Filter that matches all documents
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition (builder style)
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.conditions.insert(field.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.conditions.get(field)
    }

    /// True when every condition holds for the document.
    /// A missing field only matches an expected `null`.
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|(field, expected)| {
            if field == ID_FIELD {
                return expected.as_str() == Some(doc.id.to_string().as_str());
            }
            match doc.get(field) {
                Some(actual) => actual == expected,
                None => expected.is_null(),
            }
        })
    }
}

impl From<Map<String, Value>> for Filter {
    fn from(map: Map<String, Value>) -> Self {
        Filter {
            conditions: map.into_iter().collect(),
        }
    }
}
