// src/schema.rs
//! Collection schemas
//!
//! Each collection's accepted record shape is a plain table of field specs.
//! `validate` checks an inbound JSON body against the table, collects every
//! failing field and returns the normalized record: undeclared fields are
//! dropped, absent optional fields become `null`, defaults are filled in.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    StringArray,
}

impl FieldKind {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Number => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::StringArray => value
                .as_array()
                .map_or(false, |items| items.iter().all(Value::is_string)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::StringArray => "array of strings",
        }
    }
}

/// Whether a field must be supplied, and what it becomes when it is not
#[derive(Clone, Debug, PartialEq)]
pub enum Presence {
    Required,
    /// Absent or `null` is stored as `null`
    Optional,
    /// Absent is replaced by the given value
    Default(Value),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
    /// Inclusive numeric bounds
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    /// Minimum string length in characters
    pub min_length: Option<usize>,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldKind, presence: Presence) -> Self {
        FieldSpec {
            name,
            kind,
            presence,
            minimum: None,
            maximum: None,
            min_length: None,
        }
    }

    pub fn required(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, Presence::Required)
    }

    pub fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self::new(name, kind, Presence::Optional)
    }

    pub fn with_default(name: &'static str, kind: FieldKind, default: Value) -> Self {
        Self::new(name, kind, Presence::Default(default))
    }

    pub fn range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    pub fn non_empty(mut self) -> Self {
        self.min_length = Some(1);
        self
    }

    fn check(&self, value: &Value) -> Option<String> {
        if !self.kind.matches(value) {
            return Some(format!("expected {}", self.kind.as_str()));
        }

        if let Some(number) = value.as_f64() {
            if let Some(min) = self.minimum {
                if number < min {
                    return Some(format!("must be greater than or equal to {}", min));
                }
            }
            if let Some(max) = self.maximum {
                if number > max {
                    return Some(format!("must be less than or equal to {}", max));
                }
            }
        }

        if let (Some(min), Some(text)) = (self.min_length, value.as_str()) {
            if text.chars().count() < min {
                return Some(format!("must contain at least {} character(s)", min));
            }
        }

        None
    }
}

/// Why one field was rejected
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

/// Every field-level failure of one validation run
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize)]
#[error("Invalid {collection} record: {}", join_errors(.errors))]
pub struct ValidationErrors {
    pub collection: String,
    pub errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone, Debug, PartialEq)]
pub struct CollectionSchema {
    pub collection: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl CollectionSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn validate(&self, body: &Value) -> Result<Map<String, Value>, ValidationErrors> {
        let obj = body.as_object().ok_or_else(|| ValidationErrors {
            collection: self.collection.to_string(),
            errors: vec![FieldError {
                field: "body".to_string(),
                reason: "expected a JSON object".to_string(),
            }],
        })?;

        let mut record = Map::new();
        let mut errors = Vec::new();

        for spec in &self.fields {
            let supplied = obj.get(spec.name);
            let value = match (supplied, &spec.presence) {
                (None | Some(Value::Null), Presence::Required) => {
                    errors.push(FieldError {
                        field: spec.name.to_string(),
                        reason: "field required".to_string(),
                    });
                    continue;
                }
                (None | Some(Value::Null), Presence::Optional) => Value::Null,
                (None, Presence::Default(default)) => default.clone(),
                (Some(value), _) => {
                    if let Some(reason) = spec.check(value) {
                        errors.push(FieldError {
                            field: spec.name.to_string(),
                            reason,
                        });
                        continue;
                    }
                    value.clone()
                }
            };
            record.insert(spec.name.to_string(), value);
        }

        if errors.is_empty() {
            Ok(record)
        } else {
            Err(ValidationErrors {
                collection: self.collection.to_string(),
                errors,
            })
        }
    }
}

pub const CONTEXT: &str = "context";
pub const NOTE: &str = "note";
pub const USER: &str = "user";
pub const PRODUCT: &str = "product";

/// Topic/category grouping notes
pub fn context_schema() -> CollectionSchema {
    use FieldKind::*;
    CollectionSchema {
        collection: CONTEXT,
        fields: vec![
            FieldSpec::required("name", String).non_empty(),
            FieldSpec::optional("description", String),
            FieldSpec::optional("language", String),
        ],
    }
}

/// A single learning note
pub fn note_schema() -> CollectionSchema {
    use FieldKind::*;
    CollectionSchema {
        collection: NOTE,
        fields: vec![
            FieldSpec::required("title", String).non_empty(),
            FieldSpec::required("content", String).non_empty(),
            FieldSpec::optional("context_id", String),
            FieldSpec::optional("language", String),
            FieldSpec::with_default("tags", StringArray, Value::Array(Vec::new())),
            FieldSpec::optional("source", String),
            FieldSpec::optional("hint", String),
        ],
    }
}

/// Example shape, not served by any route
pub fn user_schema() -> CollectionSchema {
    use FieldKind::*;
    CollectionSchema {
        collection: USER,
        fields: vec![
            FieldSpec::required("name", String),
            FieldSpec::required("email", String),
            FieldSpec::required("address", String),
            FieldSpec::optional("age", Integer).range(Some(0.0), Some(120.0)),
            FieldSpec::with_default("is_active", Boolean, Value::Bool(true)),
        ],
    }
}

/// Example shape, not served by any route
pub fn product_schema() -> CollectionSchema {
    use FieldKind::*;
    CollectionSchema {
        collection: PRODUCT,
        fields: vec![
            FieldSpec::required("title", String),
            FieldSpec::optional("description", String),
            FieldSpec::required("price", Number).range(Some(0.0), None),
            FieldSpec::required("category", String),
            FieldSpec::with_default("in_stock", Boolean, Value::Bool(true)),
        ],
    }
}

/// Every declared collection schema
pub fn registry() -> Vec<CollectionSchema> {
    vec![context_schema(), note_schema(), user_schema(), product_schema()]
}

pub fn schema_for(collection: &str) -> Option<CollectionSchema> {
    registry().into_iter().find(|s| s.collection == collection)
}
