// src/document.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Field name holding the document identifier.
pub const ID_FIELD: &str = "_id";

/// Store-assigned document identifier.
///
/// The native (stored) representation is an extended-JSON object id:
/// `{"$oid": "6f1c..."}`. Clients only ever see the string form produced
/// by `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ObjectIdRepr", into = "ObjectIdRepr")]
pub struct DocumentId(Uuid);

#[derive(Serialize, Deserialize)]
struct ObjectIdRepr {
    #[serde(rename = "$oid")]
    oid: String,
}

impl DocumentId {
    /// New random object id (UUID v4)
    pub fn new_object_id() -> Self {
        DocumentId(Uuid::new_v4())
    }

    /// Native JSON representation, as stored in the log
    pub fn to_native_value(&self) -> Value {
        serde_json::json!({ "$oid": self.to_string() })
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(DocumentId)
    }
}

impl TryFrom<ObjectIdRepr> for DocumentId {
    type Error = uuid::Error;

    fn try_from(repr: ObjectIdRepr) -> Result<Self, Self::Error> {
        repr.oid.parse()
    }
}

impl From<DocumentId> for ObjectIdRepr {
    fn from(id: DocumentId) -> Self {
        ObjectIdRepr {
            oid: id.to_string(),
        }
    }
}

/// A stored record: identifier plus its fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: DocumentId,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Wrap fields into a document with a freshly generated id
    pub fn new(fields: Map<String, Value>) -> Self {
        Document {
            id: DocumentId::new_object_id(),
            fields,
        }
    }

    /// Top-level field lookup. `_id` is not part of `fields`; use `id`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Native JSON form, `_id` kept as `{"$oid": ...}`
    pub fn to_value(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert(ID_FIELD.to_string(), self.id.to_native_value());
        Value::Object(map)
    }

    /// Client-facing record: fields plus `_id` rendered as a plain string
    pub fn into_record(self) -> Map<String, Value> {
        let mut map = self.fields;
        map.insert(ID_FIELD.to_string(), Value::String(self.id.to_string()));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_native_form_is_oid_object() {
        let id = DocumentId::new_object_id();
        let value = serde_json::to_value(id).unwrap();
        assert_eq!(value, json!({ "$oid": id.to_string() }));

        let back: DocumentId = serde_json::from_value(value).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_id_string_form_parses_back() {
        let id = DocumentId::new_object_id();
        let text = id.to_string();
        assert_eq!(text.len(), 32);
        assert_eq!(text.parse::<DocumentId>().unwrap(), id);
    }

    #[test]
    fn test_document_serializes_with_flattened_fields() {
        let mut fields = Map::new();
        fields.insert("name".to_string(), json!("Rust"));
        let doc = Document::new(fields);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["name"], json!("Rust"));
        assert_eq!(json["_id"]["$oid"], json!(doc.id.to_string()));

        let restored: Document = serde_json::from_value(json).unwrap();
        assert_eq!(restored, doc);
        assert!(restored.get("_id").is_none());
    }

    #[test]
    fn test_into_record_stringifies_id() {
        let doc = Document::new(Map::new());
        let id = doc.id;
        let record = doc.into_record();
        assert_eq!(record["_id"], Value::String(id.to_string()));
    }
}
