// storage/memory_storage.rs
//! Pure in-memory storage
//!
//! ```text
//! MemoryStorage (Storage trait implementation)
//!      ↓
//! HashMap<String, Vec<Document>> (collections -> documents)
//! ```
//!
//! Also used by `FileStorage` as its read cache after log replay.

use std::collections::HashMap;

use crate::document::Document;
use crate::error::Result;
use crate::storage::Storage;

/// In-memory storage backend. Data is lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    /// Collection name -> documents, in insertion order
    collections: HashMap<String, Vec<Document>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of documents across all collections
    pub fn document_count(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }
}

impl Storage for MemoryStorage {
    fn write_document(&mut self, collection: &str, doc: &Document) -> Result<()> {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        Ok(())
    }

    fn scan_documents(&self, collection: &str) -> Result<Vec<Document>> {
        Ok(self.collections.get(collection).cloned().unwrap_or_default())
    }

    fn list_collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn doc(name: &str) -> Document {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.to_string()));
        Document::new(fields)
    }

    #[test]
    fn test_scan_preserves_insertion_order() {
        let mut storage = MemoryStorage::new();
        storage.write_document("context", &doc("a")).unwrap();
        storage.write_document("context", &doc("b")).unwrap();
        storage.write_document("context", &doc("c")).unwrap();

        let names: Vec<Value> = storage
            .scan_documents("context")
            .unwrap()
            .into_iter()
            .map(|d| d.fields["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn test_unknown_collection_scans_empty() {
        let storage = MemoryStorage::new();
        assert!(storage.scan_documents("missing").unwrap().is_empty());
        assert!(storage.list_collections().unwrap().is_empty());
    }

    #[test]
    fn test_collections_created_on_first_write() {
        let mut storage = MemoryStorage::new();
        storage.write_document("note", &doc("n")).unwrap();
        storage.write_document("context", &doc("c")).unwrap();

        assert_eq!(storage.list_collections().unwrap(), vec!["context", "note"]);
        assert_eq!(storage.document_count(), 2);
    }
}
