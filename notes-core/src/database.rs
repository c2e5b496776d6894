// notes-core/src/database.rs

use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::connection::ConnectionString;
use crate::document::{Document, DocumentId, ID_FIELD};
use crate::error::{Result, StoreError};
use crate::query::Filter;
use crate::storage::{FileStorage, MemoryStorage, Storage};

type SharedStorage = Arc<RwLock<Box<dyn Storage>>>;

/// Handle to an open database.
///
/// Cloning is cheap; all clones share the same storage backend, which is
/// guarded by a read/write lock so the handle can be used from many
/// requests at once.
#[derive(Clone)]
pub struct Database {
    name: String,
    storage: SharedStorage,
}

impl Database {
    /// Open the database `name` using the backend selected by `url`
    pub fn connect(url: &str, name: &str) -> Result<Self> {
        validate_name(name)?;
        let connection = ConnectionString::parse(url)?;

        let storage: Box<dyn Storage> = match &connection {
            ConnectionString::Memory => Box::new(MemoryStorage::new()),
            ConnectionString::File(dir) => Box::new(FileStorage::open(dir, name)?),
        };

        info!(database = name, backend = %connection, "database opened");
        Ok(Self::with_storage(name, storage))
    }

    /// Fresh in-memory database
    pub fn in_memory(name: &str) -> Self {
        Self::with_storage(name, Box::new(MemoryStorage::new()))
    }

    /// Wrap an already constructed backend
    pub fn with_storage(name: &str, storage: Box<dyn Storage>) -> Self {
        Database {
            name: name.to_string(),
            storage: Arc::new(RwLock::new(storage)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Collection handle; the collection itself appears on first insert
    pub fn collection(&self, name: &str) -> Collection {
        Collection {
            name: name.to_string(),
            storage: Arc::clone(&self.storage),
        }
    }

    pub fn list_collection_names(&self) -> Result<Vec<String>> {
        self.storage.read().list_collections()
    }

    /// Flush pending writes of the backend
    pub fn flush(&self) -> Result<()> {
        self.storage.write().flush()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("name", &self.name).finish()
    }
}

fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StoreError::InvalidDatabaseName(name.to_string()));
    }
    Ok(())
}

/// Handle to one named collection
#[derive(Clone)]
pub struct Collection {
    name: String,
    storage: SharedStorage,
}

impl Collection {
    /// Insert a record and return its newly assigned id.
    /// The record must not carry its own `_id`.
    pub fn insert_one(&self, fields: Map<String, Value>) -> Result<DocumentId> {
        if fields.contains_key(ID_FIELD) {
            return Err(StoreError::InvalidDocument(format!(
                "'{}' is assigned by the store",
                ID_FIELD
            )));
        }

        let doc = Document::new(fields);
        self.storage.write().write_document(&self.name, &doc)?;
        debug!(collection = %self.name, id = %doc.id, "document inserted");
        Ok(doc.id)
    }

    /// All documents matching the filter, in store order
    pub fn find(&self, filter: &Filter) -> Result<Vec<Document>> {
        let docs = self.storage.read().scan_documents(&self.name)?;
        Ok(docs.into_iter().filter(|d| filter.matches(d)).collect())
    }

    pub fn count_documents(&self, filter: &Filter) -> Result<usize> {
        Ok(self.find(filter)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_insert_then_find() {
        let db = Database::in_memory("test");
        let contexts = db.collection("context");

        let id = contexts.insert_one(fields(json!({"name": "Rust", "language": "en"}))).unwrap();
        let docs = contexts.find(&Filter::new()).unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, id);
        assert_eq!(docs[0].get("name"), Some(&json!("Rust")));
    }

    #[test]
    fn test_insert_rejects_explicit_id() {
        let db = Database::in_memory("test");
        let err = db
            .collection("note")
            .insert_one(fields(json!({"_id": "mine"})))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument(_)));
    }

    #[test]
    fn test_find_filters_by_equality() {
        let db = Database::in_memory("test");
        let notes = db.collection("note");
        notes.insert_one(fields(json!({"title": "a", "language": "de"}))).unwrap();
        notes.insert_one(fields(json!({"title": "b", "language": "en"}))).unwrap();
        notes.insert_one(fields(json!({"title": "c", "language": "de"}))).unwrap();

        let german = notes.find(&Filter::new().with("language", "de")).unwrap();
        let titles: Vec<_> = german.iter().map(|d| d.get("title").unwrap().clone()).collect();
        assert_eq!(titles, vec![json!("a"), json!("c")]);
        assert_eq!(notes.count_documents(&Filter::new()).unwrap(), 3);
    }

    #[test]
    fn test_ids_are_unique() {
        let db = Database::in_memory("test");
        let notes = db.collection("note");
        let a = notes.insert_one(Map::new()).unwrap();
        let b = notes.insert_one(Map::new()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_clones_share_storage() {
        let db = Database::in_memory("test");
        let other = db.clone();
        db.collection("context").insert_one(Map::new()).unwrap();
        assert_eq!(other.list_collection_names().unwrap(), vec!["context"]);
    }

    #[test]
    fn test_connect_validates_name() {
        assert!(matches!(
            Database::connect("memory://", ""),
            Err(StoreError::InvalidDatabaseName(_))
        ));
        assert!(matches!(
            Database::connect("memory://", "../escape"),
            Err(StoreError::InvalidDatabaseName(_))
        ));
        assert_eq!(Database::connect("memory://", "notes").unwrap().name(), "notes");
    }
}
