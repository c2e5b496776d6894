//! Document store adapter
//!
//! Wraps the process-wide database handle. The handle is created once at
//! startup and passed into the router explicitly. When the store cannot be
//! opened the adapter is built in its "unavailable" state instead of
//! aborting, and every data operation then fails with
//! `StoreError::Unavailable`.

use chrono::{SecondsFormat, Utc};
use notes_core::{Database, Filter, StoreError};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::config::Config;

#[derive(Clone, Debug, Default)]
pub struct DocumentStore {
    db: Option<Database>,
}

impl DocumentStore {
    /// Open the store described by the configuration; never fails
    pub fn connect(config: &Config) -> Self {
        let (url, name) = match (&config.database_url, &config.database_name) {
            (Some(url), Some(name)) => (url, name),
            _ => {
                warn!("DATABASE_URL or DATABASE_NAME not set, document store unavailable");
                return Self::unavailable();
            }
        };

        match Database::connect(url, name) {
            Ok(db) => {
                info!(database = %name, "document store connected");
                Self::from_database(db)
            }
            Err(e) => {
                error!(database = %name, "failed to open document store: {}", e);
                Self::unavailable()
            }
        }
    }

    pub fn from_database(db: Database) -> Self {
        DocumentStore { db: Some(db) }
    }

    pub fn unavailable() -> Self {
        DocumentStore { db: None }
    }

    /// Underlying handle, if the store was opened
    pub fn database(&self) -> Option<&Database> {
        self.db.as_ref()
    }

    pub fn is_available(&self) -> bool {
        self.db.is_some()
    }

    fn handle(&self) -> Result<&Database, StoreError> {
        self.db.as_ref().ok_or(StoreError::Unavailable)
    }

    /// Insert a validated record, stamping `created_at`/`updated_at`.
    /// Returns the new identifier as a string.
    pub fn create_document(
        &self,
        collection: &str,
        mut record: Map<String, Value>,
    ) -> Result<String, StoreError> {
        let db = self.handle()?;

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        record.insert("created_at".to_string(), Value::String(now.clone()));
        record.insert("updated_at".to_string(), Value::String(now));

        let id = db.collection(collection).insert_one(record)?;
        debug!(collection, %id, "document created");
        Ok(id.to_string())
    }

    /// All records matching the equality filter, in store order, each with
    /// `_id` already converted to a string.
    pub fn get_documents(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Map<String, Value>>, StoreError> {
        let db = self.handle()?;
        let docs = db.collection(collection).find(filter)?;
        debug!(collection, matched = docs.len(), "documents listed");
        Ok(docs.into_iter().map(|doc| doc.into_record()).collect())
    }
}
