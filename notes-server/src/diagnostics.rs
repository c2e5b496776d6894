//! Store and environment diagnostics for `GET /test`
//!
//! The probe never fails: every problem is folded into the report text.

use serde::Serialize;

use crate::config::{DATABASE_NAME_ENV, DATABASE_URL_ENV};
use crate::store::DocumentStore;

/// Maximum number of collection names included in a report
pub const MAX_COLLECTIONS: usize = 10;

/// Maximum length of an error message echoed in a report
pub const MAX_ERROR_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticsReport {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}

/// Probe the store and check which settings are present in `env`.
/// Only presence is reported, never values.
pub fn probe<F>(store: &DocumentStore, env: F) -> DiagnosticsReport
where
    F: Fn(&str) -> Option<String>,
{
    let mut report = DiagnosticsReport {
        backend: "✅ Running".to_string(),
        database: "❌ Not Available".to_string(),
        database_url: String::new(),
        database_name: String::new(),
        connection_status: "Not Connected".to_string(),
        collections: Vec::new(),
    };

    match store.database() {
        Some(db) => {
            report.database = "✅ Available".to_string();
            report.connection_status = "Connected".to_string();

            match db.list_collection_names() {
                Ok(names) => {
                    report.collections = names.into_iter().take(MAX_COLLECTIONS).collect();
                    report.database = "✅ Connected & Working".to_string();
                }
                Err(e) => {
                    report.database = format!("⚠️  Connected but Error: {}", truncate(&e.to_string()));
                }
            }
        }
        None => {
            report.database = "⚠️  Available but not initialized".to_string();
        }
    }

    report.database_url = presence(&env, DATABASE_URL_ENV);
    report.database_name = presence(&env, DATABASE_NAME_ENV);
    report
}

fn presence<F>(env: &F, key: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let set = env(key).map_or(false, |v| !v.is_empty());
    let label = if set { "✅ Set" } else { "❌ Not Set" };
    label.to_string()
}

fn truncate(message: &str) -> String {
    message.chars().take(MAX_ERROR_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notes_core::{Database, Document, Storage, StoreError};
    use serde_json::Map;

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn write_document(&mut self, _: &str, _: &Document) -> notes_core::Result<()> {
            Err(StoreError::Unavailable)
        }

        fn scan_documents(&self, _: &str) -> notes_core::Result<Vec<Document>> {
            Err(StoreError::Unavailable)
        }

        fn list_collections(&self) -> notes_core::Result<Vec<String>> {
            Err(StoreError::Serialization(
                "catalog unreadable because the underlying medium went away mid-read".to_string(),
            ))
        }

        fn flush(&mut self) -> notes_core::Result<()> {
            Ok(())
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_unavailable_store_report() {
        let report = probe(&DocumentStore::unavailable(), no_env);
        assert_eq!(report.backend, "✅ Running");
        assert_eq!(report.database, "⚠️  Available but not initialized");
        assert_eq!(report.connection_status, "Not Connected");
        assert_eq!(report.database_url, "❌ Not Set");
        assert_eq!(report.database_name, "❌ Not Set");
        assert!(report.collections.is_empty());
    }

    #[test]
    fn test_working_store_lists_at_most_ten_collections() {
        let db = Database::in_memory("notes");
        for i in 0..12 {
            db.collection(&format!("c{:02}", i)).insert_one(Map::new()).unwrap();
        }

        let env = |key: &str| match key {
            "DATABASE_URL" => Some("memory://".to_string()),
            _ => None,
        };
        let report = probe(&DocumentStore::from_database(db), env);

        assert_eq!(report.database, "✅ Connected & Working");
        assert_eq!(report.connection_status, "Connected");
        assert_eq!(report.collections.len(), MAX_COLLECTIONS);
        assert_eq!(report.collections[0], "c00");
        assert_eq!(report.database_url, "✅ Set");
        assert_eq!(report.database_name, "❌ Not Set");
    }

    #[test]
    fn test_listing_failure_is_reported_truncated() {
        let db = Database::with_storage("notes", Box::new(BrokenStorage));
        let report = probe(&DocumentStore::from_database(db), no_env);

        let prefix = "⚠️  Connected but Error: ";
        assert!(report.database.starts_with(prefix));
        let message = &report.database[prefix.len()..];
        assert_eq!(message.chars().count(), MAX_ERROR_CHARS);
        assert!(message.starts_with("Serialization error: catalog"));
        assert_eq!(report.connection_status, "Connected");
    }
}
