// storage/traits.rs
//! Storage abstraction shared by all backends
//!
//! `Database` only talks to this trait, so the backend is chosen at runtime
//! from the connection string.

use crate::document::Document;
use crate::error::Result;

/// Core storage abstraction
///
/// Collections are created implicitly by the first write into them.
/// Implementations must hand documents back in insertion order.
pub trait Storage: Send + Sync {
    // ========================================================================
    // DOCUMENT OPERATIONS
    // ========================================================================

    /// Persist a document into the collection
    fn write_document(&mut self, collection: &str, doc: &Document) -> Result<()>;

    /// All documents of a collection; empty when the collection does not exist
    fn scan_documents(&self, collection: &str) -> Result<Vec<Document>>;

    // ========================================================================
    // COLLECTION MANAGEMENT
    // ========================================================================

    /// Names of all collections holding at least one document, sorted
    fn list_collections(&self) -> Result<Vec<String>>;

    // ========================================================================
    // PERSISTENCE & FLUSHING
    // ========================================================================

    /// Flush pending writes to persistent storage.
    /// For MemoryStorage this is a no-op.
    fn flush(&mut self) -> Result<()>;
}
