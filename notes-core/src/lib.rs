// notes-core/src/lib.rs
// Embedded document store used by the Learning Notes API

pub mod connection;
pub mod database;
pub mod document;
pub mod error;
pub mod query;
pub mod schema;
pub mod storage;

// Public exports
pub use connection::ConnectionString;
pub use database::{Collection, Database};
pub use document::{Document, DocumentId};
pub use error::{Result, StoreError};
pub use query::Filter;
pub use schema::{CollectionSchema, FieldError, FieldKind, FieldSpec, Presence, ValidationErrors};
pub use storage::{FileStorage, MemoryStorage, Storage};
