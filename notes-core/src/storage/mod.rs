// storage/mod.rs
//! Storage backends
//!
//! ```text
//! Storage trait (unified interface)
//!   ├── FileStorage (append-only log on disk)
//!   └── MemoryStorage (in-memory, testing and ephemeral runs)
//! ```

pub mod file_storage;
pub mod memory_storage;
pub mod traits;

pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;
pub use traits::Storage;
