// storage/file_storage.rs
//! Append-only log file storage
//!
//! ```text
//! FileStorage (Storage trait implementation)
//!      ├── MemoryStorage (read cache, rebuilt on open)
//!      └── <dir>/<database>.ndjson (one LogRecord per line)
//! ```
//!
//! Every write appends one line and syncs it before returning. A write that
//! fails is rolled back to the last committed length, so a partial line never
//! ends up between two good records. On open the
//! log is replayed into the cache. A final line without a terminating
//! newline is a torn write: it is dropped and the file truncated back to
//! the last complete record. A complete line that fails to parse or whose
//! checksum does not match is reported as corruption.

use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{Result, StoreError};
use crate::storage::{MemoryStorage, Storage};

/// Log file extension
pub const LOG_EXTENSION: &str = "ndjson";

/// One line of the log
#[derive(Debug, Serialize, Deserialize)]
struct LogRecord {
    collection: String,
    /// CRC32 of `document`
    crc: u32,
    /// Serialized document, kept as text so the checksum covers exact bytes
    document: String,
}

impl LogRecord {
    fn new(collection: &str, doc: &Document) -> Result<Self> {
        let document = serde_json::to_string(doc)?;
        Ok(LogRecord {
            collection: collection.to_string(),
            crc: crc32fast::hash(document.as_bytes()),
            document,
        })
    }
}

/// File-based storage backend
pub struct FileStorage {
    file: File,
    path: PathBuf,
    /// Length of the log up to the last fully synced record
    committed: u64,
    cache: MemoryStorage,
}

impl FileStorage {
    /// Open (or create) the log for `database` inside `dir`
    pub fn open(dir: impl AsRef<Path>, database: &str) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.{}", database, LOG_EXTENSION));

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        let cache = Self::replay(&path, &file)?;
        debug!(
            path = %path.display(),
            documents = cache.document_count(),
            "replayed document log"
        );

        let committed = file.metadata()?.len();
        Ok(FileStorage {
            file,
            path,
            committed,
            cache,
        })
    }

    /// Append `line` and sync it, truncating back to `committed` on failure
    fn append(&mut self, line: &[u8]) -> Result<()> {
        let on_disk = self.file.metadata()?.len();
        if on_disk != self.committed {
            warn!(
                path = %self.path.display(),
                expected = self.committed,
                found = on_disk,
                "discarding uncommitted bytes at end of log"
            );
            self.file.set_len(self.committed)?;
        }

        let written = self
            .file
            .write_all(line)
            .and_then(|_| self.file.sync_data());
        if let Err(e) = written {
            if let Err(rollback) = self.file.set_len(self.committed) {
                warn!(
                    path = %self.path.display(),
                    error = %rollback,
                    "failed to roll back partial write"
                );
            }
            return Err(e.into());
        }

        self.committed += line.len() as u64;
        Ok(())
    }

    fn replay(path: &Path, file: &File) -> Result<MemoryStorage> {
        let bytes = fs::read(path)?;
        let mut cache = MemoryStorage::new();
        let mut consumed = 0usize;

        let mut lines = bytes.split(|b| *b == b'\n').enumerate().peekable();
        while let Some((index, line)) = lines.next() {
            // The segment after the final '\n' has no terminator
            let is_tail = lines.peek().is_none();
            if is_tail {
                if !line.is_empty() {
                    warn!(
                        path = %path.display(),
                        line = index + 1,
                        "dropping torn record at end of log"
                    );
                    file.set_len(consumed as u64)?;
                }
                break;
            }

            consumed += line.len() + 1;
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let (collection, doc) = Self::decode_line(index + 1, line)?;
            cache.write_document(&collection, &doc)?;
        }

        Ok(cache)
    }

    fn decode_line(line_no: usize, line: &[u8]) -> Result<(String, Document)> {
        let record: LogRecord =
            serde_json::from_slice(line).map_err(|e| StoreError::Corruption {
                line: line_no,
                reason: e.to_string(),
            })?;

        let actual = crc32fast::hash(record.document.as_bytes());
        if actual != record.crc {
            return Err(StoreError::Corruption {
                line: line_no,
                reason: format!("checksum mismatch (expected {}, got {})", record.crc, actual),
            });
        }

        let doc: Document =
            serde_json::from_str(&record.document).map_err(|e| StoreError::Corruption {
                line: line_no,
                reason: e.to_string(),
            })?;

        Ok((record.collection, doc))
    }
}

impl Storage for FileStorage {
    fn write_document(&mut self, collection: &str, doc: &Document) -> Result<()> {
        let record = LogRecord::new(collection, doc)?;
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        self.append(&line)?;
        self.cache.write_document(collection, doc)
    }

    fn scan_documents(&self, collection: &str) -> Result<Vec<Document>> {
        self.cache.scan_documents(collection)
    }

    fn list_collections(&self) -> Result<Vec<String>> {
        self.cache.list_collections()
    }

    fn flush(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}
