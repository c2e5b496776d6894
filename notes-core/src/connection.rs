// src/connection.rs
//! Connection strings
//!
//! - `memory://` keeps everything in process memory
//! - `file:///var/lib/notes` or `file:data` stores one log per database
//!   inside the given directory

use std::fmt;
use std::path::PathBuf;

use crate::error::{Result, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionString {
    Memory,
    File(PathBuf),
}

impl ConnectionString {
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();

        if url == "memory://" || url == "memory:" {
            return Ok(ConnectionString::Memory);
        }

        let dir = url
            .strip_prefix("file://")
            .or_else(|| url.strip_prefix("file:"))
            .ok_or_else(|| StoreError::InvalidConnectionString(url.to_string()))?;

        if dir.is_empty() {
            return Err(StoreError::InvalidConnectionString(url.to_string()));
        }

        Ok(ConnectionString::File(PathBuf::from(dir)))
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionString::Memory => write!(f, "memory://"),
            ConnectionString::File(dir) => write!(f, "file://{}", dir.display()),
        }
    }
}
