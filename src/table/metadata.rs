//! Table metadata persistence
//!
//! ## File Format
//! ```text
//! ┌──────────┬─────────────────────────────────┐
//! │ CRC (4)  │ bincode(TableMetadata)          │
//! └──────────┴─────────────────────────────────┘
//! ```
//! Rewrites go to a temporary file that is renamed over the old one, so a
//! crash never leaves a half-written descriptor behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabletError};

/// Durable table descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub table_name: String,
    pub column_families: Vec<String>,
    /// Buffered row count above which the memtable is flushed
    pub memtable_limit: usize,
    /// Unix millis
    pub creation_time: u64,
}

impl TableMetadata {
    /// Describe a table created now
    pub fn new(table_name: impl Into<String>, column_families: Vec<String>, memtable_limit: usize) -> Self {
        let creation_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        Self {
            table_name: table_name.into(),
            column_families,
            memtable_limit,
            creation_time,
        }
    }

    /// Load and verify a metadata file
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        if bytes.len() < 4 {
            return Err(TabletError::MetadataCorruption(format!(
                "{} is only {} bytes",
                path.display(),
                bytes.len()
            )));
        }

        let stored_crc = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let payload = &bytes[4..];
        let actual_crc = crc32fast::hash(payload);
        if stored_crc != actual_crc {
            return Err(TabletError::MetadataCorruption(format!(
                "{}: checksum mismatch (stored {:08x}, computed {:08x})",
                path.display(),
                stored_crc,
                actual_crc
            )));
        }

        Ok(bincode::deserialize(payload)?)
    }

    /// Persist to `path`, replacing any previous version
    pub fn store(&self, path: &Path) -> Result<()> {
        let payload = bincode::serialize(self)?;
        let crc = crc32fast::hash(&payload);

        let tmp = Self::tmp_path(path);
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&crc.to_le_bytes())?;
            file.write_all(&payload)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, path)?;

        Ok(())
    }

    fn tmp_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
