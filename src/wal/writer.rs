//! WAL Writer
//!
//! Handles appending records to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

use super::WalRecord;

/// Appends records to the WAL file
///
/// Every append is fsync'd before it returns.
pub struct WalWriter {
    file: File,
    path: PathBuf,
    /// Records appended through this writer (not counting replayed ones)
    records_written: u64,
}

impl WalWriter {
    /// Open or create a WAL file in append mode
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            records_written: 0,
        })
    }

    /// Append one mutation record per column of a row update
    ///
    /// All lines go out in a single write followed by fsync. Returns the
    /// number of records written.
    pub fn append_mutations<'a, I>(&mut self, row_key: &str, updates: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut buf = String::new();
        let mut count = 0;
        for (column_key, value) in updates {
            buf.push_str(&WalRecord::mutation(row_key, column_key.as_str(), value.as_str()).encode());
            count += 1;
        }

        if count == 0 {
            return Ok(0);
        }

        self.write_durable(buf.as_bytes())?;
        self.records_written += count as u64;
        Ok(count)
    }

    /// Append a single record
    pub fn append(&mut self, record: &WalRecord) -> Result<()> {
        self.write_durable(record.encode().as_bytes())?;
        self.records_written += 1;
        Ok(())
    }

    /// Append a flush checkpoint marker
    pub fn append_checkpoint(&mut self) -> Result<()> {
        self.append(&WalRecord::Checkpoint)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        Ok(())
    }

    /// Records appended since this writer was opened
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write and fsync; on failure, cut the file back so a half-written
    /// line cannot fuse with the next append.
    fn write_durable(&mut self, bytes: &[u8]) -> Result<()> {
        let start = self.file.metadata()?.len();

        let written = self
            .file
            .write_all(bytes)
            .and_then(|_| self.file.sync_data());

        if let Err(e) = written {
            if let Err(undo) = self.file.set_len(start) {
                tracing::error!(
                    "Failed to roll back WAL {} after write error: {}",
                    self.path.display(),
                    undo
                );
            }
            return Err(e.into());
        }

        Ok(())
    }
}
