//! WAL Reader
//!
//! Handles reading records from the WAL file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, TabletError};

use super::WalRecord;

/// Reads records from the WAL file, front to back
pub struct WalReader {
    reader: BufReader<File>,
    /// Byte offset just past the last complete line
    valid_len: u64,
    /// Set once a final line without a newline has been seen
    torn_tail: bool,
    line_no: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            valid_len: 0,
            torn_tail: false,
            line_no: 0,
        })
    }

    /// Read the next record from the WAL
    ///
    /// Returns `Ok(None)` at end of file. A trailing line that lacks its
    /// newline is a partial write: it is not returned, and `has_torn_tail`
    /// reports it.
    pub fn next_record(&mut self) -> Result<Option<WalRecord>> {
        if self.torn_tail {
            return Ok(None);
        }

        let mut bytes = Vec::new();
        let read = self.reader.read_until(b'\n', &mut bytes)?;

        if read == 0 {
            return Ok(None);
        }

        if bytes.last() != Some(&b'\n') {
            self.torn_tail = true;
            return Ok(None);
        }

        self.line_no += 1;
        bytes.pop();
        let line = String::from_utf8(bytes).map_err(|_| {
            TabletError::WalCorruption(format!("line {} is not valid UTF-8", self.line_no))
        })?;
        self.valid_len += read as u64;

        WalRecord::decode(&line).map(Some).map_err(|e| match e {
            TabletError::WalCorruption(msg) => {
                TabletError::WalCorruption(format!("line {}: {}", self.line_no, msg))
            }
            other => other,
        })
    }

    /// Byte length of the complete-line prefix read so far
    pub fn valid_len(&self) -> u64 {
        self.valid_len
    }

    /// Whether the file ends in a partially written line
    pub fn has_torn_tail(&self) -> bool {
        self.torn_tail
    }
}

impl Iterator for WalReader {
    type Item = Result<WalRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
