//! Data Log
//!
//! Append-only file of flushed row fragments, one `rowKey|<json>` per line.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, TabletError};
use crate::memtable::RowFragment;

/// Append-only line log holding every flushed fragment of one table
///
/// ## Concurrency:
/// - Appends need `&mut self` (the owning table holds its write lock)
/// - Reads open a fresh file handle, so any number may run under `&self`
pub struct DataLog {
    path: PathBuf,
    /// Append handle
    file: File,
    /// Number of complete lines; the offset of the next appended line
    line_count: u64,
}

impl DataLog {
    /// Create a new, empty data log. Fails if the file already exists.
    pub fn create(path: &Path) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        file.sync_all()?;
        Ok(())
    }

    /// Open an existing data log for appending
    ///
    /// Counts existing lines. A trailing partial line (an interrupted flush)
    /// is cut off so the next append starts on a fresh line.
    pub fn open(path: &Path) -> Result<Self> {
        let (line_count, complete_len, total_len) = Self::scan(path)?;

        let file = OpenOptions::new().append(true).open(path)?;
        if complete_len < total_len {
            tracing::warn!(
                "Truncating {} bytes of partial line at end of {}",
                total_len - complete_len,
                path.display()
            );
            file.set_len(complete_len)?;
            file.sync_all()?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            line_count,
        })
    }

    /// Append one line per row and fsync
    ///
    /// Returns each row key with the line number it now occupies, in input
    /// order. On failure the file is cut back to its previous length and the
    /// line counter is left unchanged.
    pub fn append_rows<'a, I>(&mut self, rows: I) -> Result<Vec<(String, u64)>>
    where
        I: IntoIterator<Item = (&'a String, &'a RowFragment)>,
    {
        let mut buf = String::new();
        let mut placed = Vec::new();
        let mut next_line = self.line_count;

        for (row_key, fragment) in rows {
            buf.push_str(row_key);
            buf.push('|');
            buf.push_str(&fragment.to_json()?);
            buf.push('\n');
            placed.push((row_key.clone(), next_line));
            next_line += 1;
        }

        if placed.is_empty() {
            return Ok(placed);
        }

        let start = self.file.metadata()?.len();
        let written = self
            .file
            .write_all(buf.as_bytes())
            .and_then(|_| self.file.sync_data());

        if let Err(e) = written {
            if let Err(undo) = self.file.set_len(start) {
                tracing::error!(
                    "Failed to roll back data log {} after write error: {}",
                    self.path.display(),
                    undo
                );
            }
            return Err(e.into());
        }

        self.line_count = next_line;
        Ok(placed)
    }

    /// Read the lines at `offsets` in one forward pass
    ///
    /// `offsets` may be in any order and may repeat; results come back in
    /// ascending offset order, one per distinct offset.
    pub fn read_lines(&self, offsets: &[u64]) -> Result<Vec<(u64, String, RowFragment)>> {
        let mut wanted: Vec<u64> = offsets.to_vec();
        wanted.sort_unstable();
        wanted.dedup();

        let mut out = Vec::with_capacity(wanted.len());
        if wanted.is_empty() {
            return Ok(out);
        }

        let mut reader = BufReader::new(File::open(&self.path)?);
        let mut line = Vec::new();
        let mut skipped = Vec::new();
        let mut current: u64 = 0;

        for target in wanted {
            // Skip ahead without materializing the skipped lines
            while current < target {
                skipped.clear();
                if reader.read_until(b'\n', &mut skipped)? == 0 {
                    return Err(Self::missing_line(target, current));
                }
                current += 1;
            }

            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 || line.last() != Some(&b'\n') {
                return Err(Self::missing_line(target, current));
            }
            current += 1;
            line.pop();

            let text = std::str::from_utf8(&line).map_err(|_| {
                TabletError::DataLogCorruption(format!("line {} is not valid UTF-8", target))
            })?;
            let (row_key, fragment) = Self::parse_line(text, target)?;
            out.push((target, row_key, fragment));
        }

        Ok(out)
    }

    /// Read the fragments of one row, oldest first
    ///
    /// Every line must belong to `row_key`; anything else means the index
    /// and the log disagree.
    pub fn read_fragments(&self, row_key: &str, offsets: &[u64]) -> Result<Vec<RowFragment>> {
        self.read_lines(offsets)?
            .into_iter()
            .map(|(offset, key, fragment)| {
                if key == row_key {
                    Ok(fragment)
                } else {
                    Err(TabletError::DataLogCorruption(format!(
                        "line {} holds row {:?}, expected {:?}",
                        offset, key, row_key
                    )))
                }
            })
            .collect()
    }

    /// Number of complete lines in the log
    pub fn line_count(&self) -> u64 {
        self.line_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Split a line at its first `|`; row keys never contain one
    fn parse_line(line: &str, offset: u64) -> Result<(String, RowFragment)> {
        let (row_key, json) = line.split_once('|').ok_or_else(|| {
            TabletError::DataLogCorruption(format!("line {} has no row key separator", offset))
        })?;

        let fragment = RowFragment::from_json(json).map_err(|e| {
            TabletError::DataLogCorruption(format!("line {}: {}", offset, e))
        })?;

        Ok((row_key.to_string(), fragment))
    }

    fn missing_line(target: u64, available: u64) -> TabletError {
        TabletError::DataLogCorruption(format!(
            "line {} requested but log ends after {} lines",
            target, available
        ))
    }

    /// Returns (complete lines, byte length of complete lines, file length)
    fn scan(path: &Path) -> Result<(u64, u64, u64)> {
        let mut file = File::open(path)?;
        let mut buf = vec![0u8; 32 * 1024];
        let mut lines = 0u64;
        let mut total = 0u64;
        let mut complete = 0u64;

        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            for (i, byte) in buf[..n].iter().enumerate() {
                if *byte == b'\n' {
                    lines += 1;
                    complete = total + i as u64 + 1;
                }
            }
            total += n as u64;
        }

        Ok((lines, complete, total))
    }
}
