//! WAL record definitions
//!
//! Defines the structure of individual WAL lines.

use crate::error::{Result, TabletError};

/// Reserved line marking a completed flush
///
/// Never collides with a mutation line: mutation lines always carry two `|`
/// separators and this token carries none.
pub const CHECKPOINT_TOKEN: &str = "--checkpoint--";

/// A single record in the WAL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalRecord {
    /// Set one column of one row
    Mutation {
        row_key: String,
        column_key: String,
        value: String,
    },

    /// Everything before this record is durable in the data log
    Checkpoint,
}

impl WalRecord {
    pub fn mutation(
        row_key: impl Into<String>,
        column_key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        WalRecord::Mutation {
            row_key: row_key.into(),
            column_key: column_key.into(),
            value: value.into(),
        }
    }

    /// Encode as a single line, including the trailing newline
    pub fn encode(&self) -> String {
        match self {
            WalRecord::Mutation {
                row_key,
                column_key,
                value,
            } => format!("{}|{}|{}\n", row_key, column_key, value),
            WalRecord::Checkpoint => format!("{}\n", CHECKPOINT_TOKEN),
        }
    }

    /// Decode a line (without its trailing newline)
    ///
    /// Values may contain `|`; row and column keys may not.
    pub fn decode(line: &str) -> Result<Self> {
        if line == CHECKPOINT_TOKEN {
            return Ok(WalRecord::Checkpoint);
        }

        let mut parts = line.splitn(3, '|');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(row_key), Some(column_key), Some(value)) => {
                Ok(WalRecord::mutation(row_key, column_key, value))
            }
            _ => Err(TabletError::WalCorruption(format!(
                "malformed record: {:?}",
                line
            ))),
        }
    }
}
