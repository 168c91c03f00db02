//! Write-Ahead Log (WAL) Module
//!
//! Provides durability for memtable contents that have not been flushed.
//!
//! ## Responsibilities
//! - Append one record per column mutation before the memtable changes
//! - fsync every append (the durability point of `PutRow`)
//! - Mark flush checkpoints
//! - Crash recovery by replay from the start of the file
//!
//! ## File Format
//! UTF-8 text, one record per line:
//! ```text
//! row1|cf:a|value
//! row1|cf:b|other value
//! --checkpoint--
//! row2|cf:a|value
//! ```
//! A checkpoint line means everything above it is already durable in the
//! data log. The file is never truncated after a checkpoint, so recovery cost
//! grows with the lifetime of the table.

mod entry;
mod reader;
mod recovery;
mod writer;

pub use entry::{WalRecord, CHECKPOINT_TOKEN};
pub use reader::WalReader;
pub use recovery::{RecoveryResult, WalRecovery};
pub use writer::WalWriter;
