//! Response definitions
//!
//! Reply payloads for every command, plus the envelope that separates a
//! handled call from a failed one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ServerNode;

/// Outcome of a handled call, returned as data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Status {
    Ok = 1,
    TableExist = 2,
    TableNotFound = 3,
    TableOpenByOther = 4,
    WrongServer = 5,
    NotReady = 6,
}

impl Status {
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

/// Client-visible description of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableHandle {
    pub table_name: String,
    pub column_families: Vec<String>,
    pub memtable_limit: usize,
    /// Unix millis
    pub creation_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterServerReply {
    pub status: Status,
    /// Sorted by node id; empty until the cluster is ready
    pub servers: Vec<ServerNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetServersReply {
    pub status: Status,
    pub servers: Vec<ServerNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTableReply {
    pub status: Status,
    pub table_handle: Option<TableHandle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenTableReply {
    pub status: Status,
    pub table_handle: Option<TableHandle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseTableReply {
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyTableReply {
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutRowReply {
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRowReply {
    pub status: Status,
    /// JSON object of qualified column key to value
    pub row: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRowsReply {
    pub status: Status,
    /// Row key to JSON object of columns
    pub rows: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetColumnByRowReply {
    pub status: Status,
    /// Empty when the column is absent
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemTableLimitReply {
    pub status: Status,
}

/// Reply to any command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    RegisterServer(RegisterServerReply),
    GetServers(GetServersReply),
    CreateTable(CreateTableReply),
    OpenTable(OpenTableReply),
    CloseTable(CloseTableReply),
    DestroyTable(DestroyTableReply),
    PutRow(PutRowReply),
    GetRow(GetRowReply),
    GetRows(GetRowsReply),
    GetColumnByRow(GetColumnByRowReply),
    MemTableLimit(MemTableLimitReply),
}

/// Response frame status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseKind {
    Ok = 0x00,
    Error = 0x02,
}

/// A response to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The call was handled; its status lives inside the reply
    Ok(Reply),

    /// The call failed (I/O, corruption, invalid argument)
    Error(String),
}

impl Response {
    pub fn kind(&self) -> ResponseKind {
        match self {
            Response::Ok(_) => ResponseKind::Ok,
            Response::Error(_) => ResponseKind::Error,
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Response::Error(message.to_string())
    }
}
