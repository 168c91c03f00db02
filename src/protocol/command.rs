//! Command definitions
//!
//! Requests a client can send to a node, one per RPC method.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Command types (first byte of a request frame)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    RegisterServer = 0x01,
    GetServers = 0x02,
    CreateTable = 0x03,
    OpenTable = 0x04,
    CloseTable = 0x05,
    DestroyTable = 0x06,
    PutRow = 0x07,
    GetRow = 0x08,
    GetRows = 0x09,
    GetColumnByRow = 0x0A,
    MemTableLimit = 0x0B,
}

impl CommandType {
    pub fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0x01 => CommandType::RegisterServer,
            0x02 => CommandType::GetServers,
            0x03 => CommandType::CreateTable,
            0x04 => CommandType::OpenTable,
            0x05 => CommandType::CloseTable,
            0x06 => CommandType::DestroyTable,
            0x07 => CommandType::PutRow,
            0x08 => CommandType::GetRow,
            0x09 => CommandType::GetRows,
            0x0A => CommandType::GetColumnByRow,
            0x0B => CommandType::MemTableLimit,
            _ => return None,
        })
    }
}

/// A cluster member
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerNode {
    pub host_port: String,
    /// Ring position
    pub node_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterServerArgs {
    pub server_info: ServerNode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetServersArgs;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTableArgs {
    pub table_name: String,
    pub column_families: Vec<String>,
    /// Initial flush threshold; the node default when `None`
    pub memtable_limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenTableArgs {
    pub table_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseTableArgs {
    pub table_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyTableArgs {
    pub table_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutRowArgs {
    pub table_name: String,
    pub row_key: String,
    /// Qualified column key (`family:qualifier`) to value
    pub updated_columns: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRowArgs {
    pub table_name: String,
    pub row_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRowsArgs {
    pub table_name: String,
    pub start_row_key: String,
    pub end_row_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetColumnByRowArgs {
    pub table_name: String,
    pub row_key: String,
    pub qualified_column_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemTableLimitArgs {
    pub table_name: String,
    pub new_limit_rows: usize,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RegisterServer(RegisterServerArgs),
    GetServers(GetServersArgs),
    CreateTable(CreateTableArgs),
    OpenTable(OpenTableArgs),
    CloseTable(CloseTableArgs),
    DestroyTable(DestroyTableArgs),
    PutRow(PutRowArgs),
    GetRow(GetRowArgs),
    GetRows(GetRowsArgs),
    GetColumnByRow(GetColumnByRowArgs),
    MemTableLimit(MemTableLimitArgs),
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::RegisterServer(_) => CommandType::RegisterServer,
            Command::GetServers(_) => CommandType::GetServers,
            Command::CreateTable(_) => CommandType::CreateTable,
            Command::OpenTable(_) => CommandType::OpenTable,
            Command::CloseTable(_) => CommandType::CloseTable,
            Command::DestroyTable(_) => CommandType::DestroyTable,
            Command::PutRow(_) => CommandType::PutRow,
            Command::GetRow(_) => CommandType::GetRow,
            Command::GetRows(_) => CommandType::GetRows,
            Command::GetColumnByRow(_) => CommandType::GetColumnByRow,
            Command::MemTableLimit(_) => CommandType::MemTableLimit,
        }
    }
}
