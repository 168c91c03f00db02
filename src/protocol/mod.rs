//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (bincode payloads)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │   bincode(<Method>Args)     │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: REGISTER_SERVER   0x02: GET_SERVERS
//! - 0x03: CREATE_TABLE      0x04: OPEN_TABLE
//! - 0x05: CLOSE_TABLE       0x06: DESTROY_TABLE
//! - 0x07: PUT_ROW           0x08: GET_ROW
//! - 0x09: GET_ROWS          0x0A: GET_COLUMN_BY_ROW
//! - 0x0B: MEM_TABLE_LIMIT
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Kind (1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//! - 0x00: OK    - Payload: bincode(Reply), which carries the table status
//! - 0x02: ERROR - Payload: UTF-8 error message

mod codec;
mod command;
mod response;

pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use command::{
    CloseTableArgs, Command, CommandType, CreateTableArgs, DestroyTableArgs,
    GetColumnByRowArgs, GetRowArgs, GetRowsArgs, GetServersArgs, MemTableLimitArgs,
    OpenTableArgs, PutRowArgs, RegisterServerArgs, ServerNode,
};
pub use response::{
    CloseTableReply, CreateTableReply, DestroyTableReply, GetColumnByRowReply, GetRowReply,
    GetRowsReply, GetServersReply, MemTableLimitReply, OpenTableReply, PutRowReply,
    RegisterServerReply, Reply, Response, ResponseKind, Status, TableHandle,
};
