//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//! The payload is the bincode encoding of the method's argument struct.
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Kind (1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::{BufMut, BytesMut};
use serde::de::DeserializeOwned;

use super::{Command, CommandType, Reply, Response, ResponseKind};
use crate::error::{Result, TabletError};

/// Header size: 1 byte command/kind + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    let payload = match command {
        Command::RegisterServer(args) => bincode::serialize(args)?,
        Command::GetServers(args) => bincode::serialize(args)?,
        Command::CreateTable(args) => bincode::serialize(args)?,
        Command::OpenTable(args) => bincode::serialize(args)?,
        Command::CloseTable(args) => bincode::serialize(args)?,
        Command::DestroyTable(args) => bincode::serialize(args)?,
        Command::PutRow(args) => bincode::serialize(args)?,
        Command::GetRow(args) => bincode::serialize(args)?,
        Command::GetRows(args) => bincode::serialize(args)?,
        Command::GetColumnByRow(args) => bincode::serialize(args)?,
        Command::MemTableLimit(args) => bincode::serialize(args)?,
    };

    frame(command.command_type() as u8, &payload)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_byte, payload) = split_frame(bytes, "command")?;

    let cmd_type = CommandType::from_u8(cmd_byte).ok_or_else(|| {
        TabletError::Protocol(format!("Unknown command type: 0x{:02x}", cmd_byte))
    })?;

    Ok(match cmd_type {
        CommandType::RegisterServer => Command::RegisterServer(decode_args(payload, cmd_type)?),
        CommandType::GetServers => Command::GetServers(decode_args(payload, cmd_type)?),
        CommandType::CreateTable => Command::CreateTable(decode_args(payload, cmd_type)?),
        CommandType::OpenTable => Command::OpenTable(decode_args(payload, cmd_type)?),
        CommandType::CloseTable => Command::CloseTable(decode_args(payload, cmd_type)?),
        CommandType::DestroyTable => Command::DestroyTable(decode_args(payload, cmd_type)?),
        CommandType::PutRow => Command::PutRow(decode_args(payload, cmd_type)?),
        CommandType::GetRow => Command::GetRow(decode_args(payload, cmd_type)?),
        CommandType::GetRows => Command::GetRows(decode_args(payload, cmd_type)?),
        CommandType::GetColumnByRow => Command::GetColumnByRow(decode_args(payload, cmd_type)?),
        CommandType::MemTableLimit => Command::MemTableLimit(decode_args(payload, cmd_type)?),
    })
}

fn decode_args<T: DeserializeOwned>(payload: &[u8], cmd_type: CommandType) -> Result<T> {
    bincode::deserialize(payload).map_err(|e| {
        TabletError::Protocol(format!("{:?} command: malformed payload: {}", cmd_type, e))
    })
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: kind (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    let payload = match response {
        Response::Ok(reply) => bincode::serialize(reply)?,
        Response::Error(message) => message.as_bytes().to_vec(),
    };

    frame(response.kind() as u8, &payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (kind_byte, payload) = split_frame(bytes, "response")?;

    match kind_byte {
        k if k == ResponseKind::Ok as u8 => {
            let reply: Reply = bincode::deserialize(payload).map_err(|e| {
                TabletError::Protocol(format!("Malformed reply payload: {}", e))
            })?;
            Ok(Response::Ok(reply))
        }
        k if k == ResponseKind::Error as u8 => {
            Ok(Response::Error(String::from_utf8_lossy(payload).into_owned()))
        }
        _ => Err(TabletError::Protocol(format!(
            "Unknown response kind: 0x{:02x}",
            kind_byte
        ))),
    }
}

// =============================================================================
// Framing
// =============================================================================

fn frame(tag: u8, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_SIZE as usize {
        return Err(TabletError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(tag);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);

    Ok(message.to_vec())
}

/// Validate a complete frame and split it into (tag, payload)
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(TabletError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;

    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(TabletError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(TabletError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((bytes[0], &bytes[HEADER_SIZE..total_len]))
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete frame (header + payload) from a stream
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    // Read header first
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    // Parse payload length
    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;

    // Validate payload length
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(TabletError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut message = vec![0u8; HEADER_SIZE + payload_len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }

    Ok(message)
}

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    decode_command(&read_frame(reader)?)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    decode_response(&read_frame(reader)?)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
