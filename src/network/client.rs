//! Remote client
//!
//! Blocking client for one node. Implements [`TabletService`], so callers
//! can treat a remote node and a local engine alike.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{Result, TabletError};
use crate::protocol::{
    read_response, write_command, CloseTableArgs, CloseTableReply, Command, CreateTableArgs,
    CreateTableReply, DestroyTableArgs, DestroyTableReply, GetColumnByRowArgs,
    GetColumnByRowReply, GetRowArgs, GetRowReply, GetRowsArgs, GetRowsReply, GetServersArgs,
    GetServersReply, MemTableLimitArgs, MemTableLimitReply, OpenTableArgs, OpenTableReply,
    PutRowArgs, PutRowReply, RegisterServerArgs, RegisterServerReply, Reply, Response,
};
use crate::service::TabletService;

struct Stream {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

/// Client for a single remote node
///
/// Connects lazily on the first call and reconnects after a transport
/// failure. Calls on one client are serialized.
pub struct RemoteTablet {
    addr: String,
    timeout: Option<Duration>,
    stream: Mutex<Option<Stream>>,
}

impl RemoteTablet {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            timeout: None,
            stream: Mutex::new(None),
        }
    }

    /// Apply a read/write timeout to every connection this client opens
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Send one command and wait for its reply
    pub fn call(&self, command: Command) -> Result<Reply> {
        let mut guard = self.stream.lock();

        if guard.is_none() {
            *guard = Some(self.connect()?);
        }

        let outcome = match guard.as_mut() {
            Some(stream) => write_command(&mut stream.writer, &command)
                .and_then(|_| read_response(&mut stream.reader)),
            None => Err(TabletError::Network(format!("not connected to {}", self.addr))),
        };

        match outcome {
            Ok(Response::Ok(reply)) => Ok(reply),
            Ok(Response::Error(message)) => Err(TabletError::Remote(message)),
            Err(e) => {
                // The stream may be mid-frame; start over next time
                *guard = None;
                Err(e)
            }
        }
    }

    fn connect(&self) -> Result<Stream> {
        let stream = TcpStream::connect(&self.addr).map_err(|e| {
            TabletError::Network(format!("failed to connect to {}: {}", self.addr, e))
        })?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;

        tracing::debug!("Connected to {}", self.addr);

        Ok(Stream {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
        })
    }
}

fn unexpected(reply: Reply, expected: &str) -> TabletError {
    TabletError::Protocol(format!("expected {} reply, got {:?}", expected, reply))
}

/// Generates a service method that sends one command variant and unwraps
/// the matching reply variant.
macro_rules! remote_call {
    ($method:ident, $variant:ident, $args:ty, $reply:ty) => {
        fn $method(&self, args: $args) -> Result<$reply> {
            match self.call(Command::$variant(args))? {
                Reply::$variant(reply) => Ok(reply),
                other => Err(unexpected(other, stringify!($variant))),
            }
        }
    };
}

impl TabletService for RemoteTablet {
    remote_call!(register_server, RegisterServer, RegisterServerArgs, RegisterServerReply);
    remote_call!(get_servers, GetServers, GetServersArgs, GetServersReply);
    remote_call!(create_table, CreateTable, CreateTableArgs, CreateTableReply);
    remote_call!(open_table, OpenTable, OpenTableArgs, OpenTableReply);
    remote_call!(close_table, CloseTable, CloseTableArgs, CloseTableReply);
    remote_call!(destroy_table, DestroyTable, DestroyTableArgs, DestroyTableReply);
    remote_call!(put_row, PutRow, PutRowArgs, PutRowReply);
    remote_call!(get_row, GetRow, GetRowArgs, GetRowReply);
    remote_call!(get_rows, GetRows, GetRowsArgs, GetRowsReply);
    remote_call!(get_column_by_row, GetColumnByRow, GetColumnByRowArgs, GetColumnByRowReply);
    remote_call!(mem_table_limit, MemTableLimit, MemTableLimitArgs, MemTableLimitReply);
}
