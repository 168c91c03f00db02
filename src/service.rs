//! Service capability
//!
//! The exact set of calls a node serves. The local [`Engine`] and the remote
//! client both implement it, and the TCP server is generic over it.
//!
//! [`Engine`]: crate::engine::Engine

use crate::error::Result;
use crate::protocol::{
    CloseTableArgs, CloseTableReply, Command, CreateTableArgs, CreateTableReply,
    DestroyTableArgs, DestroyTableReply, GetColumnByRowArgs, GetColumnByRowReply, GetRowArgs,
    GetRowReply, GetRowsArgs, GetRowsReply, GetServersArgs, GetServersReply, MemTableLimitArgs,
    MemTableLimitReply, OpenTableArgs, OpenTableReply, PutRowArgs, PutRowReply,
    RegisterServerArgs, RegisterServerReply, Reply,
};

/// Calls served by a tablet node
///
/// `Err` means the call itself failed (I/O, corruption, bad input).
/// Expected outcomes such as a missing table are an `Ok` reply carrying a
/// non-OK status.
pub trait TabletService: Send + Sync {
    fn register_server(&self, args: RegisterServerArgs) -> Result<RegisterServerReply>;
    fn get_servers(&self, args: GetServersArgs) -> Result<GetServersReply>;
    fn create_table(&self, args: CreateTableArgs) -> Result<CreateTableReply>;
    fn open_table(&self, args: OpenTableArgs) -> Result<OpenTableReply>;
    fn close_table(&self, args: CloseTableArgs) -> Result<CloseTableReply>;
    fn destroy_table(&self, args: DestroyTableArgs) -> Result<DestroyTableReply>;
    fn put_row(&self, args: PutRowArgs) -> Result<PutRowReply>;
    fn get_row(&self, args: GetRowArgs) -> Result<GetRowReply>;
    fn get_rows(&self, args: GetRowsArgs) -> Result<GetRowsReply>;
    fn get_column_by_row(&self, args: GetColumnByRowArgs) -> Result<GetColumnByRowReply>;
    fn mem_table_limit(&self, args: MemTableLimitArgs) -> Result<MemTableLimitReply>;
}

/// Route a decoded command to the matching service method
pub fn dispatch<S: TabletService + ?Sized>(service: &S, command: Command) -> Result<Reply> {
    Ok(match command {
        Command::RegisterServer(args) => Reply::RegisterServer(service.register_server(args)?),
        Command::GetServers(args) => Reply::GetServers(service.get_servers(args)?),
        Command::CreateTable(args) => Reply::CreateTable(service.create_table(args)?),
        Command::OpenTable(args) => Reply::OpenTable(service.open_table(args)?),
        Command::CloseTable(args) => Reply::CloseTable(service.close_table(args)?),
        Command::DestroyTable(args) => Reply::DestroyTable(service.destroy_table(args)?),
        Command::PutRow(args) => Reply::PutRow(service.put_row(args)?),
        Command::GetRow(args) => Reply::GetRow(service.get_row(args)?),
        Command::GetRows(args) => Reply::GetRows(service.get_rows(args)?),
        Command::GetColumnByRow(args) => Reply::GetColumnByRow(service.get_column_by_row(args)?),
        Command::MemTableLimit(args) => Reply::MemTableLimit(service.mem_table_limit(args)?),
    })
}
