//! The local IPC surface (spec.md §4.F): wire framing, the request/response
//! envelope, the command table, and the socket acceptor.

mod codec;
mod commands;
mod protocol;
mod server;

pub use codec::{read_message, write_message, MAX_MESSAGE_BYTES};
pub use protocol::{Request, Response, Status};
pub use server::serve;
