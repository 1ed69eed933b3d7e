//! Bridge transport - relays requests to a helper process that owns the
//! system scripting connection to the application.
//!
//! Architecture:
//! - `process.rs` - Helper binary detection and process spawning
//! - `ipc.rs` - Async IPC connection (Named Pipes on Windows, Unix Sockets elsewhere)
//! - `protocol.rs` - JSON request/response types and value encoding
//! - `client.rs` - `BridgeTransport`, the `Transport` implementation

mod client;
mod ipc;
mod process;
mod protocol;

pub use client::{BridgeError, BridgeTransport};
pub use ipc::IpcError;
pub use process::{default_socket_path, find_helper, ProcessError};
pub use protocol::{enum_code, enum_from_code, BridgeCommand, BridgeResponse};
