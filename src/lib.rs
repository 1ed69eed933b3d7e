//! Typed remote-object client for scripting QuickTime Player.
//!
//! Build an [`ObjectPath`], wrap it in a [`Proxy`] (or one of the typed
//! handles in [`quicktime`]) and call it. Calls are checked against the
//! [`catalog`] before anything is sent through the [`Transport`].

pub mod bridge;
pub mod catalog;
mod config;
mod error;
pub mod path;
pub mod proxy;
pub mod quicktime;
pub mod transport;
mod value;

#[cfg(test)]
mod testing;

pub use bridge::BridgeTransport;
pub use catalog::{schema_for, ObjectKind};
pub use config::{BridgeConfig, ConfigError};
pub use error::{ProxyError, Result};
pub use path::{resolve, AddressingStep, ObjectId, ObjectPath, Selector};
pub use proxy::{Elements, Proxy};
pub use quicktime::{Application, CompressionPreset, Document, PrintOptions, RecordingDevice, Window};
pub use transport::{Operation, RemoteError, Reply, Request, Transport};
pub use value::{EnumKind, EnumValue, Point, PrintErrorHandling, Rect, SaveOption, Value, ValueType};
