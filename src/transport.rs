//! The seam between proxies and whatever delivers requests to the remote
//! application.

use std::future::Future;

use thiserror::Error;

use crate::path::ObjectPath;
use crate::value::Value;
use crate::ObjectKind;

/// Apple Event status codes the proxy layer and transports agree on.
pub mod codes {
  /// Could not coerce a reply into something usable.
  pub const COERCION_FAILED: i32 = -1700;
  /// The event handler ran past its timeout.
  pub const TIMEOUT: i32 = -1712;
  /// The index is out of range.
  pub const ILLEGAL_INDEX: i32 = -1719;
  /// The addressed object does not exist.
  pub const NO_SUCH_OBJECT: i32 = -1728;
  /// The target application is not running or unreachable.
  pub const PROCESS_NOT_FOUND: i32 = -600;
  /// The connection to the target went away.
  pub const CONNECTION_INVALID: i32 = -609;
  /// The target does not handle this event.
  pub const EVENT_NOT_HANDLED: i32 = -1708;
  /// The handler ran and reported failure.
  pub const EVENT_FAILED: i32 = -10000;
}

/// Failure reported by the transport or the remote application.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("remote error {code}: {message}")]
pub struct RemoteError {
  pub code: i32,
  pub message: String,
}

impl RemoteError {
  pub fn new(code: i32, message: impl Into<String>) -> Self {
    Self {
      code,
      message: message.into(),
    }
  }

  /// Whether the error means the addressed object is gone.
  pub fn is_not_found(&self) -> bool {
    self.code == codes::NO_SUCH_OBJECT || self.code == codes::ILLEGAL_INDEX
  }
}

/// What to do with the addressed object.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
  GetProperty {
    name: &'static str,
  },
  SetProperty {
    name: &'static str,
    value: Value,
  },
  /// Named arguments in declaration order; omitted optionals are absent.
  Command {
    name: &'static str,
    args: Vec<(&'static str, Value)>,
  },
  /// List the elements of one kind.
  Elements {
    kind: ObjectKind,
  },
}

/// One round trip to the remote application.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
  pub path: ObjectPath,
  pub operation: Operation,
}

/// Raw reply, before it is conformed to a declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
  /// No result, or the remote "missing value".
  Nothing,
  Value(Value),
  Elements(Vec<ObjectPath>),
}

/// Delivers requests to the remote application.
///
/// Implementations own their wire encoding and their own synchronisation;
/// proxies share one transport through an `Arc` and call it concurrently.
pub trait Transport: Send + Sync + 'static {
  fn send(&self, request: Request) -> impl Future<Output = Result<Reply, RemoteError>> + Send;
}

