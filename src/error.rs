//! Proxy error types.

use thiserror::Error;

use crate::path::ObjectPath;
use crate::transport::RemoteError;
use crate::value::ValueType;
use crate::ObjectKind;

/// Errors surfaced by proxy operations.
///
/// Everything except `NotFound`, `Remote` and `MissingValue` is detected
/// locally, before a request is sent.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProxyError {
  #[error("{kind} has no property named '{name}'")]
  UnknownProperty { kind: ObjectKind, name: String },

  #[error("{kind} does not understand the '{name}' command")]
  UnknownCommand { kind: ObjectKind, name: String },

  #[error("{kind} has no {element} elements")]
  UnknownElement { kind: ObjectKind, element: ObjectKind },

  #[error("property '{name}' of {kind} is read-only")]
  ReadOnlyProperty { kind: ObjectKind, name: String },

  #[error("{what}: expected {expected}, got {found}")]
  TypeMismatch {
    what: String,
    expected: ValueType,
    found: ValueType,
  },

  #[error("'{command}' takes {min} to {max} arguments, got {given}")]
  WrongArity {
    command: String,
    min: usize,
    max: usize,
    given: usize,
  },

  #[error("'{name}' has no value")]
  MissingValue { name: String },

  #[error("can't get {path}: no such object")]
  NotFound { path: ObjectPath },

  #[error("remote error {code}: {message}")]
  Remote { code: i32, message: String },
}

impl ProxyError {
  /// Classify a transport failure for the object at `path`.
  pub fn from_remote(path: &ObjectPath, err: RemoteError) -> Self {
    if err.is_not_found() {
      ProxyError::NotFound { path: path.clone() }
    } else {
      ProxyError::Remote {
        code: err.code,
        message: err.message,
      }
    }
  }
}

/// Result type alias using [`ProxyError`].
pub type Result<T> = std::result::Result<T, ProxyError>;
