//! Remote object proxies.
//!
//! A `Proxy` is an object path plus the transport it talks through. Building
//! one is free; every operation validates against the catalog first and then
//! makes exactly one round trip.

use std::sync::Arc;

use crate::catalog::{schema_for, CommandSpec, Presence, Schema};
use crate::error::{ProxyError, Result};
use crate::path::{AddressingStep, ObjectPath};
use crate::transport::{codes, Operation, Reply, Request, Transport};
use crate::value::{Value, ValueType};
use crate::ObjectKind;

/// Local handle for an object living in the remote application.
pub struct Proxy<T> {
  path: ObjectPath,
  transport: Arc<T>,
}

impl<T> Proxy<T> {
  pub fn new(path: ObjectPath, transport: Arc<T>) -> Self {
    Self { path, transport }
  }

  /// Proxy for the application root.
  pub fn application(transport: Arc<T>) -> Self {
    Self::new(ObjectPath::application(), transport)
  }

  pub fn path(&self) -> &ObjectPath {
    &self.path
  }

  pub fn kind(&self) -> ObjectKind {
    self.path.kind()
  }

  pub fn schema(&self) -> &'static Schema {
    schema_for(self.kind())
  }

  pub fn transport(&self) -> &Arc<T> {
    &self.transport
  }

  /// Proxy for another path on the same transport, e.g. a returned reference.
  pub fn with_path(&self, path: ObjectPath) -> Proxy<T> {
    Proxy::new(path, self.transport.clone())
  }

  /// Child proxy. Only checks that this kind can contain `step.kind`.
  pub fn element(&self, step: AddressingStep) -> Result<Proxy<T>> {
    if !self.schema().contains(step.kind) {
      return Err(ProxyError::UnknownElement {
        kind: self.kind(),
        element: step.kind,
      });
    }
    Ok(self.with_path(self.path.resolve(step)))
  }
}

impl<T: Transport> Proxy<T> {
  /// Read a property, conformed to its declared type.
  pub async fn get_property(&self, name: &str) -> Result<Value> {
    let spec = self
      .schema()
      .property(name)
      .ok_or_else(|| ProxyError::UnknownProperty {
        kind: self.kind(),
        name: name.to_string(),
      })?;

    let reply = self
      .round_trip(Operation::GetProperty { name: spec.name })
      .await?;
    self.conform_reply(reply, spec.name, spec.ty)
  }

  /// Write a settable property.
  pub async fn set_property(&self, name: &str, value: impl Into<Value>) -> Result<()> {
    let value = value.into();
    let spec = self
      .schema()
      .property(name)
      .ok_or_else(|| ProxyError::UnknownProperty {
        kind: self.kind(),
        name: name.to_string(),
      })?;
    if !spec.settable {
      return Err(ProxyError::ReadOnlyProperty {
        kind: self.kind(),
        name: spec.name.to_string(),
      });
    }
    if !value.conforms_to(spec.ty) {
      return Err(ProxyError::TypeMismatch {
        what: format!("property '{}'", spec.name),
        expected: spec.ty,
        found: value.value_type(),
      });
    }

    self
      .round_trip(Operation::SetProperty {
        name: spec.name,
        value,
      })
      .await?;
    Ok(())
  }

  /// Run a command with positional arguments.
  ///
  /// Trailing parameters may be left out; defaulted ones are filled in before
  /// sending. Returns `None` for commands without a result.
  pub async fn invoke(&self, command: &str, args: Vec<Value>) -> Result<Option<Value>> {
    let spec = self
      .schema()
      .command(command)
      .ok_or_else(|| ProxyError::UnknownCommand {
        kind: self.kind(),
        name: command.to_string(),
      })?;
    let args = bind_args(spec, args)?;

    let reply = self
      .round_trip(Operation::Command {
        name: spec.name,
        args,
      })
      .await?;

    match spec.returns {
      None => Ok(None),
      Some(ty) => self.conform_reply(reply, spec.name, ty).map(Some),
    }
  }

  /// List the elements of `kind` in one round trip.
  pub async fn elements(&self, kind: ObjectKind) -> Result<Elements<T>> {
    if !self.schema().contains(kind) {
      return Err(ProxyError::UnknownElement {
        kind: self.kind(),
        element: kind,
      });
    }

    let paths = match self.round_trip(Operation::Elements { kind }).await? {
      Reply::Elements(paths) => paths,
      Reply::Nothing => Vec::new(),
      Reply::Value(value) => {
        return Err(ProxyError::TypeMismatch {
          what: format!("elements of {}", self.path),
          expected: ValueType::Reference(kind),
          found: value.value_type(),
        })
      }
    };

    if let Some(stray) = paths.iter().find(|p| p.kind() != kind) {
      return Err(ProxyError::TypeMismatch {
        what: format!("elements of {}", self.path),
        expected: ValueType::Reference(kind),
        found: ValueType::Reference(stray.kind()),
      });
    }

    Ok(Elements {
      paths,
      transport: self.transport.clone(),
    })
  }

  async fn round_trip(&self, operation: Operation) -> Result<Reply> {
    log::debug!("{:?} -> {}", operation, self.path);
    let request = Request {
      path: self.path.clone(),
      operation,
    };
    self.transport.send(request).await.map_err(|e| {
      log::debug!("request on {} failed: {}", self.path, e);
      ProxyError::from_remote(&self.path, e)
    })
  }

  fn conform_reply(&self, reply: Reply, name: &str, ty: ValueType) -> Result<Value> {
    match reply {
      Reply::Value(value) => {
        let found = value.value_type();
        value.conform(ty).ok_or_else(|| ProxyError::TypeMismatch {
          what: format!("'{}' of {}", name, self.path),
          expected: ty,
          found,
        })
      }
      Reply::Nothing => Err(ProxyError::MissingValue {
        name: name.to_string(),
      }),
      Reply::Elements(_) => Err(ProxyError::Remote {
        code: codes::COERCION_FAILED,
        message: format!("'{}' of {} replied with an element list", name, self.path),
      }),
    }
  }
}

impl<T> Clone for Proxy<T> {
  fn clone(&self) -> Self {
    Self {
      path: self.path.clone(),
      transport: self.transport.clone(),
    }
  }
}

impl<T> std::fmt::Debug for Proxy<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("Proxy").field(&self.path.to_string()).finish()
  }
}

/// Match positional arguments against a command signature.
fn bind_args(spec: &CommandSpec, args: Vec<Value>) -> Result<Vec<(&'static str, Value)>> {
  let min = spec.required_params();
  let max = spec.params.len();
  if args.len() < min || args.len() > max {
    return Err(ProxyError::WrongArity {
      command: spec.name.to_string(),
      min,
      max,
      given: args.len(),
    });
  }

  let mut bound = Vec::with_capacity(max);
  let mut args = args.into_iter();
  for param in spec.params {
    match args.next() {
      Some(value) => {
        if !value.conforms_to(param.ty) {
          return Err(ProxyError::TypeMismatch {
            what: format!("parameter '{}' of '{}'", param.name, spec.name),
            expected: param.ty,
            found: value.value_type(),
          });
        }
        bound.push((param.name, value));
      }
      None => match param.presence {
        Presence::Defaulted(default) => bound.push((param.name, default.to_value())),
        Presence::Optional => {}
        Presence::Required => {
          return Err(ProxyError::WrongArity {
            command: spec.name.to_string(),
            min,
            max,
            given: bound.len(),
          })
        }
      },
    }
  }
  Ok(bound)
}

/// Result of an element listing.
///
/// Proxies are built on demand while iterating, without further I/O. The
/// listing can be iterated any number of times.
pub struct Elements<T> {
  paths: Vec<ObjectPath>,
  transport: Arc<T>,
}

impl<T> Elements<T> {
  pub fn len(&self) -> usize {
    self.paths.len()
  }

  pub fn is_empty(&self) -> bool {
    self.paths.is_empty()
  }

  pub fn paths(&self) -> &[ObjectPath] {
    &self.paths
  }

  pub fn get(&self, index: usize) -> Option<Proxy<T>> {
    self
      .paths
      .get(index)
      .map(|path| Proxy::new(path.clone(), self.transport.clone()))
  }

  pub fn iter(&self) -> Iter<'_, T> {
    Iter {
      paths: self.paths.iter(),
      transport: &self.transport,
    }
  }
}

/// Iterator over the proxies of an [`Elements`] listing.
pub struct Iter<'a, T> {
  paths: std::slice::Iter<'a, ObjectPath>,
  transport: &'a Arc<T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
  type Item = Proxy<T>;

  fn next(&mut self) -> Option<Self::Item> {
    self
      .paths
      .next()
      .map(|path| Proxy::new(path.clone(), self.transport.clone()))
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    self.paths.size_hint()
  }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> IntoIterator for &'a Elements<T> {
  type Item = Proxy<T>;
  type IntoIter = Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}
