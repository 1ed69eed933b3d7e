//! Object specifiers.
//!
//! An `ObjectPath` names a remote object relative to the application root. It
//! is plain data: building one never talks to the remote process, and nothing
//! about the object it names is cached here.

use std::fmt;

use crate::ObjectKind;

/// Opaque identifier of a remote object.
///
/// Windows report numeric ids and devices/presets report strings; both are
/// kept as text so every kind shares one identifier type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ObjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for ObjectId {
  fn from(id: &str) -> Self {
    Self::new(id)
  }
}

impl From<String> for ObjectId {
  fn from(id: String) -> Self {
    Self(id)
  }
}

/// How a step picks elements out of its container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
  /// Zero-based position.
  Index(usize),
  Name(String),
  Id(ObjectId),
  /// Every element of the kind.
  All,
}

/// One step of an object path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressingStep {
  pub kind: ObjectKind,
  pub selector: Selector,
}

impl AddressingStep {
  pub fn new(kind: ObjectKind, selector: Selector) -> Self {
    Self { kind, selector }
  }

  pub fn index(kind: ObjectKind, index: usize) -> Self {
    Self::new(kind, Selector::Index(index))
  }

  pub fn named(kind: ObjectKind, name: impl Into<String>) -> Self {
    Self::new(kind, Selector::Name(name.into()))
  }

  pub fn id(kind: ObjectKind, id: impl Into<ObjectId>) -> Self {
    Self::new(kind, Selector::Id(id.into()))
  }

  pub fn all(kind: ObjectKind) -> Self {
    Self::new(kind, Selector::All)
  }
}

/// Path from the application root to a remote object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ObjectPath {
  steps: Vec<AddressingStep>,
}

impl ObjectPath {
  /// The application itself.
  pub fn application() -> Self {
    Self { steps: Vec::new() }
  }

  pub fn from_steps(steps: Vec<AddressingStep>) -> Self {
    Self { steps }
  }

  /// Append a step. See [`resolve`].
  pub fn resolve(&self, step: AddressingStep) -> Self {
    resolve(self, step)
  }

  pub fn steps(&self) -> &[AddressingStep] {
    &self.steps
  }

  pub fn is_application(&self) -> bool {
    self.steps.is_empty()
  }

  /// Kind of the object this path addresses.
  pub fn kind(&self) -> ObjectKind {
    self
      .steps
      .last()
      .map(|step| step.kind)
      .unwrap_or(ObjectKind::Application)
  }

  /// The container of this object, `None` for the application.
  pub fn parent(&self) -> Option<ObjectPath> {
    if self.steps.is_empty() {
      return None;
    }
    Some(Self {
      steps: self.steps[..self.steps.len() - 1].to_vec(),
    })
  }
}

/// Extend `root` by one addressing step.
///
/// Pure and infallible: whether the addressed object exists is only found out
/// by the first remote call made through a proxy for it.
pub fn resolve(root: &ObjectPath, step: AddressingStep) -> ObjectPath {
  let mut steps = Vec::with_capacity(root.steps.len() + 1);
  steps.extend_from_slice(&root.steps);
  steps.push(step);
  ObjectPath { steps }
}

impl fmt::Display for AddressingStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.selector {
      Selector::Index(i) => write!(f, "{} {}", self.kind, i),
      Selector::Name(name) => write!(f, "{} {:?}", self.kind, name),
      Selector::Id(id) => write!(f, "{} id {:?}", self.kind, id.as_str()),
      Selector::All => write!(f, "every {}", self.kind),
    }
  }
}

impl fmt::Display for ObjectPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for step in self.steps.iter().rev() {
      write!(f, "{} of ", step)?;
    }
    f.write_str("application")
  }
}
