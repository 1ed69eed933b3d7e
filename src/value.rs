//! Scripting value model.
//!
//! Every value crossing the proxy boundary is one of a closed set of variants.
//! Declared types live in the catalog; `conforms_to` and `conform` are the only
//! places where a value is checked against them.

use std::fmt;

use crate::path::ObjectPath;
use crate::ObjectKind;

/// What to do with unsaved changes when closing a document or quitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveOption {
  Yes,
  No,
  Ask,
}

/// How errors are reported while printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrintErrorHandling {
  Standard,
  Detailed,
}

/// Enumerations known to the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumKind {
  SaveOption,
  PrintErrorHandling,
}

/// A value of one of the dictionary enumerations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumValue {
  Save(SaveOption),
  PrintErrors(PrintErrorHandling),
}

impl EnumValue {
  pub fn kind(&self) -> EnumKind {
    match self {
      EnumValue::Save(_) => EnumKind::SaveOption,
      EnumValue::PrintErrors(_) => EnumKind::PrintErrorHandling,
    }
  }
}

impl From<SaveOption> for EnumValue {
  fn from(option: SaveOption) -> Self {
    EnumValue::Save(option)
  }
}

impl From<PrintErrorHandling> for EnumValue {
  fn from(handling: PrintErrorHandling) -> Self {
    EnumValue::PrintErrors(handling)
  }
}

/// A 2D point, used for natural dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

/// A rectangle in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
  pub x: f64,
  pub y: f64,
  pub width: f64,
  pub height: f64,
}

/// Declared type of a property, parameter or command result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
  Text,
  Boolean,
  /// A number with no fractional part.
  Integer,
  Real,
  Point,
  Rect,
  Url,
  Enum(EnumKind),
  Reference(ObjectKind),
  /// A reference to an object of any kind (insertion locations).
  AnyReference,
  /// Opaque object identifier. Text on our side, whatever the remote sends.
  Identifier,
}

impl fmt::Display for ValueType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValueType::Text => f.write_str("text"),
      ValueType::Boolean => f.write_str("boolean"),
      ValueType::Integer => f.write_str("integer"),
      ValueType::Real => f.write_str("real"),
      ValueType::Point => f.write_str("point"),
      ValueType::Rect => f.write_str("rectangle"),
      ValueType::Url => f.write_str("file URL"),
      ValueType::Enum(EnumKind::SaveOption) => f.write_str("save options"),
      ValueType::Enum(EnumKind::PrintErrorHandling) => f.write_str("printing error handling"),
      ValueType::Reference(kind) => write!(f, "reference to {}", kind),
      ValueType::AnyReference => f.write_str("reference"),
      ValueType::Identifier => f.write_str("identifier"),
    }
  }
}

/// A value exchanged with the remote application.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Text(String),
  Bool(bool),
  Number(f64),
  Point(Point),
  Rect(Rect),
  Url(String),
  Enum(EnumValue),
  Reference(ObjectPath),
}

impl Value {
  /// The most specific type describing this value.
  pub fn value_type(&self) -> ValueType {
    match self {
      Value::Text(_) => ValueType::Text,
      Value::Bool(_) => ValueType::Boolean,
      Value::Number(n) if n.fract() == 0.0 => ValueType::Integer,
      Value::Number(_) => ValueType::Real,
      Value::Point(_) => ValueType::Point,
      Value::Rect(_) => ValueType::Rect,
      Value::Url(_) => ValueType::Url,
      Value::Enum(e) => ValueType::Enum(e.kind()),
      Value::Reference(path) => ValueType::Reference(path.kind()),
    }
  }

  /// Strict check used for arguments and property writes.
  ///
  /// Numbers must be finite: NaN and infinities have no wire form.
  pub fn conforms_to(&self, ty: ValueType) -> bool {
    match (self, ty) {
      (Value::Text(_), ValueType::Text | ValueType::Identifier) => true,
      (Value::Bool(_), ValueType::Boolean) => true,
      (Value::Number(n), ValueType::Integer) => n.is_finite() && n.fract() == 0.0,
      (Value::Number(n), ValueType::Real) => n.is_finite(),
      (Value::Point(p), ValueType::Point) => p.x.is_finite() && p.y.is_finite(),
      (Value::Rect(r), ValueType::Rect) => {
        [r.x, r.y, r.width, r.height].iter().all(|n| n.is_finite())
      }
      (Value::Url(_), ValueType::Url) => true,
      (Value::Enum(e), ValueType::Enum(kind)) => e.kind() == kind,
      (Value::Reference(path), ValueType::Reference(kind)) => path.kind() == kind,
      (Value::Reference(_), ValueType::AnyReference) => true,
      _ => false,
    }
  }

  /// Map a raw reply onto its declared type.
  ///
  /// Accepts everything `conforms_to` accepts, plus the loose forms remote
  /// replies come in: file URLs as text, and numeric identifiers.
  pub fn conform(self, ty: ValueType) -> Option<Value> {
    match (self, ty) {
      (Value::Text(s), ValueType::Url) => Some(Value::Url(s)),
      (Value::Number(n), ValueType::Identifier) if n.is_finite() && n.fract() == 0.0 => {
        Some(Value::Text(format!("{}", n as i64)))
      }
      (value, ty) if value.conforms_to(ty) => Some(value),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Text(s) | Value::Url(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_f64(&self) -> Option<f64> {
    match self {
      Value::Number(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Value::Number(n) if n.fract() == 0.0 => Some(*n as i64),
      _ => None,
    }
  }

  pub fn as_point(&self) -> Option<Point> {
    match self {
      Value::Point(p) => Some(*p),
      _ => None,
    }
  }

  pub fn as_rect(&self) -> Option<Rect> {
    match self {
      Value::Rect(r) => Some(*r),
      _ => None,
    }
  }

  pub fn as_reference(&self) -> Option<&ObjectPath> {
    match self {
      Value::Reference(path) => Some(path),
      _ => None,
    }
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::Text(s.to_string())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::Text(s)
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Value::Bool(b)
  }
}

impl From<f64> for Value {
  fn from(n: f64) -> Self {
    Value::Number(n)
  }
}

impl From<i64> for Value {
  fn from(n: i64) -> Self {
    Value::Number(n as f64)
  }
}

impl From<Point> for Value {
  fn from(p: Point) -> Self {
    Value::Point(p)
  }
}

impl From<Rect> for Value {
  fn from(r: Rect) -> Self {
    Value::Rect(r)
  }
}

impl From<SaveOption> for Value {
  fn from(option: SaveOption) -> Self {
    Value::Enum(option.into())
  }
}

impl From<PrintErrorHandling> for Value {
  fn from(handling: PrintErrorHandling) -> Self {
    Value::Enum(handling.into())
  }
}

impl From<ObjectPath> for Value {
  fn from(path: ObjectPath) -> Self {
    Value::Reference(path)
  }
}
