//! Bridge JSON line protocol.
//!
//! Requests and replies are single-line JSON objects correlated by
//! `request_id`. Primitive values travel as plain JSON; everything else is a
//! `{"type": ...}` object. Enumeration values travel as four-character codes.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

use crate::path::{AddressingStep, ObjectId, ObjectPath, Selector};
use crate::transport::{codes, Operation, RemoteError, Reply, Request};
use crate::value::{EnumValue, Point, PrintErrorHandling, Rect, SaveOption, Value};
use crate::ObjectKind;

/// Global request ID counter for unique command identification.
static REQUEST_ID: AtomicI64 = AtomicI64::new(1);

/// Generate a unique request ID for bridge commands.
pub fn next_request_id() -> i64 {
  REQUEST_ID.fetch_add(1, Ordering::SeqCst)
}

/// Four-character codes of the dictionary enumerations.
const ENUM_CODES: [(EnumValue, &str); 5] = [
  (EnumValue::Save(SaveOption::Yes), "yes "),
  (EnumValue::Save(SaveOption::No), "no  "),
  (EnumValue::Save(SaveOption::Ask), "ask "),
  (EnumValue::PrintErrors(PrintErrorHandling::Standard), "lwst"),
  (EnumValue::PrintErrors(PrintErrorHandling::Detailed), "lwdt"),
];

pub fn enum_code(value: EnumValue) -> &'static str {
  ENUM_CODES
    .iter()
    .find(|(v, _)| *v == value)
    .map(|(_, code)| *code)
    .unwrap_or("????")
}

pub fn enum_from_code(code: &str) -> Option<EnumValue> {
  ENUM_CODES
    .iter()
    .find(|(_, c)| *c == code)
    .map(|(value, _)| *value)
}

/// One addressing step on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireStep {
  pub kind: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub index: Option<usize>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub all: bool,
}

impl From<&AddressingStep> for WireStep {
  fn from(step: &AddressingStep) -> Self {
    let mut wire = WireStep {
      kind: step.kind.wire_name().to_string(),
      index: None,
      name: None,
      id: None,
      all: false,
    };
    match &step.selector {
      Selector::Index(i) => wire.index = Some(*i),
      Selector::Name(name) => wire.name = Some(name.clone()),
      Selector::Id(id) => wire.id = Some(id.as_str().to_string()),
      Selector::All => wire.all = true,
    }
    wire
  }
}

impl WireStep {
  fn into_step(self) -> Result<AddressingStep, RemoteError> {
    let kind = ObjectKind::from_wire_name(&self.kind)
      .ok_or_else(|| coercion_failed(format!("unknown object kind '{}'", self.kind)))?;
    let selector = match (self.index, self.name, self.id, self.all) {
      (Some(i), None, None, false) => Selector::Index(i),
      (None, Some(name), None, false) => Selector::Name(name),
      (None, None, Some(id), false) => Selector::Id(ObjectId::new(id)),
      (None, None, None, true) => Selector::All,
      _ => return Err(coercion_failed(format!("ambiguous selector for '{}'", self.kind))),
    };
    Ok(AddressingStep::new(kind, selector))
  }
}

pub fn encode_path(path: &ObjectPath) -> Vec<WireStep> {
  path.steps().iter().map(WireStep::from).collect()
}

pub fn decode_path(steps: Vec<WireStep>) -> Result<ObjectPath, RemoteError> {
  let steps = steps
    .into_iter()
    .map(WireStep::into_step)
    .collect::<Result<Vec<_>, _>>()?;
  Ok(ObjectPath::from_steps(steps))
}

/// Non-primitive values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Tagged {
  Point { x: f64, y: f64 },
  Rect { x: f64, y: f64, width: f64, height: f64 },
  Url { value: String },
  Enum { code: String },
  Reference { path: Vec<WireStep> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum WireValue {
  Bool(bool),
  Number(f64),
  Text(String),
  Tagged(Tagged),
}

/// Encode a value for the wire. Non-finite numbers have no JSON form and are
/// refused rather than sent as `null`.
pub fn encode_value(value: &Value) -> Result<serde_json::Value, RemoteError> {
  let wire = match value {
    Value::Text(s) => WireValue::Text(s.clone()),
    Value::Bool(b) => WireValue::Bool(*b),
    Value::Number(n) => WireValue::Number(finite(*n)?),
    Value::Point(p) => WireValue::Tagged(Tagged::Point {
      x: finite(p.x)?,
      y: finite(p.y)?,
    }),
    Value::Rect(r) => WireValue::Tagged(Tagged::Rect {
      x: finite(r.x)?,
      y: finite(r.y)?,
      width: finite(r.width)?,
      height: finite(r.height)?,
    }),
    Value::Url(s) => WireValue::Tagged(Tagged::Url { value: s.clone() }),
    Value::Enum(e) => WireValue::Tagged(Tagged::Enum {
      code: enum_code(*e).to_string(),
    }),
    Value::Reference(path) => WireValue::Tagged(Tagged::Reference {
      path: encode_path(path),
    }),
  };
  serde_json::to_value(wire).map_err(|e| coercion_failed(format!("cannot encode value: {}", e)))
}

fn finite(n: f64) -> Result<f64, RemoteError> {
  if n.is_finite() {
    Ok(n)
  } else {
    Err(coercion_failed(format!("{} cannot be sent to the bridge", n)))
  }
}

pub fn decode_value(json: serde_json::Value) -> Result<Value, RemoteError> {
  let wire: WireValue =
    serde_json::from_value(json).map_err(|e| coercion_failed(format!("bad value: {}", e)))?;
  Ok(match wire {
    WireValue::Bool(b) => Value::Bool(b),
    WireValue::Number(n) => Value::Number(n),
    WireValue::Text(s) => Value::Text(s),
    WireValue::Tagged(Tagged::Point { x, y }) => Value::Point(Point { x, y }),
    WireValue::Tagged(Tagged::Rect {
      x,
      y,
      width,
      height,
    }) => Value::Rect(Rect {
      x,
      y,
      width,
      height,
    }),
    WireValue::Tagged(Tagged::Url { value }) => Value::Url(value),
    WireValue::Tagged(Tagged::Enum { code }) => Value::Enum(
      enum_from_code(&code).ok_or_else(|| coercion_failed(format!("unknown enum code '{}'", code)))?,
    ),
    WireValue::Tagged(Tagged::Reference { path }) => Value::Reference(decode_path(path)?),
  })
}

fn coercion_failed(message: String) -> RemoteError {
  RemoteError::new(codes::COERCION_FAILED, message)
}

/// Command sent to the bridge.
#[derive(Debug, Clone, Serialize)]
pub struct BridgeCommand {
  pub request_id: i64,
  /// Application the bridge should address.
  pub target: String,
  pub path: Vec<WireStep>,
  pub op: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub value: Option<serde_json::Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub args: Option<serde_json::Map<String, serde_json::Value>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kind: Option<&'static str>,
}

impl BridgeCommand {
  /// Encode a request with an auto-generated request ID.
  pub fn new(target: &str, request: &Request) -> Result<Self, RemoteError> {
    let mut cmd = Self {
      request_id: next_request_id(),
      target: target.to_string(),
      path: encode_path(&request.path),
      op: "",
      name: None,
      value: None,
      args: None,
      kind: None,
    };
    match &request.operation {
      Operation::GetProperty { name } => {
        cmd.op = "get";
        cmd.name = Some(*name);
      }
      Operation::SetProperty { name, value } => {
        cmd.op = "set";
        cmd.name = Some(*name);
        cmd.value = Some(encode_value(value)?);
      }
      Operation::Command { name, args } => {
        cmd.op = "command";
        cmd.name = Some(*name);
        cmd.args = Some(
          args
            .iter()
            .map(|(param, value)| Ok((param.to_string(), encode_value(value)?)))
            .collect::<Result<_, RemoteError>>()?,
        );
      }
      Operation::Elements { kind } => {
        cmd.op = "elements";
        cmd.kind = Some(kind.wire_name());
      }
    }
    Ok(cmd)
  }
}

/// Failure detail in a bridge response.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeFailure {
  pub code: i32,
  #[serde(default)]
  pub message: String,
}

/// Response from the bridge for a command.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeResponse {
  /// Matching request ID.
  pub request_id: i64,
  #[serde(default)]
  pub data: Option<serde_json::Value>,
  #[serde(default)]
  pub error: Option<BridgeFailure>,
}

impl BridgeResponse {
  /// Parse a JSON line from the bridge.
  pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(line)
  }

  pub fn is_success(&self) -> bool {
    self.error.is_none()
  }

  /// Decode the payload for the operation it answers.
  pub fn into_reply(self, operation: &Operation) -> Result<Reply, RemoteError> {
    if let Some(failure) = self.error {
      return Err(RemoteError::new(failure.code, failure.message));
    }
    let data = match self.data {
      None | Some(serde_json::Value::Null) => return Ok(Reply::Nothing),
      Some(data) => data,
    };

    match operation {
      Operation::Elements { .. } => {
        let paths: Vec<Vec<WireStep>> = serde_json::from_value(data)
          .map_err(|e| coercion_failed(format!("bad element list: {}", e)))?;
        let paths = paths
          .into_iter()
          .map(decode_path)
          .collect::<Result<Vec<_>, _>>()?;
        Ok(Reply::Elements(paths))
      }
      _ => decode_value(data).map(Reply::Value),
    }
  }
}
