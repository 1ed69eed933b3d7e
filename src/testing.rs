//! In-memory stand-in for QuickTime Player, used by unit tests.
//!
//! Understands single-step paths below the application and a useful subset
//! of the dictionary. Every request is logged before it is handled.

use parking_lot::Mutex;

use crate::path::{AddressingStep, ObjectId, ObjectPath, Selector};
use crate::transport::{codes, Operation, RemoteError, Reply, Request, Transport};
use crate::value::{Point, Rect, Value};
use crate::ObjectKind;

const FRAME: f64 = 1.0 / 30.0;

struct FakeDocument {
  id: String,
  name: String,
  file: Option<String>,
  modified: bool,
  audio_volume: f64,
  current_time: f64,
  duration: f64,
  looping: bool,
  muted: bool,
  playing: bool,
  recording: bool,
  rate: f64,
  presenting: bool,
  current: Vec<(&'static str, ObjectPath)>,
}

struct FakeWindow {
  id: i64,
  bounds: Rect,
  miniaturized: bool,
  visible: bool,
  zoomed: bool,
  document_id: String,
}

/// A device or preset: only a name and an id.
struct FakeNamed {
  kind: ObjectKind,
  id: String,
  name: String,
}

struct FakeState {
  next_id: i64,
  frontmost: bool,
  documents: Vec<FakeDocument>,
  windows: Vec<FakeWindow>,
  named: Vec<FakeNamed>,
}

enum Target {
  App,
  Document(usize),
  Window(usize),
  Named(usize),
}

pub(crate) struct FakePlayer {
  state: Mutex<FakeState>,
  log: Mutex<Vec<Request>>,
}

fn named_path(kind: ObjectKind, id: &str) -> ObjectPath {
  ObjectPath::application().resolve(AddressingStep::id(kind, id))
}

fn failed(message: &str) -> RemoteError {
  RemoteError::new(codes::EVENT_FAILED, message)
}

fn unhandled(what: &str) -> RemoteError {
  RemoteError::new(codes::EVENT_NOT_HANDLED, format!("{} is not handled", what))
}

fn arg<'a>(args: &'a [(&'static str, Value)], name: &str) -> Option<&'a Value> {
  args.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
}

impl FakePlayer {
  /// One camera, one microphone and one preset of each kind; no documents.
  pub fn new() -> Self {
    let named = vec![
      FakeNamed {
        kind: ObjectKind::VideoRecordingDevice,
        id: "cam-0".into(),
        name: "FaceTime HD Camera".into(),
      },
      FakeNamed {
        kind: ObjectKind::AudioRecordingDevice,
        id: "mic-0".into(),
        name: "Built-in Microphone".into(),
      },
      FakeNamed {
        kind: ObjectKind::AudioCompressionPreset,
        id: "audio-high".into(),
        name: "High Quality".into(),
      },
      FakeNamed {
        kind: ObjectKind::MovieCompressionPreset,
        id: "movie-1080p".into(),
        name: "1080p".into(),
      },
      FakeNamed {
        kind: ObjectKind::ScreenCompressionPreset,
        id: "screen-high".into(),
        name: "High".into(),
      },
    ];
    Self {
      state: Mutex::new(FakeState {
        next_id: 1,
        frontmost: false,
        documents: Vec::new(),
        windows: Vec::new(),
        named,
      }),
      log: Mutex::new(Vec::new()),
    }
  }

  /// Open a document (and its window). Returns the document's id.
  pub fn add_document(&self, name: &str, duration: f64) -> ObjectId {
    let mut state = self.state.lock();
    state.add_document(name, duration)
  }

  pub fn requests(&self) -> Vec<Request> {
    self.log.lock().clone()
  }

  pub fn request_count(&self) -> usize {
    self.log.lock().len()
  }

  fn handle(&self, request: &Request) -> Result<Reply, RemoteError> {
    let mut state = self.state.lock();
    let target = state.locate(&request.path)?;
    match &request.operation {
      Operation::GetProperty { name } => state.get(&target, name),
      Operation::SetProperty { name, value } => {
        state.set(&target, name, value)?;
        Ok(Reply::Nothing)
      }
      Operation::Command { name, args } => state.command(&target, name, args),
      Operation::Elements { kind } => match target {
        Target::App => Ok(Reply::Elements(state.elements(*kind))),
        _ => Err(unhandled("elements")),
      },
    }
  }
}

impl Transport for FakePlayer {
  async fn send(&self, request: Request) -> Result<Reply, RemoteError> {
    self.log.lock().push(request.clone());
    self.handle(&request)
  }
}

impl FakeState {
  fn add_document(&mut self, name: &str, duration: f64) -> ObjectId {
    let id = format!("doc-{}", self.next_id);
    self.next_id += 1;
    let window_id = self.next_id;
    self.next_id += 1;

    let current = vec![
      ("currentCamera", named_path(ObjectKind::VideoRecordingDevice, "cam-0")),
      ("currentMicrophone", named_path(ObjectKind::AudioRecordingDevice, "mic-0")),
      ("currentAudioCompression", named_path(ObjectKind::AudioCompressionPreset, "audio-high")),
      ("currentMovieCompression", named_path(ObjectKind::MovieCompressionPreset, "movie-1080p")),
      ("currentScreenCompression", named_path(ObjectKind::ScreenCompressionPreset, "screen-high")),
    ];
    self.documents.push(FakeDocument {
      id: id.clone(),
      name: name.to_string(),
      file: None,
      modified: false,
      audio_volume: 1.0,
      current_time: 0.0,
      duration,
      looping: false,
      muted: false,
      playing: false,
      recording: false,
      rate: 0.0,
      presenting: false,
      current,
    });
    self.windows.push(FakeWindow {
      id: window_id,
      bounds: Rect {
        x: 0.0,
        y: 0.0,
        width: 640.0,
        height: 360.0,
      },
      miniaturized: false,
      visible: true,
      zoomed: false,
      document_id: id.clone(),
    });
    ObjectId::new(id)
  }

  fn remove_document(&mut self, index: usize) {
    let doc = self.documents.remove(index);
    self.windows.retain(|w| w.document_id != doc.id);
  }

  fn locate(&self, path: &ObjectPath) -> Result<Target, RemoteError> {
    let step = match path.steps() {
      [] => return Ok(Target::App),
      [step] => step,
      _ => return Err(RemoteError::new(codes::NO_SUCH_OBJECT, format!("can't get {}", path))),
    };

    let missing = || RemoteError::new(codes::NO_SUCH_OBJECT, format!("can't get {}", path));
    match step.kind {
      ObjectKind::Application => Err(missing()),
      ObjectKind::Document => {
        let found = match &step.selector {
          Selector::Index(i) if *i < self.documents.len() => Some(*i),
          Selector::Index(_) => return Err(RemoteError::new(codes::ILLEGAL_INDEX, "invalid index")),
          Selector::Name(name) => self.documents.iter().position(|d| &d.name == name),
          Selector::Id(id) => self.documents.iter().position(|d| d.id == id.as_str()),
          Selector::All => return Err(unhandled("every document")),
        };
        found.map(Target::Document).ok_or_else(missing)
      }
      ObjectKind::Window => {
        let found = match &step.selector {
          Selector::Index(i) if *i < self.windows.len() => Some(*i),
          Selector::Index(_) => return Err(RemoteError::new(codes::ILLEGAL_INDEX, "invalid index")),
          Selector::Name(name) => self
            .windows
            .iter()
            .position(|w| self.window_name(w).as_deref() == Some(name.as_str())),
          Selector::Id(id) => self.windows.iter().position(|w| w.id.to_string() == id.as_str()),
          Selector::All => return Err(unhandled("every window")),
        };
        found.map(Target::Window).ok_or_else(missing)
      }
      kind => {
        let mut of_kind = self.named.iter().enumerate().filter(|(_, n)| n.kind == kind);
        let found = match &step.selector {
          Selector::Index(i) => of_kind.nth(*i),
          Selector::Name(name) => of_kind.find(|(_, n)| &n.name == name),
          Selector::Id(id) => of_kind.find(|(_, n)| n.id == id.as_str()),
          Selector::All => return Err(unhandled("every element")),
        };
        found.map(|(i, _)| Target::Named(i)).ok_or_else(missing)
      }
    }
  }

  fn window_name(&self, window: &FakeWindow) -> Option<String> {
    self
      .documents
      .iter()
      .find(|d| d.id == window.document_id)
      .map(|d| d.name.clone())
  }

  fn elements(&self, kind: ObjectKind) -> Vec<ObjectPath> {
    match kind {
      ObjectKind::Document => self
        .documents
        .iter()
        .map(|d| named_path(kind, &d.id))
        .collect(),
      ObjectKind::Window => self
        .windows
        .iter()
        .map(|w| named_path(kind, &w.id.to_string()))
        .collect(),
      _ => self
        .named
        .iter()
        .filter(|n| n.kind == kind)
        .map(|n| named_path(kind, &n.id))
        .collect(),
    }
  }

  fn get(&self, target: &Target, name: &str) -> Result<Reply, RemoteError> {
    let value = match target {
      Target::App => match name {
        "name" => Value::from("QuickTime Player"),
        "frontmost" => Value::Bool(self.frontmost),
        "version" => Value::from("10.5"),
        _ => return Err(unhandled(name)),
      },
      Target::Document(i) => {
        let doc = &self.documents[*i];
        match name {
          "name" => Value::from(doc.name.as_str()),
          "modified" => Value::Bool(doc.modified),
          "file" => match &doc.file {
            // file URLs come back as plain text
            Some(file) => Value::Text(file.clone()),
            None => return Ok(Reply::Nothing),
          },
          "audioVolume" => Value::Number(doc.audio_volume),
          "currentTime" => Value::Number(doc.current_time),
          "dataRate" => Value::Number(if doc.duration > 0.0 { 625_000.0 } else { 0.0 }),
          "dataSize" => Value::Number((doc.duration * 625_000.0).round()),
          "duration" => Value::Number(doc.duration),
          "looping" => Value::Bool(doc.looping),
          "muted" => Value::Bool(doc.muted),
          "naturalDimensions" => Value::Point(Point {
            x: 1920.0,
            y: 1080.0,
          }),
          "playing" => Value::Bool(doc.playing),
          "rate" => Value::Number(doc.rate),
          "presenting" => Value::Bool(doc.presenting),
          _ => match doc.current.iter().find(|(n, _)| *n == name) {
            Some((_, path)) => Value::Reference(path.clone()),
            None => return Err(unhandled(name)),
          },
        }
      }
      Target::Window(i) => {
        let window = &self.windows[*i];
        match name {
          "name" => Value::Text(self.window_name(window).unwrap_or_default()),
          // windows report numeric ids
          "id" => Value::Number(window.id as f64),
          "index" => Value::Number(*i as f64),
          "bounds" => Value::Rect(window.bounds),
          "closeable" | "miniaturizable" | "resizable" | "zoomable" => Value::Bool(true),
          "miniaturized" => Value::Bool(window.miniaturized),
          "visible" => Value::Bool(window.visible),
          "zoomed" => Value::Bool(window.zoomed),
          "document" => Value::Reference(named_path(ObjectKind::Document, &window.document_id)),
          _ => return Err(unhandled(name)),
        }
      }
      Target::Named(i) => {
        let named = &self.named[*i];
        match name {
          "name" => Value::Text(named.name.clone()),
          "id" => Value::Text(named.id.clone()),
          _ => return Err(unhandled(name)),
        }
      }
    };
    Ok(Reply::Value(value))
  }

  fn set(&mut self, target: &Target, name: &str, value: &Value) -> Result<(), RemoteError> {
    if let Value::Reference(path) = value {
      self.locate(path)?;
    }
    match target {
      Target::Document(i) => {
        let doc = &mut self.documents[*i];
        match (name, value) {
          ("audioVolume", Value::Number(n)) => doc.audio_volume = n.clamp(0.0, 1.0),
          ("currentTime", Value::Number(n)) => doc.current_time = n.clamp(0.0, doc.duration),
          ("looping", Value::Bool(b)) => doc.looping = *b,
          ("muted", Value::Bool(b)) => doc.muted = *b,
          ("rate", Value::Number(n)) => {
            doc.rate = *n;
            doc.playing = *n != 0.0;
          }
          ("presenting", Value::Bool(b)) => doc.presenting = *b,
          (_, Value::Reference(path)) => match doc.current.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = path.clone(),
            None => return Err(unhandled(name)),
          },
          _ => return Err(unhandled(name)),
        }
      }
      Target::Window(i) => {
        let window = &mut self.windows[*i];
        match (name, value) {
          ("index", Value::Number(_)) => {}
          ("bounds", Value::Rect(r)) => window.bounds = *r,
          ("miniaturized", Value::Bool(b)) => window.miniaturized = *b,
          ("visible", Value::Bool(b)) => window.visible = *b,
          ("zoomed", Value::Bool(b)) => window.zoomed = *b,
          _ => return Err(unhandled(name)),
        }
      }
      _ => return Err(unhandled(name)),
    }
    Ok(())
  }

  fn command(
    &mut self,
    target: &Target,
    name: &str,
    args: &[(&'static str, Value)],
  ) -> Result<Reply, RemoteError> {
    match target {
      Target::App => self.app_command(name, args),
      Target::Document(i) => self.document_command(*i, name, args),
      Target::Window(i) => match name {
        "close" => {
          self.windows.remove(*i);
          Ok(Reply::Nothing)
        }
        _ => Err(unhandled(name)),
      },
      Target::Named(_) => Err(unhandled(name)),
    }
  }

  fn app_command(&mut self, name: &str, args: &[(&'static str, Value)]) -> Result<Reply, RemoteError> {
    let created = match name {
      "open" => {
        let file = arg(args, "file").and_then(Value::as_str).unwrap_or_default().to_string();
        let title = file.rsplit('/').next().unwrap_or_default().to_string();
        let id = self.add_document(&title, 10.0);
        if let Some(doc) = self.documents.last_mut() {
          doc.file = Some(file);
        }
        id
      }
      "openURL" => {
        let url = arg(args, "url").and_then(Value::as_str).unwrap_or_default().to_string();
        self.add_document(&url, 10.0);
        return Ok(Reply::Nothing);
      }
      "newMovieRecording" => self.add_document("Movie Recording", 0.0),
      "newAudioRecording" => self.add_document("Audio Recording", 0.0),
      "newScreenRecording" => self.add_document("Screen Recording", 0.0),
      "exists" => {
        let exists = match arg(args, "object") {
          Some(Value::Reference(path)) => self.locate(path).is_ok(),
          _ => false,
        };
        return Ok(Reply::Value(Value::Bool(exists)));
      }
      "quit" => {
        self.documents.clear();
        self.windows.clear();
        return Ok(Reply::Nothing);
      }
      "activate" => {
        self.frontmost = true;
        return Ok(Reply::Nothing);
      }
      "print" => return Ok(Reply::Nothing),
      _ => return Err(unhandled(name)),
    };
    Ok(Reply::Value(Value::Reference(named_path(
      ObjectKind::Document,
      created.as_str(),
    ))))
  }

  fn document_command(
    &mut self,
    index: usize,
    name: &str,
    args: &[(&'static str, Value)],
  ) -> Result<Reply, RemoteError> {
    if matches!(name, "close" | "delete") {
      self.remove_document(index);
      return Ok(Reply::Nothing);
    }

    let doc = &mut self.documents[index];
    let steps = arg(args, "by").and_then(Value::as_f64).unwrap_or(1.0);
    match name {
      "play" | "resume" => {
        doc.playing = true;
        doc.rate = 1.0;
      }
      "pause" => {
        doc.playing = false;
        doc.rate = 0.0;
      }
      "start" => doc.recording = true,
      "stop" => {
        doc.playing = false;
        doc.recording = false;
        doc.rate = 0.0;
        doc.current_time = 0.0;
      }
      "stepForward" => {
        doc.playing = false;
        doc.current_time = (doc.current_time + steps * FRAME).min(doc.duration);
      }
      "stepBackward" => {
        doc.playing = false;
        doc.current_time = (doc.current_time - steps * FRAME).max(0.0);
      }
      "trimFrom" => {
        let from = arg(args, "from").and_then(Value::as_f64).unwrap_or_default();
        let to = arg(args, "to").and_then(Value::as_f64).unwrap_or_default();
        if from < 0.0 || to <= from || to > doc.duration {
          return Err(failed("trim range is outside the movie"));
        }
        doc.duration = to - from;
        doc.current_time = 0.0;
        doc.modified = true;
      }
      "present" => doc.presenting = true,
      "save" => {
        if let Some(file) = arg(args, "in").and_then(Value::as_str) {
          doc.file = Some(file.to_string());
        }
        if doc.file.is_none() {
          return Err(failed("document has never been saved"));
        }
        doc.modified = false;
      }
      "export" | "print" => {}
      _ => return Err(unhandled(name)),
    }
    Ok(Reply::Nothing)
  }
}
