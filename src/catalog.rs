//! QuickTime Player scripting dictionary.
//!
//! Static tables describing which object kinds exist and which properties,
//! commands and elements each one exposes. Lookups report presence only; the
//! proxy layer turns an absent entry into an error.

use std::fmt;

use crate::value::{EnumKind, EnumValue, PrintErrorHandling, SaveOption, Value, ValueType};

/// Every class of scriptable object the application exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
  Application,
  Document,
  Window,
  VideoRecordingDevice,
  AudioRecordingDevice,
  AudioCompressionPreset,
  MovieCompressionPreset,
  ScreenCompressionPreset,
}

impl ObjectKind {
  pub const ALL: [ObjectKind; 8] = [
    ObjectKind::Application,
    ObjectKind::Document,
    ObjectKind::Window,
    ObjectKind::VideoRecordingDevice,
    ObjectKind::AudioRecordingDevice,
    ObjectKind::AudioCompressionPreset,
    ObjectKind::MovieCompressionPreset,
    ObjectKind::ScreenCompressionPreset,
  ];

  /// Class name as used on the wire.
  pub fn wire_name(self) -> &'static str {
    match self {
      ObjectKind::Application => "application",
      ObjectKind::Document => "document",
      ObjectKind::Window => "window",
      ObjectKind::VideoRecordingDevice => "videoRecordingDevice",
      ObjectKind::AudioRecordingDevice => "audioRecordingDevice",
      ObjectKind::AudioCompressionPreset => "audioCompressionPreset",
      ObjectKind::MovieCompressionPreset => "movieCompressionPreset",
      ObjectKind::ScreenCompressionPreset => "screenCompressionPreset",
    }
  }

  pub fn from_wire_name(name: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|kind| kind.wire_name() == name)
  }
}

impl fmt::Display for ObjectKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      ObjectKind::Application => "application",
      ObjectKind::Document => "document",
      ObjectKind::Window => "window",
      ObjectKind::VideoRecordingDevice => "video recording device",
      ObjectKind::AudioRecordingDevice => "audio recording device",
      ObjectKind::AudioCompressionPreset => "audio compression preset",
      ObjectKind::MovieCompressionPreset => "movie compression preset",
      ObjectKind::ScreenCompressionPreset => "screen compression preset",
    })
  }
}

/// Default value of an optional parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
  Bool(bool),
  Number(f64),
  Enum(EnumValue),
}

impl Literal {
  pub fn to_value(self) -> Value {
    match self {
      Literal::Bool(b) => Value::Bool(b),
      Literal::Number(n) => Value::Number(n),
      Literal::Enum(e) => Value::Enum(e),
    }
  }
}

/// Whether a parameter must be passed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Presence {
  Required,
  /// May be left out; nothing is sent for it.
  Optional,
  /// May be left out; the default is sent in its place.
  Defaulted(Literal),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertySpec {
  pub name: &'static str,
  pub ty: ValueType,
  pub settable: bool,
  pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
  pub name: &'static str,
  pub ty: ValueType,
  pub presence: Presence,
}

impl ParamSpec {
  pub fn is_required(&self) -> bool {
    matches!(self.presence, Presence::Required)
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandSpec {
  pub name: &'static str,
  /// Positional order; required parameters come first.
  pub params: &'static [ParamSpec],
  pub returns: Option<ValueType>,
  pub description: &'static str,
}

impl CommandSpec {
  pub fn required_params(&self) -> usize {
    self.params.iter().filter(|p| p.is_required()).count()
  }
}

/// Everything the dictionary declares for one object kind.
#[derive(Debug)]
pub struct Schema {
  pub kind: ObjectKind,
  pub properties: &'static [PropertySpec],
  pub commands: &'static [CommandSpec],
  /// Kinds this object contains as elements.
  pub elements: &'static [ObjectKind],
}

impl Schema {
  pub fn property(&self, name: &str) -> Option<&'static PropertySpec> {
    self.properties.iter().find(|p| p.name == name)
  }

  pub fn command(&self, name: &str) -> Option<&'static CommandSpec> {
    self.commands.iter().find(|c| c.name == name)
  }

  pub fn contains(&self, kind: ObjectKind) -> bool {
    self.elements.contains(&kind)
  }
}

/// Schema for one object kind.
pub fn schema_for(kind: ObjectKind) -> &'static Schema {
  match kind {
    ObjectKind::Application => &APPLICATION,
    ObjectKind::Document => &DOCUMENT,
    ObjectKind::Window => &WINDOW,
    ObjectKind::VideoRecordingDevice => &VIDEO_RECORDING_DEVICE,
    ObjectKind::AudioRecordingDevice => &AUDIO_RECORDING_DEVICE,
    ObjectKind::AudioCompressionPreset => &AUDIO_COMPRESSION_PRESET,
    ObjectKind::MovieCompressionPreset => &MOVIE_COMPRESSION_PRESET,
    ObjectKind::ScreenCompressionPreset => &SCREEN_COMPRESSION_PRESET,
  }
}

const fn prop(name: &'static str, ty: ValueType, settable: bool, description: &'static str) -> PropertySpec {
  PropertySpec {
    name,
    ty,
    settable,
    description,
  }
}

const fn param(name: &'static str, ty: ValueType, presence: Presence) -> ParamSpec {
  ParamSpec { name, ty, presence }
}

const fn command(
  name: &'static str,
  params: &'static [ParamSpec],
  returns: Option<ValueType>,
  description: &'static str,
) -> CommandSpec {
  CommandSpec {
    name,
    params,
    returns,
    description,
  }
}

const SAVE_OPTIONS: ValueType = ValueType::Enum(EnumKind::SaveOption);
const PRINT_ERRORS: ValueType = ValueType::Enum(EnumKind::PrintErrorHandling);
const ASK: Presence = Presence::Defaulted(Literal::Enum(EnumValue::Save(SaveOption::Ask)));
const NO_DIALOG: Presence = Presence::Defaulted(Literal::Bool(false));
const STANDARD_ERRORS: Presence =
  Presence::Defaulted(Literal::Enum(EnumValue::PrintErrors(PrintErrorHandling::Standard)));
const ONE_STEP: Presence = Presence::Defaulted(Literal::Number(1.0));

const CLOSE: CommandSpec = command(
  "close",
  &[
    param("saving", SAVE_OPTIONS, ASK),
    param("savingIn", ValueType::Url, Presence::Optional),
  ],
  None,
  "Close a document.",
);
const SAVE: CommandSpec = command(
  "save",
  &[
    param("in", ValueType::Url, Presence::Optional),
    param("as", ValueType::Text, Presence::Optional),
  ],
  None,
  "Save a document.",
);
const PRINT: CommandSpec = command(
  "print",
  &[
    param("printDialog", ValueType::Boolean, NO_DIALOG),
    param("errorHandling", PRINT_ERRORS, STANDARD_ERRORS),
    param("copies", ValueType::Integer, Presence::Optional),
  ],
  None,
  "Print a document.",
);
const DELETE: CommandSpec = command("delete", &[], None, "Delete an object.");
const DUPLICATE: CommandSpec = command(
  "duplicate",
  &[param("to", ValueType::AnyReference, Presence::Optional)],
  Some(ValueType::AnyReference),
  "Copy an object.",
);
const MOVE: CommandSpec = command(
  "move",
  &[param("to", ValueType::AnyReference, Presence::Required)],
  None,
  "Move an object to a new location.",
);

const NAME_AND_ID: &[PropertySpec] = &[
  prop("name", ValueType::Text, false, "The name of the object."),
  prop("id", ValueType::Identifier, false, "The unique identifier of the object."),
];

const GENERIC_COMMANDS: &[CommandSpec] = &[CLOSE, SAVE, PRINT, DELETE, DUPLICATE, MOVE];

static APPLICATION: Schema = Schema {
  kind: ObjectKind::Application,
  properties: &[
    prop("name", ValueType::Text, false, "The name of the application."),
    prop("frontmost", ValueType::Boolean, false, "Is this the active application?"),
    prop("version", ValueType::Text, false, "The version number of the application."),
  ],
  commands: &[
    command(
      "open",
      &[param("file", ValueType::Url, Presence::Required)],
      Some(ValueType::Reference(ObjectKind::Document)),
      "Open a document.",
    ),
    command(
      "print",
      &[
        param("file", ValueType::Url, Presence::Required),
        param("printDialog", ValueType::Boolean, NO_DIALOG),
        param("errorHandling", PRINT_ERRORS, STANDARD_ERRORS),
        param("copies", ValueType::Integer, Presence::Optional),
      ],
      None,
      "Print a document.",
    ),
    command("quit", &[param("saving", SAVE_OPTIONS, ASK)], None, "Quit the application."),
    command(
      "exists",
      &[param("object", ValueType::AnyReference, Presence::Required)],
      Some(ValueType::Boolean),
      "Verify that an object exists.",
    ),
    command(
      "openURL",
      &[param("url", ValueType::Text, Presence::Required)],
      None,
      "Open a URL.",
    ),
    command(
      "newMovieRecording",
      &[],
      Some(ValueType::Reference(ObjectKind::Document)),
      "Create a new movie recording document.",
    ),
    command(
      "newAudioRecording",
      &[],
      Some(ValueType::Reference(ObjectKind::Document)),
      "Create a new audio recording document.",
    ),
    command(
      "newScreenRecording",
      &[],
      Some(ValueType::Reference(ObjectKind::Document)),
      "Create a new screen recording document.",
    ),
    command("activate", &[], None, "Bring the application to the front."),
  ],
  elements: &[
    ObjectKind::Document,
    ObjectKind::Window,
    ObjectKind::VideoRecordingDevice,
    ObjectKind::AudioRecordingDevice,
    ObjectKind::AudioCompressionPreset,
    ObjectKind::MovieCompressionPreset,
    ObjectKind::ScreenCompressionPreset,
  ],
};

static DOCUMENT: Schema = Schema {
  kind: ObjectKind::Document,
  properties: &[
    prop("name", ValueType::Text, false, "Its name."),
    prop("modified", ValueType::Boolean, false, "Has it been modified since the last save?"),
    prop("file", ValueType::Url, false, "Its location on disk, if it has one."),
    prop(
      "audioVolume",
      ValueType::Real,
      true,
      "The volume of the movie from 0 to 1, where 1 is 100%.",
    ),
    prop("currentTime", ValueType::Real, true, "The current time of the movie in seconds."),
    prop("dataRate", ValueType::Integer, false, "The data rate of the movie in bytes per second."),
    prop("dataSize", ValueType::Integer, false, "The data size of the movie in bytes."),
    prop("duration", ValueType::Real, false, "The duration of the movie in seconds."),
    prop("looping", ValueType::Boolean, true, "Is the movie playing in a loop?"),
    prop("muted", ValueType::Boolean, true, "Is the movie muted?"),
    prop("naturalDimensions", ValueType::Point, false, "The natural dimensions of the movie."),
    prop("playing", ValueType::Boolean, false, "Is the movie playing?"),
    prop("rate", ValueType::Real, true, "The current rate of the movie."),
    prop("presenting", ValueType::Boolean, true, "Is the movie presented in full screen?"),
    prop(
      "currentMicrophone",
      ValueType::Reference(ObjectKind::AudioRecordingDevice),
      true,
      "The currently previewing audio device.",
    ),
    prop(
      "currentCamera",
      ValueType::Reference(ObjectKind::VideoRecordingDevice),
      true,
      "The currently previewing video device.",
    ),
    prop(
      "currentAudioCompression",
      ValueType::Reference(ObjectKind::AudioCompressionPreset),
      true,
      "The current audio compression preset.",
    ),
    prop(
      "currentMovieCompression",
      ValueType::Reference(ObjectKind::MovieCompressionPreset),
      true,
      "The current movie compression preset.",
    ),
    prop(
      "currentScreenCompression",
      ValueType::Reference(ObjectKind::ScreenCompressionPreset),
      true,
      "The current screen compression preset.",
    ),
  ],
  commands: &[
    CLOSE,
    SAVE,
    PRINT,
    DELETE,
    DUPLICATE,
    MOVE,
    command("play", &[], None, "Play the movie."),
    command("start", &[], None, "Start the movie recording."),
    command("pause", &[], None, "Pause the recording."),
    command("resume", &[], None, "Resume the recording."),
    command("stop", &[], None, "Stop the movie or recording."),
    command(
      "stepBackward",
      &[param("by", ValueType::Integer, ONE_STEP)],
      None,
      "Step the movie backward the specified number of steps.",
    ),
    command(
      "stepForward",
      &[param("by", ValueType::Integer, ONE_STEP)],
      None,
      "Step the movie forward the specified number of steps.",
    ),
    command(
      "trimFrom",
      &[
        param("from", ValueType::Real, Presence::Required),
        param("to", ValueType::Real, Presence::Required),
      ],
      None,
      "Trim the movie.",
    ),
    command("present", &[], None, "Present the document full screen."),
    command(
      "export",
      &[
        param("in", ValueType::Url, Presence::Required),
        param("usingSettingsPreset", ValueType::Text, Presence::Required),
      ],
      None,
      "Export a movie to another file.",
    ),
  ],
  elements: &[],
};

static WINDOW: Schema = Schema {
  kind: ObjectKind::Window,
  properties: &[
    prop("name", ValueType::Text, false, "The title of the window."),
    prop("id", ValueType::Identifier, false, "The unique identifier of the window."),
    prop("index", ValueType::Integer, true, "The index of the window, ordered front to back."),
    prop("bounds", ValueType::Rect, true, "The bounding rectangle of the window."),
    prop("closeable", ValueType::Boolean, false, "Does the window have a close button?"),
    prop("miniaturizable", ValueType::Boolean, false, "Does the window have a minimize button?"),
    prop("miniaturized", ValueType::Boolean, true, "Is the window minimized right now?"),
    prop("resizable", ValueType::Boolean, false, "Can the window be resized?"),
    prop("visible", ValueType::Boolean, true, "Is the window visible right now?"),
    prop("zoomable", ValueType::Boolean, false, "Does the window have a zoom button?"),
    prop("zoomed", ValueType::Boolean, true, "Is the window zoomed right now?"),
    prop(
      "document",
      ValueType::Reference(ObjectKind::Document),
      false,
      "The document whose contents are displayed in the window.",
    ),
  ],
  commands: GENERIC_COMMANDS,
  elements: &[],
};

static VIDEO_RECORDING_DEVICE: Schema = Schema {
  kind: ObjectKind::VideoRecordingDevice,
  properties: NAME_AND_ID,
  commands: GENERIC_COMMANDS,
  elements: &[],
};

static AUDIO_RECORDING_DEVICE: Schema = Schema {
  kind: ObjectKind::AudioRecordingDevice,
  properties: NAME_AND_ID,
  commands: GENERIC_COMMANDS,
  elements: &[],
};

static AUDIO_COMPRESSION_PRESET: Schema = Schema {
  kind: ObjectKind::AudioCompressionPreset,
  properties: NAME_AND_ID,
  commands: GENERIC_COMMANDS,
  elements: &[],
};

static MOVIE_COMPRESSION_PRESET: Schema = Schema {
  kind: ObjectKind::MovieCompressionPreset,
  properties: NAME_AND_ID,
  commands: GENERIC_COMMANDS,
  elements: &[],
};

static SCREEN_COMPRESSION_PRESET: Schema = Schema {
  kind: ObjectKind::ScreenCompressionPreset,
  properties: NAME_AND_ID,
  commands: GENERIC_COMMANDS,
  elements: &[],
};

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_every_kind_has_a_schema_for_itself() {
    for kind in ObjectKind::ALL {
      assert_eq!(schema_for(kind).kind, kind);
      assert!(schema_for(kind).property("name").is_some(), "{} has no name", kind);
    }
  }

  #[test]
  fn test_required_params_come_first() {
    for kind in ObjectKind::ALL {
      for cmd in schema_for(kind).commands {
        let required = cmd.required_params();
        assert!(
          cmd.params[..required].iter().all(|p| p.is_required()),
          "{}.{} has a required parameter after an optional one",
          kind,
          cmd.name
        );
      }
    }
  }

  #[test]
  fn test_names_are_unique_per_kind() {
    for kind in ObjectKind::ALL {
      let schema = schema_for(kind);
      for (i, p) in schema.properties.iter().enumerate() {
        assert!(schema.properties[i + 1..].iter().all(|q| q.name != p.name));
      }
      for (i, c) in schema.commands.iter().enumerate() {
        assert!(schema.commands[i + 1..].iter().all(|d| d.name != c.name));
      }
    }
  }

  #[test]
  fn test_step_commands_default_to_one() {
    let doc = schema_for(ObjectKind::Document);
    for name in ["stepForward", "stepBackward"] {
      let cmd = doc.command(name).unwrap();
      assert_eq!(cmd.params.len(), 1);
      assert_eq!(cmd.params[0].presence, Presence::Defaulted(Literal::Number(1.0)));
    }
  }

  #[test]
  fn test_document_read_only_properties() {
    let doc = schema_for(ObjectKind::Document);
    for name in ["playing", "duration", "dataRate", "naturalDimensions", "file"] {
      assert!(!doc.property(name).unwrap().settable, "{} should be read-only", name);
    }
    for name in ["currentTime", "audioVolume", "muted", "currentCamera"] {
      assert!(doc.property(name).unwrap().settable, "{} should be settable", name);
    }
  }

  #[test]
  fn test_application_contains_everything_else() {
    let app = schema_for(ObjectKind::Application);
    for kind in ObjectKind::ALL.into_iter().skip(1) {
      assert!(app.contains(kind));
    }
    assert!(!schema_for(ObjectKind::Document).contains(ObjectKind::Window));
  }

  #[test]
  fn test_unknown_entries_are_absent() {
    let doc = schema_for(ObjectKind::Document);
    assert!(doc.property("tempo").is_none());
    assert!(doc.command("rewind").is_none());
    assert!(schema_for(ObjectKind::Application).command("play").is_none());
  }

  #[test]
  fn test_wire_names_round_trip() {
    for kind in ObjectKind::ALL {
      assert_eq!(ObjectKind::from_wire_name(kind.wire_name()), Some(kind));
    }
    assert_eq!(ObjectKind::from_wire_name("track"), None);
  }
}
