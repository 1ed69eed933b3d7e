//! Typed QuickTime Player handles.
//!
//! Thin wrappers over [`Proxy`] with one method per dictionary entry. Every
//! method is a single round trip; nothing is cached. Use `proxy()` to reach
//! commands that have no typed wrapper (`duplicate`, `move`).

use std::sync::Arc;

use crate::error::{ProxyError, Result};
use crate::path::{AddressingStep, ObjectId, ObjectPath};
use crate::proxy::Proxy;
use crate::transport::Transport;
use crate::value::{Point, PrintErrorHandling, Rect, SaveOption, Value, ValueType};
use crate::ObjectKind;

/// Options for the `print` command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintOptions {
  /// Show the print dialog first.
  pub print_dialog: bool,
  pub error_handling: PrintErrorHandling,
  pub copies: Option<i64>,
}

impl Default for PrintOptions {
  fn default() -> Self {
    Self {
      print_dialog: false,
      error_handling: PrintErrorHandling::Standard,
      copies: None,
    }
  }
}

impl PrintOptions {
  fn into_args(self) -> Vec<Value> {
    let mut args = vec![Value::Bool(self.print_dialog), Value::from(self.error_handling)];
    if let Some(copies) = self.copies {
      args.push(Value::from(copies));
    }
    args
  }
}

fn mismatch(name: &str, expected: ValueType, found: &Value) -> ProxyError {
  ProxyError::TypeMismatch {
    what: format!("'{}'", name),
    expected,
    found: found.value_type(),
  }
}

async fn get_text<T: Transport>(proxy: &Proxy<T>, name: &str) -> Result<String> {
  match proxy.get_property(name).await? {
    Value::Text(s) | Value::Url(s) => Ok(s),
    other => Err(mismatch(name, ValueType::Text, &other)),
  }
}

async fn get_bool<T: Transport>(proxy: &Proxy<T>, name: &str) -> Result<bool> {
  let value = proxy.get_property(name).await?;
  value
    .as_bool()
    .ok_or_else(|| mismatch(name, ValueType::Boolean, &value))
}

async fn get_real<T: Transport>(proxy: &Proxy<T>, name: &str) -> Result<f64> {
  let value = proxy.get_property(name).await?;
  value
    .as_f64()
    .ok_or_else(|| mismatch(name, ValueType::Real, &value))
}

async fn get_integer<T: Transport>(proxy: &Proxy<T>, name: &str) -> Result<i64> {
  let value = proxy.get_property(name).await?;
  value
    .as_i64()
    .ok_or_else(|| mismatch(name, ValueType::Integer, &value))
}

async fn get_reference<T: Transport>(proxy: &Proxy<T>, name: &str) -> Result<Proxy<T>> {
  match proxy.get_property(name).await? {
    Value::Reference(path) => Ok(proxy.with_path(path)),
    other => Err(mismatch(name, ValueType::AnyReference, &other)),
  }
}

async fn get_id<T: Transport>(proxy: &Proxy<T>) -> Result<ObjectId> {
  get_text(proxy, "id").await.map(ObjectId::new)
}

async fn run<T: Transport>(proxy: &Proxy<T>, command: &str, args: Vec<Value>) -> Result<()> {
  proxy.invoke(command, args).await.map(|_| ())
}

async fn run_for_document<T: Transport>(
  proxy: &Proxy<T>,
  command: &str,
  args: Vec<Value>,
) -> Result<Document<T>> {
  match proxy.invoke(command, args).await? {
    Some(Value::Reference(path)) => Ok(Document {
      proxy: proxy.with_path(path),
    }),
    Some(other) => Err(mismatch(command, ValueType::Reference(ObjectKind::Document), &other)),
    None => Err(ProxyError::MissingValue {
      name: command.to_string(),
    }),
  }
}

async fn close<T: Transport>(proxy: &Proxy<T>, saving: SaveOption, saving_in: Option<&str>) -> Result<()> {
  let mut args = vec![Value::from(saving)];
  if let Some(file) = saving_in {
    args.push(Value::Url(file.to_string()));
  }
  run(proxy, "close", args).await
}

/// The application root. One per session.
pub struct Application<T> {
  proxy: Proxy<T>,
}

impl<T: Transport> Application<T> {
  pub fn new(transport: Arc<T>) -> Self {
    Self {
      proxy: Proxy::application(transport),
    }
  }

  pub fn proxy(&self) -> &Proxy<T> {
    &self.proxy
  }

  /// Document by zero-based index. No I/O.
  pub fn document(&self, index: usize) -> Document<T> {
    Document {
      proxy: self.child(AddressingStep::index(ObjectKind::Document, index)),
    }
  }

  pub fn document_named(&self, name: &str) -> Document<T> {
    Document {
      proxy: self.child(AddressingStep::named(ObjectKind::Document, name)),
    }
  }

  /// Window by zero-based index, front to back. No I/O.
  pub fn window(&self, index: usize) -> Window<T> {
    Window {
      proxy: self.child(AddressingStep::index(ObjectKind::Window, index)),
    }
  }

  pub fn window_with_id(&self, id: ObjectId) -> Window<T> {
    Window {
      proxy: self.child(AddressingStep::id(ObjectKind::Window, id)),
    }
  }

  fn child(&self, step: AddressingStep) -> Proxy<T> {
    self.proxy.with_path(ObjectPath::application().resolve(step))
  }

  async fn list(&self, kind: ObjectKind) -> Result<Vec<Proxy<T>>> {
    Ok(self.proxy.elements(kind).await?.iter().collect())
  }

  pub async fn name(&self) -> Result<String> {
    get_text(&self.proxy, "name").await
  }

  pub async fn frontmost(&self) -> Result<bool> {
    get_bool(&self.proxy, "frontmost").await
  }

  pub async fn version(&self) -> Result<String> {
    get_text(&self.proxy, "version").await
  }

  pub async fn documents(&self) -> Result<Vec<Document<T>>> {
    let proxies = self.list(ObjectKind::Document).await?;
    Ok(proxies.into_iter().map(|proxy| Document { proxy }).collect())
  }

  pub async fn windows(&self) -> Result<Vec<Window<T>>> {
    let proxies = self.list(ObjectKind::Window).await?;
    Ok(proxies.into_iter().map(|proxy| Window { proxy }).collect())
  }

  pub async fn video_recording_devices(&self) -> Result<Vec<RecordingDevice<T>>> {
    let proxies = self.list(ObjectKind::VideoRecordingDevice).await?;
    Ok(proxies.into_iter().map(|proxy| RecordingDevice { proxy }).collect())
  }

  pub async fn audio_recording_devices(&self) -> Result<Vec<RecordingDevice<T>>> {
    let proxies = self.list(ObjectKind::AudioRecordingDevice).await?;
    Ok(proxies.into_iter().map(|proxy| RecordingDevice { proxy }).collect())
  }

  pub async fn audio_compression_presets(&self) -> Result<Vec<CompressionPreset<T>>> {
    let proxies = self.list(ObjectKind::AudioCompressionPreset).await?;
    Ok(proxies.into_iter().map(|proxy| CompressionPreset { proxy }).collect())
  }

  pub async fn movie_compression_presets(&self) -> Result<Vec<CompressionPreset<T>>> {
    let proxies = self.list(ObjectKind::MovieCompressionPreset).await?;
    Ok(proxies.into_iter().map(|proxy| CompressionPreset { proxy }).collect())
  }

  pub async fn screen_compression_presets(&self) -> Result<Vec<CompressionPreset<T>>> {
    let proxies = self.list(ObjectKind::ScreenCompressionPreset).await?;
    Ok(proxies.into_iter().map(|proxy| CompressionPreset { proxy }).collect())
  }

  /// Open a movie file.
  pub async fn open(&self, file: &str) -> Result<Document<T>> {
    run_for_document(&self.proxy, "open", vec![Value::Url(file.to_string())]).await
  }

  pub async fn open_url(&self, url: &str) -> Result<()> {
    run(&self.proxy, "openURL", vec![Value::from(url)]).await
  }

  pub async fn print(&self, file: &str, options: PrintOptions) -> Result<()> {
    let mut args = vec![Value::Url(file.to_string())];
    args.extend(options.into_args());
    run(&self.proxy, "print", args).await
  }

  pub async fn quit(&self, saving: SaveOption) -> Result<()> {
    run(&self.proxy, "quit", vec![Value::from(saving)]).await
  }

  /// Whether the object behind `proxy` currently exists.
  pub async fn exists(&self, proxy: &Proxy<T>) -> Result<bool> {
    let reply = self
      .proxy
      .invoke("exists", vec![Value::Reference(proxy.path().clone())])
      .await?;
    match reply {
      Some(Value::Bool(b)) => Ok(b),
      Some(other) => Err(mismatch("exists", ValueType::Boolean, &other)),
      None => Ok(false),
    }
  }

  pub async fn activate(&self) -> Result<()> {
    run(&self.proxy, "activate", vec![]).await
  }

  pub async fn new_movie_recording(&self) -> Result<Document<T>> {
    run_for_document(&self.proxy, "newMovieRecording", vec![]).await
  }

  pub async fn new_audio_recording(&self) -> Result<Document<T>> {
    run_for_document(&self.proxy, "newAudioRecording", vec![]).await
  }

  pub async fn new_screen_recording(&self) -> Result<Document<T>> {
    run_for_document(&self.proxy, "newScreenRecording", vec![]).await
  }
}

/// An open movie or recording.
pub struct Document<T> {
  proxy: Proxy<T>,
}

impl<T: Transport> Document<T> {
  pub fn proxy(&self) -> &Proxy<T> {
    &self.proxy
  }

  pub async fn name(&self) -> Result<String> {
    get_text(&self.proxy, "name").await
  }

  pub async fn modified(&self) -> Result<bool> {
    get_bool(&self.proxy, "modified").await
  }

  /// Location on disk, `None` if the document was never saved.
  pub async fn file(&self) -> Result<Option<String>> {
    match get_text(&self.proxy, "file").await {
      Ok(file) => Ok(Some(file)),
      Err(ProxyError::MissingValue { .. }) => Ok(None),
      Err(e) => Err(e),
    }
  }

  /// Volume from 0 to 1.
  pub async fn audio_volume(&self) -> Result<f64> {
    get_real(&self.proxy, "audioVolume").await
  }

  pub async fn set_audio_volume(&self, volume: f64) -> Result<()> {
    self.proxy.set_property("audioVolume", volume).await
  }

  /// Playhead position in seconds.
  pub async fn current_time(&self) -> Result<f64> {
    get_real(&self.proxy, "currentTime").await
  }

  pub async fn set_current_time(&self, seconds: f64) -> Result<()> {
    self.proxy.set_property("currentTime", seconds).await
  }

  /// Bytes per second.
  pub async fn data_rate(&self) -> Result<i64> {
    get_integer(&self.proxy, "dataRate").await
  }

  /// Bytes.
  pub async fn data_size(&self) -> Result<i64> {
    get_integer(&self.proxy, "dataSize").await
  }

  /// Seconds.
  pub async fn duration(&self) -> Result<f64> {
    get_real(&self.proxy, "duration").await
  }

  pub async fn looping(&self) -> Result<bool> {
    get_bool(&self.proxy, "looping").await
  }

  pub async fn set_looping(&self, looping: bool) -> Result<()> {
    self.proxy.set_property("looping", looping).await
  }

  pub async fn muted(&self) -> Result<bool> {
    get_bool(&self.proxy, "muted").await
  }

  pub async fn set_muted(&self, muted: bool) -> Result<()> {
    self.proxy.set_property("muted", muted).await
  }

  pub async fn natural_dimensions(&self) -> Result<Point> {
    let value = self.proxy.get_property("naturalDimensions").await?;
    value
      .as_point()
      .ok_or_else(|| mismatch("naturalDimensions", ValueType::Point, &value))
  }

  pub async fn playing(&self) -> Result<bool> {
    get_bool(&self.proxy, "playing").await
  }

  pub async fn rate(&self) -> Result<f64> {
    get_real(&self.proxy, "rate").await
  }

  pub async fn set_rate(&self, rate: f64) -> Result<()> {
    self.proxy.set_property("rate", rate).await
  }

  pub async fn presenting(&self) -> Result<bool> {
    get_bool(&self.proxy, "presenting").await
  }

  pub async fn set_presenting(&self, presenting: bool) -> Result<()> {
    self.proxy.set_property("presenting", presenting).await
  }

  pub async fn current_microphone(&self) -> Result<RecordingDevice<T>> {
    let proxy = get_reference(&self.proxy, "currentMicrophone").await?;
    Ok(RecordingDevice { proxy })
  }

  pub async fn set_current_microphone(&self, device: &RecordingDevice<T>) -> Result<()> {
    self
      .proxy
      .set_property("currentMicrophone", device.proxy.path().clone())
      .await
  }

  pub async fn current_camera(&self) -> Result<RecordingDevice<T>> {
    let proxy = get_reference(&self.proxy, "currentCamera").await?;
    Ok(RecordingDevice { proxy })
  }

  pub async fn set_current_camera(&self, device: &RecordingDevice<T>) -> Result<()> {
    self
      .proxy
      .set_property("currentCamera", device.proxy.path().clone())
      .await
  }

  pub async fn current_audio_compression(&self) -> Result<CompressionPreset<T>> {
    let proxy = get_reference(&self.proxy, "currentAudioCompression").await?;
    Ok(CompressionPreset { proxy })
  }

  pub async fn set_current_audio_compression(&self, preset: &CompressionPreset<T>) -> Result<()> {
    self
      .proxy
      .set_property("currentAudioCompression", preset.proxy.path().clone())
      .await
  }

  pub async fn current_movie_compression(&self) -> Result<CompressionPreset<T>> {
    let proxy = get_reference(&self.proxy, "currentMovieCompression").await?;
    Ok(CompressionPreset { proxy })
  }

  pub async fn set_current_movie_compression(&self, preset: &CompressionPreset<T>) -> Result<()> {
    self
      .proxy
      .set_property("currentMovieCompression", preset.proxy.path().clone())
      .await
  }

  pub async fn current_screen_compression(&self) -> Result<CompressionPreset<T>> {
    let proxy = get_reference(&self.proxy, "currentScreenCompression").await?;
    Ok(CompressionPreset { proxy })
  }

  pub async fn set_current_screen_compression(&self, preset: &CompressionPreset<T>) -> Result<()> {
    self
      .proxy
      .set_property("currentScreenCompression", preset.proxy.path().clone())
      .await
  }

  pub async fn play(&self) -> Result<()> {
    run(&self.proxy, "play", vec![]).await
  }

  /// Start recording.
  pub async fn start(&self) -> Result<()> {
    run(&self.proxy, "start", vec![]).await
  }

  pub async fn pause(&self) -> Result<()> {
    run(&self.proxy, "pause", vec![]).await
  }

  pub async fn resume(&self) -> Result<()> {
    run(&self.proxy, "resume", vec![]).await
  }

  pub async fn stop(&self) -> Result<()> {
    run(&self.proxy, "stop", vec![]).await
  }

  /// Step backward `by` frames, one if `None`.
  pub async fn step_backward(&self, by: Option<i64>) -> Result<()> {
    run(&self.proxy, "stepBackward", by.map(Value::from).into_iter().collect()).await
  }

  /// Step forward `by` frames, one if `None`.
  pub async fn step_forward(&self, by: Option<i64>) -> Result<()> {
    run(&self.proxy, "stepForward", by.map(Value::from).into_iter().collect()).await
  }

  /// Keep only the range `from..to`, in seconds.
  pub async fn trim(&self, from: f64, to: f64) -> Result<()> {
    run(&self.proxy, "trimFrom", vec![Value::from(from), Value::from(to)]).await
  }

  pub async fn present(&self) -> Result<()> {
    run(&self.proxy, "present", vec![]).await
  }

  /// Export to `file` with a named settings preset such as "1080p".
  pub async fn export(&self, file: &str, preset: &str) -> Result<()> {
    run(
      &self.proxy,
      "export",
      vec![Value::Url(file.to_string()), Value::from(preset)],
    )
    .await
  }

  pub async fn close(&self, saving: SaveOption, saving_in: Option<&str>) -> Result<()> {
    close(&self.proxy, saving, saving_in).await
  }

  /// Save in place, or to `file` if given.
  pub async fn save(&self, file: Option<&str>) -> Result<()> {
    let args = file.map(|f| Value::Url(f.to_string())).into_iter().collect();
    run(&self.proxy, "save", args).await
  }

  pub async fn print(&self, options: PrintOptions) -> Result<()> {
    run(&self.proxy, "print", options.into_args()).await
  }

  pub async fn delete(&self) -> Result<()> {
    run(&self.proxy, "delete", vec![]).await
  }
}

/// A player window.
pub struct Window<T> {
  proxy: Proxy<T>,
}

impl<T: Transport> Window<T> {
  pub fn proxy(&self) -> &Proxy<T> {
    &self.proxy
  }

  pub async fn name(&self) -> Result<String> {
    get_text(&self.proxy, "name").await
  }

  pub async fn id(&self) -> Result<ObjectId> {
    get_id(&self.proxy).await
  }

  pub async fn index(&self) -> Result<i64> {
    get_integer(&self.proxy, "index").await
  }

  pub async fn set_index(&self, index: i64) -> Result<()> {
    self.proxy.set_property("index", index).await
  }

  pub async fn bounds(&self) -> Result<Rect> {
    let value = self.proxy.get_property("bounds").await?;
    value
      .as_rect()
      .ok_or_else(|| mismatch("bounds", ValueType::Rect, &value))
  }

  pub async fn set_bounds(&self, bounds: Rect) -> Result<()> {
    self.proxy.set_property("bounds", bounds).await
  }

  pub async fn closeable(&self) -> Result<bool> {
    get_bool(&self.proxy, "closeable").await
  }

  pub async fn miniaturizable(&self) -> Result<bool> {
    get_bool(&self.proxy, "miniaturizable").await
  }

  pub async fn miniaturized(&self) -> Result<bool> {
    get_bool(&self.proxy, "miniaturized").await
  }

  pub async fn set_miniaturized(&self, miniaturized: bool) -> Result<()> {
    self.proxy.set_property("miniaturized", miniaturized).await
  }

  pub async fn resizable(&self) -> Result<bool> {
    get_bool(&self.proxy, "resizable").await
  }

  pub async fn visible(&self) -> Result<bool> {
    get_bool(&self.proxy, "visible").await
  }

  pub async fn set_visible(&self, visible: bool) -> Result<()> {
    self.proxy.set_property("visible", visible).await
  }

  pub async fn zoomable(&self) -> Result<bool> {
    get_bool(&self.proxy, "zoomable").await
  }

  pub async fn zoomed(&self) -> Result<bool> {
    get_bool(&self.proxy, "zoomed").await
  }

  pub async fn set_zoomed(&self, zoomed: bool) -> Result<()> {
    self.proxy.set_property("zoomed", zoomed).await
  }

  /// The document shown in this window.
  pub async fn document(&self) -> Result<Document<T>> {
    let proxy = get_reference(&self.proxy, "document").await?;
    Ok(Document { proxy })
  }

  pub async fn close(&self, saving: SaveOption) -> Result<()> {
    close(&self.proxy, saving, None).await
  }
}

/// A camera or microphone.
pub struct RecordingDevice<T> {
  proxy: Proxy<T>,
}

impl<T: Transport> RecordingDevice<T> {
  pub fn proxy(&self) -> &Proxy<T> {
    &self.proxy
  }

  /// `VideoRecordingDevice` or `AudioRecordingDevice`.
  pub fn kind(&self) -> ObjectKind {
    self.proxy.kind()
  }

  pub async fn name(&self) -> Result<String> {
    get_text(&self.proxy, "name").await
  }

  pub async fn id(&self) -> Result<ObjectId> {
    get_id(&self.proxy).await
  }
}

/// An audio, movie or screen compression preset.
pub struct CompressionPreset<T> {
  proxy: Proxy<T>,
}

impl<T: Transport> CompressionPreset<T> {
  pub fn proxy(&self) -> &Proxy<T> {
    &self.proxy
  }

  pub fn kind(&self) -> ObjectKind {
    self.proxy.kind()
  }

  pub async fn name(&self) -> Result<String> {
    get_text(&self.proxy, "name").await
  }

  pub async fn id(&self) -> Result<ObjectId> {
    get_id(&self.proxy).await
  }
}
