//! Async IPC connection to the bridge helper.
//!
//! One connection carries many requests at once. The writer task serialises
//! lines onto the socket; the reader task routes replies back to their
//! waiting callers by `request_id`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::protocol::{BridgeCommand, BridgeResponse};
use crate::transport::{codes, RemoteError};

#[derive(Error, Debug)]
pub enum IpcError {
  #[error("Connection failed: {0}")]
  ConnectionFailed(String),
  #[error("Write failed: {0}")]
  WriteFailed(#[from] std::io::Error),
  #[error("Encoding failed: {0}")]
  Encode(#[from] serde_json::Error),
  #[error("Command timeout")]
  Timeout,
  #[error("Disconnected")]
  Disconnected,
}

impl From<IpcError> for RemoteError {
  fn from(err: IpcError) -> Self {
    let code = match &err {
      IpcError::ConnectionFailed(_) => codes::PROCESS_NOT_FOUND,
      IpcError::WriteFailed(_) | IpcError::Disconnected => codes::CONNECTION_INVALID,
      IpcError::Encode(_) => codes::COERCION_FAILED,
      IpcError::Timeout => codes::TIMEOUT,
    };
    RemoteError::new(code, err.to_string())
  }
}

/// Requests in flight, shared by the caller side and both tasks.
struct IpcState {
  pending: HashMap<i64, oneshot::Sender<BridgeResponse>>,
  /// Set once either direction of the connection is gone.
  closed: bool,
}

impl IpcState {
  /// Hand a reply to its waiting caller.
  fn resolve(&mut self, response: BridgeResponse) {
    match self.pending.remove(&response.request_id) {
      Some(tx) => {
        let _ = tx.send(response);
      }
      None => log::warn!("Bridge reply for unknown request_id={}", response.request_id),
    }
  }

  /// Mark the connection dead. Dropping the senders wakes every waiter with
  /// `Disconnected` instead of letting it run into the timeout.
  fn shut_down(&mut self) {
    if !self.pending.is_empty() {
      log::warn!("Bridge connection lost with {} request(s) in flight", self.pending.len());
    }
    self.closed = true;
    self.pending.clear();
  }
}

enum WriteMessage {
  /// One encoded request line, newline included.
  Request { request_id: i64, line: Vec<u8> },
  Close,
}

/// Bridge IPC connection.
pub struct BridgeIpc {
  state: Arc<Mutex<IpcState>>,
  write_tx: async_channel::Sender<WriteMessage>,
  timeout: Duration,
  reader: JoinHandle<()>,
  _writer: JoinHandle<()>,
}

impl BridgeIpc {
  /// Connect to the bridge socket/pipe, trying up to `attempts` times with a
  /// growing pause in between.
  pub async fn connect(path: &str, attempts: u32, timeout: Duration) -> Result<Self, IpcError> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
      match Self::open(path, timeout).await {
        Ok(ipc) => {
          log::info!("Bridge IPC connected to {} (attempt {}/{})", path, attempt, attempts);
          return Ok(ipc);
        }
        Err(e) if attempt >= attempts => {
          log::warn!("Giving up on bridge IPC at {} after {} attempts: {}", path, attempts, e);
          return Err(e);
        }
        Err(e) => {
          log::debug!("Bridge IPC attempt {}/{} on {} failed: {}", attempt, attempts, path, e);
          tokio::time::sleep(Duration::from_millis(100 * (attempt as u64 + 1))).await;
          attempt += 1;
        }
      }
    }
  }

  #[cfg(windows)]
  async fn open(path: &str, timeout: Duration) -> Result<Self, IpcError> {
    use tokio::net::windows::named_pipe::ClientOptions;

    let pipe = ClientOptions::new()
      .open(path)
      .map_err(|e| IpcError::ConnectionFailed(format!("pipe {}: {}", path, e)))?;
    let (reader, writer) = tokio::io::split(pipe);
    Ok(Self::setup(reader, writer, timeout))
  }

  #[cfg(not(windows))]
  async fn open(path: &str, timeout: Duration) -> Result<Self, IpcError> {
    let stream = tokio::net::UnixStream::connect(path)
      .await
      .map_err(|e| IpcError::ConnectionFailed(format!("socket {}: {}", path, e)))?;
    let (reader, writer) = stream.into_split();
    Ok(Self::setup(reader, writer, timeout))
  }

  /// Start reader and writer tasks over an already open stream.
  pub(crate) fn setup<R, W>(reader: R, writer: W, timeout: Duration) -> Self
  where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
  {
    let state = Arc::new(Mutex::new(IpcState {
      pending: HashMap::new(),
      closed: false,
    }));
    let (write_tx, write_rx) = async_channel::unbounded();

    let reader = tokio::spawn(Self::reader_loop(reader, state.clone()));
    let writer = tokio::spawn(Self::writer_loop(writer, write_rx, state.clone()));

    Self {
      state,
      write_tx,
      timeout,
      reader,
      _writer: writer,
    }
  }

  async fn reader_loop<R: AsyncRead + Unpin>(reader: R, state: Arc<Mutex<IpcState>>) {
    let mut lines = BufReader::new(reader).lines();

    loop {
      match lines.next_line().await {
        Ok(Some(line)) => {
          let line = line.trim();
          if line.is_empty() {
            continue;
          }
          match BridgeResponse::parse(line) {
            Ok(response) => {
              log::debug!("Bridge reply for request_id={}", response.request_id);
              state.lock().resolve(response);
            }
            Err(e) => log::warn!("Unparseable bridge line ({}): {}", e, line),
          }
        }
        Ok(None) => {
          log::info!("Bridge closed the connection");
          break;
        }
        Err(e) => {
          log::error!("Bridge IPC read error: {}", e);
          break;
        }
      }
    }

    state.lock().shut_down();
  }

  async fn writer_loop<W: AsyncWrite + Unpin>(
    mut writer: W,
    write_rx: async_channel::Receiver<WriteMessage>,
    state: Arc<Mutex<IpcState>>,
  ) {
    while let Ok(msg) = write_rx.recv().await {
      let (request_id, line) = match msg {
        WriteMessage::Request { request_id, line } => (request_id, line),
        WriteMessage::Close => break,
      };

      let written = match writer.write_all(&line).await {
        Ok(()) => writer.flush().await,
        Err(e) => Err(e),
      };

      match written {
        Ok(()) => log::debug!("Bridge request_id={} written ({} bytes)", request_id, line.len()),
        Err(e) => {
          log::error!("Bridge request_id={} not written: {}", request_id, e);
          state.lock().shut_down();
          break;
        }
      }
    }

    // Half-close so the helper sees end of input.
    if let Err(e) = writer.shutdown().await {
      log::debug!("Bridge IPC shutdown: {}", e);
    }
  }

  /// Send a command to the bridge and wait for its response.
  pub async fn send_command(&self, cmd: BridgeCommand) -> Result<BridgeResponse, IpcError> {
    let request_id = cmd.request_id;
    let mut line = serde_json::to_vec(&cmd)?;
    line.push(b'\n');

    let (tx, rx) = oneshot::channel();
    {
      let mut state = self.state.lock();
      if state.closed {
        return Err(IpcError::Disconnected);
      }
      state.pending.insert(request_id, tx);
    }

    if self
      .write_tx
      .send(WriteMessage::Request { request_id, line })
      .await
      .is_err()
    {
      self.state.lock().pending.remove(&request_id);
      return Err(IpcError::Disconnected);
    }

    match tokio::time::timeout(self.timeout, rx).await {
      Ok(Ok(response)) => Ok(response),
      // Sender dropped: the connection went away while we waited.
      Ok(Err(_)) => Err(IpcError::Disconnected),
      Err(_) => {
        log::error!(
          "Bridge request_id={} got no reply within {:?}",
          request_id,
          self.timeout
        );
        self.state.lock().pending.remove(&request_id);
        Err(IpcError::Timeout)
      }
    }
  }

  /// Close the connection: fail requests in flight, stop reading and let the
  /// writer half-close the stream.
  pub fn close(&self) {
    self.state.lock().shut_down();
    let _ = self.write_tx.try_send(WriteMessage::Close);
    self.reader.abort();
  }
}

impl Drop for BridgeIpc {
  fn drop(&mut self) {
    // The writer ends on its own once `write_tx` is gone.
    self.reader.abort();
  }
}
