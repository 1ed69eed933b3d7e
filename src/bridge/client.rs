//! Bridge transport: owns the helper process and the IPC connection.

use std::process::Child;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;

use super::ipc::{BridgeIpc, IpcError};
use super::process::{cleanup_socket, spawn_helper, ProcessError};
use super::protocol::BridgeCommand;
use crate::config::BridgeConfig;
use crate::transport::{codes, RemoteError, Reply, Request, Transport};

#[derive(Error, Debug)]
pub enum BridgeError {
  #[error("Process error: {0}")]
  Process(#[from] ProcessError),
  #[error("IPC error: {0}")]
  Ipc(#[from] IpcError),
  #[error("Invalid config: {0}")]
  Config(String),
}

/// Transport that relays requests through the bridge helper.
pub struct BridgeTransport {
  config: Arc<Mutex<BridgeConfig>>,
  process: Arc<Mutex<Option<Child>>>,
  ipc: Arc<Mutex<Option<Arc<BridgeIpc>>>>,
}

impl BridgeTransport {
  pub fn new(config: BridgeConfig) -> Self {
    Self {
      config: Arc::new(Mutex::new(config)),
      process: Arc::new(Mutex::new(None)),
      ipc: Arc::new(Mutex::new(None)),
    }
  }

  /// Replace the configuration (takes effect on next start).
  pub fn set_config(&self, config: BridgeConfig) {
    *self.config.lock() = config;
  }

  pub fn config(&self) -> BridgeConfig {
    self.config.lock().clone()
  }

  /// Launch the helper if configured, then connect to it.
  ///
  /// Any previous session is stopped first, so a restart never leaves an
  /// unreachable helper behind.
  pub async fn start(&self) -> Result<(), BridgeError> {
    let config = self.config();
    config.validate().map_err(BridgeError::Config)?;

    let running = self.ipc.lock().is_some() || self.process.lock().is_some();
    if running {
      log::info!("Restarting bridge for {}", config.application);
      self.stop().await;
    }

    if config.launch_helper {
      // Cleanup any existing socket
      cleanup_socket(&config.socket_path);

      let helper = config.helper();
      let child = spawn_helper(
        helper.as_ref(),
        &config.socket_path,
        &config.application,
        &config.helper_args,
      )?;
      *self.process.lock() = Some(child);

      // Wait a bit for the helper to create the socket
      tokio::time::sleep(Duration::from_millis(200)).await;
    }

    let ipc_conn = match BridgeIpc::connect(
      &config.socket_path,
      config.connect_retries,
      config.request_timeout(),
    )
    .await
    {
      Ok(conn) => conn,
      Err(e) => {
        // A helper we cannot talk to is of no use to anyone.
        let child = self.process.lock().take();
        if let Some(child) = child {
          kill_helper(child).await;
          cleanup_socket(&config.socket_path);
        }
        return Err(e.into());
      }
    };
    *self.ipc.lock() = Some(Arc::new(ipc_conn));

    log::info!("Bridge connected for {}", config.application);
    Ok(())
  }

  /// Close the connection and stop the helper if we launched it.
  pub async fn stop(&self) {
    let ipc = self.ipc.lock().take();
    if let Some(conn) = ipc {
      log::info!("Closing bridge IPC connection");
      conn.close();
    }

    let child = self.process.lock().take();
    if let Some(child) = child {
      kill_helper(child).await;
      let socket = self.config.lock().socket_path.clone();
      cleanup_socket(&socket);
    }

    log::info!("Bridge stopped");
  }

  pub fn is_connected(&self) -> bool {
    self.ipc.lock().is_some()
  }

  /// Get a clone of the IPC connection.
  fn get_ipc(&self) -> Result<Arc<BridgeIpc>, RemoteError> {
    let guard = self.ipc.lock();
    guard
      .clone()
      .ok_or_else(|| RemoteError::new(codes::CONNECTION_INVALID, "bridge is not connected"))
  }
}

/// Kill and reap a helper process off the async runtime.
async fn kill_helper(mut child: Child) {
  let pid = child.id();
  log::info!("Killing bridge helper (pid: {})", pid);

  let result = tokio::task::spawn_blocking(move || {
    let kill_result = child.kill();
    let wait_result = child.wait();
    (kill_result, wait_result)
  })
  .await;

  match result {
    Ok((kill_result, wait_result)) => {
      if let Err(e) = kill_result {
        log::error!("kill() failed for pid {}: {}", pid, e);
      }
      match wait_result {
        Ok(status) => log::info!("Bridge helper {} exited with: {}", pid, status),
        Err(e) => log::error!("wait() failed for pid {}: {}", pid, e),
      }
    }
    Err(e) => log::error!("Helper cleanup task for pid {} panicked: {}", pid, e),
  }
}

impl Transport for BridgeTransport {
  async fn send(&self, request: Request) -> Result<Reply, RemoteError> {
    let ipc = self.get_ipc()?;
    let target = self.config.lock().application.clone();
    let cmd = BridgeCommand::new(&target, &request)?;
    let response = ipc.send_command(cmd).await?;
    response.into_reply(&request.operation)
  }
}

impl Clone for BridgeTransport {
  fn clone(&self) -> Self {
    Self {
      config: self.config.clone(),
      process: self.process.clone(),
      ipc: self.ipc.clone(),
    }
  }
}
