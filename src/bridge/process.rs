//! Bridge helper detection and spawning.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use thiserror::Error;

/// Executable name looked up on `PATH`.
pub const HELPER_NAME: &str = "quicktime-bridge";

#[derive(Error, Debug)]
pub enum ProcessError {
  #[error("Bridge helper executable not found")]
  NotFound,
  #[error("Failed to spawn bridge helper: {0}")]
  SpawnFailed(#[from] std::io::Error),
}

/// Default IPC socket/pipe path for the bridge.
pub fn default_socket_path() -> String {
  #[cfg(windows)]
  {
    r"\\.\pipe\quicktime-remote".to_string()
  }
  #[cfg(not(windows))]
  {
    "/tmp/quicktime-remote.sock".to_string()
  }
}

/// Find the bridge helper in common locations.
pub fn find_helper() -> Option<PathBuf> {
  // Check PATH first
  if let Ok(path) = which::which(HELPER_NAME) {
    return Some(path);
  }

  #[cfg(target_os = "macos")]
  {
    let common_paths = [
      "/usr/local/bin/quicktime-bridge",
      "/opt/homebrew/bin/quicktime-bridge",
    ];
    for path in common_paths {
      let p = PathBuf::from(path);
      if p.exists() {
        return Some(p);
      }
    }
  }

  None
}

/// Spawn the bridge helper listening on `socket` and addressing `application`.
pub fn spawn_helper(
  helper_path: Option<&PathBuf>,
  socket: &str,
  application: &str,
  extra_args: &[String],
) -> Result<Child, ProcessError> {
  let helper = helper_path
    .cloned()
    .or_else(find_helper)
    .ok_or(ProcessError::NotFound)?;

  log::info!("Spawning bridge helper: {:?} on {} for {}", helper, socket, application);
  if !extra_args.is_empty() {
    log::info!("Extra helper args: {:?}", extra_args);
  }

  let mut cmd = Command::new(&helper);
  cmd
    .arg(format!("--socket={}", socket))
    .arg(format!("--application={}", application));

  for arg in extra_args {
    cmd.arg(arg);
  }

  let child = cmd
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()?;

  Ok(child)
}

/// Remove a stale socket file.
pub fn cleanup_socket(path: &str) {
  #[cfg(not(windows))]
  {
    if Path::new(path).exists() {
      let _ = std::fs::remove_file(path);
    }
  }
  #[cfg(windows)]
  {
    // Windows named pipes are cleaned up automatically
    let _ = Path::new(path);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_helper_is_not_found() {
    let bogus = PathBuf::from("/nonexistent/quicktime-bridge");
    let err = spawn_helper(Some(&bogus), &default_socket_path(), "QuickTime Player", &[]).unwrap_err();
    assert!(matches!(err, ProcessError::SpawnFailed(_)));
  }

  #[cfg(not(windows))]
  #[test]
  fn test_cleanup_removes_stale_socket() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stale.sock");
    std::fs::write(&path, b"").unwrap();
    cleanup_socket(path.to_str().unwrap());
    assert!(!path.exists());
    // already gone is fine
    cleanup_socket(path.to_str().unwrap());
  }
}
