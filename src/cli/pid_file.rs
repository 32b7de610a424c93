//! Single-daemon guard
//!
//! The daemon records its PID next to the control socket. A PID file left
//! behind by a crashed daemon is detected and replaced.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use tracing::debug;

const PID_FILE_NAME: &str = "screencast.pid";

/// Directory for per-user runtime files: `$XDG_RUNTIME_DIR`, else the
/// system temp dir.
pub fn runtime_dir() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

/// PID file errors
#[derive(Debug, thiserror::Error)]
pub enum PidFileError {
    #[error("Another daemon is already running (PID: {0})")]
    AlreadyRunning(u32),

    #[error("Failed to write PID file {path}: {source}")]
    WriteFailed { path: PathBuf, source: io::Error },

    #[error("Failed to remove PID file {path}: {source}")]
    RemoveFailed { path: PathBuf, source: io::Error },
}

/// PID file held for the lifetime of a daemon
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// PID file in the runtime dir
    pub fn new() -> Self {
        Self::at(runtime_dir().join(PID_FILE_NAME))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// PID of a live daemon owning this file, if any.
    ///
    /// Files naming a dead process are removed.
    pub fn running_pid(&self) -> Option<u32> {
        let pid = read_pid(&self.path)?;
        match kill(Pid::from_raw(pid as i32), None) {
            // EPERM: alive, owned by someone else
            Ok(()) | Err(Errno::EPERM) => Some(pid),
            Err(_) => {
                debug!(path = %self.path.display(), pid, "removing stale pid file");
                let _ = fs::remove_file(&self.path);
                None
            }
        }
    }

    /// Claim the file for this process
    pub fn acquire(&self) -> Result<(), PidFileError> {
        if let Some(pid) = self.running_pid() {
            return Err(PidFileError::AlreadyRunning(pid));
        }
        fs::write(&self.path, process::id().to_string()).map_err(|source| {
            PidFileError::WriteFailed {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Remove the file if it is still ours
    pub fn release(&self) -> Result<(), PidFileError> {
        if read_pid(&self.path) != Some(process::id()) {
            return Ok(());
        }
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PidFileError::RemoveFailed {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl Default for PidFile {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}
