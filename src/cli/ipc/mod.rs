//! IPC (Inter-Process Communication) module for daemon control
//!
//! Line protocol: the client writes one command per connection and reads
//! one response line back. Responses are `ok`, `ok: <detail>`, a state
//! word, or `error: <message>`.

mod unix_socket;

pub use unix_socket::{SocketPath, UnixSocketClient, UnixSocketServer};

use std::io;
use std::path::PathBuf;

use tokio::sync::mpsc;

use super::signals::DaemonSignal;
use super::surface::SurfaceSnapshot;

/// Snapshot function type for IPC servers
pub type SnapshotFn = Box<dyn Fn() -> SurfaceSnapshot + Send + Sync>;

/// A parsed client command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpcCommand {
    Start,
    Stop,
    Toggle,
    Status,
    Artifact,
    Download(Option<PathBuf>),
    Upload,
}

impl IpcCommand {
    /// Parse one command line
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "start" => Self::Start,
            "stop" => Self::Stop,
            "toggle" => Self::Toggle,
            "status" => Self::Status,
            "artifact" => Self::Artifact,
            "download" => {
                return Ok(Self::Download(
                    (!rest.is_empty()).then(|| PathBuf::from(rest)),
                ))
            }
            "upload" => Self::Upload,
            "" => return Err("empty command".to_string()),
            other => return Err(format!("unknown command '{}'", other)),
        };

        if rest.is_empty() {
            Ok(command)
        } else {
            Err(format!("'{}' takes no arguments", word))
        }
    }

    /// Wire form of the command
    pub fn to_line(&self) -> String {
        match self {
            Self::Start => "start".to_string(),
            Self::Stop => "stop".to_string(),
            Self::Toggle => "toggle".to_string(),
            Self::Status => "status".to_string(),
            Self::Artifact => "artifact".to_string(),
            Self::Download(Some(path)) => format!("download {}", path.display()),
            Self::Download(None) => "download".to_string(),
            Self::Upload => "upload".to_string(),
        }
    }
}

/// Trait for IPC servers that listen for daemon commands
#[async_trait::async_trait]
pub trait IpcServer: Send + Sync {
    /// Bind to the IPC endpoint
    fn bind(&mut self) -> io::Result<()>;

    /// Get the path/name of the IPC endpoint
    fn path(&self) -> String;

    /// Accept and handle connections
    ///
    /// This runs in a loop, accepting connections and processing commands.
    /// Commands that change state are sent to the provided channel; queries
    /// are answered from `snapshot_fn`.
    async fn run(&self, tx: mpsc::Sender<DaemonSignal>, snapshot_fn: SnapshotFn)
        -> io::Result<()>;

    /// Cleanup IPC resources
    fn cleanup(&self);
}

/// Trait for IPC clients that send commands to the daemon
#[async_trait::async_trait]
pub trait IpcClient: Send + Sync {
    /// Check if daemon appears to be running (endpoint exists)
    fn is_daemon_running(&self) -> bool;

    /// Send a command and receive response
    async fn send_command(&self, cmd: &IpcCommand) -> io::Result<String>;
}

/// Create the IPC server
pub fn create_ipc_server() -> Box<dyn IpcServer> {
    Box::new(UnixSocketServer::new(SocketPath::new()))
}

/// Create the IPC client
pub fn create_ipc_client() -> Box<dyn IpcClient> {
    Box::new(UnixSocketClient::new(SocketPath::new()))
}
