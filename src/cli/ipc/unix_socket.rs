//! Unix Domain Socket communication for daemon control

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::{IpcClient, IpcCommand, IpcServer, SnapshotFn};
use crate::cli::pid_file::runtime_dir;
use crate::cli::signals::{CommandReply, DaemonSignal};
use crate::cli::surface::SurfaceSnapshot;

const SOCKET_NAME: &str = "screencast.sock";

/// Socket path resolver
#[derive(Debug, Clone)]
pub struct SocketPath {
    path: PathBuf,
}

impl SocketPath {
    /// Socket in the runtime dir
    pub fn new() -> Self {
        Self {
            path: runtime_dir().join(SOCKET_NAME),
        }
    }

    /// Use a specific socket path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the socket path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if socket file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Remove socket file if it exists
    pub fn cleanup(&self) -> io::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl Default for SocketPath {
    fn default() -> Self {
        Self::new()
    }
}

/// Unix Domain Socket server for daemon commands
pub struct UnixSocketServer {
    socket_path: SocketPath,
    listener: Option<UnixListener>,
}

impl UnixSocketServer {
    /// Create a new socket server
    pub fn new(socket_path: SocketPath) -> Self {
        Self {
            socket_path,
            listener: None,
        }
    }
}

impl Drop for UnixSocketServer {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[async_trait]
impl IpcServer for UnixSocketServer {
    fn bind(&mut self) -> io::Result<()> {
        // Remove stale socket file if it exists
        self.socket_path.cleanup()?;

        let listener = UnixListener::bind(self.socket_path.path())?;
        self.listener = Some(listener);
        Ok(())
    }

    fn path(&self) -> String {
        self.socket_path.path().to_string_lossy().to_string()
    }

    async fn run(
        &self,
        tx: mpsc::Sender<DaemonSignal>,
        snapshot_fn: SnapshotFn,
    ) -> io::Result<()> {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "Socket not bound"))?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let tx = tx.clone();
                    let snapshot = snapshot_fn();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, tx, snapshot).await {
                            warn!(error = %e, "socket connection error");
                        }
                    });
                }
                Err(e) => {
                    warn!(error = %e, "socket accept error");
                }
            }
        }
    }

    fn cleanup(&self) {
        let _ = self.socket_path.cleanup();
    }
}

const SHUTTING_DOWN: &str = "error: daemon is shutting down";

/// Format the reply to a request/response command
fn reply_line(result: Result<Result<String, String>, oneshot::error::RecvError>) -> String {
    match result {
        Ok(Ok(detail)) => format!("ok: {}", detail),
        Ok(Err(message)) => format!("error: {}", message),
        Err(_) => SHUTTING_DOWN.to_string(),
    }
}

/// Send a command to the daemon loop and wait for its outcome
async fn request(
    tx: &mpsc::Sender<DaemonSignal>,
    signal: impl FnOnce(CommandReply) -> DaemonSignal,
) -> String {
    let (reply, response) = oneshot::channel();
    if tx.send(signal(reply)).await.is_err() {
        return SHUTTING_DOWN.to_string();
    }
    reply_line(response.await)
}

/// Turn a command into its response line
async fn dispatch(
    command: IpcCommand,
    tx: &mpsc::Sender<DaemonSignal>,
    snapshot: SurfaceSnapshot,
) -> String {
    match command {
        IpcCommand::Start => request(tx, |reply| DaemonSignal::Start { reply }).await,
        IpcCommand::Stop => request(tx, |reply| DaemonSignal::Stop { reply }).await,
        IpcCommand::Toggle => request(tx, |reply| DaemonSignal::Toggle { reply }).await,
        IpcCommand::Status => snapshot.state_word().to_string(),
        IpcCommand::Artifact => match snapshot.download {
            Some(url) => url.to_string(),
            None => "none".to_string(),
        },
        IpcCommand::Download(dest) => {
            request(tx, |reply| DaemonSignal::Download { dest, reply }).await
        }
        IpcCommand::Upload => request(tx, |reply| DaemonSignal::Upload { reply }).await,
    }
}

/// Handle a single client connection
async fn handle_connection(
    stream: UnixStream,
    tx: mpsc::Sender<DaemonSignal>,
    snapshot: SurfaceSnapshot,
) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    reader.read_line(&mut line).await?;
    debug!(command = line.trim(), "ipc command received");

    let response = match IpcCommand::parse(&line) {
        Ok(command) => dispatch(command, &tx, snapshot).await,
        Err(message) => format!("error: {}", message),
    };

    writer.write_all(format!("{}\n", response).as_bytes()).await?;
    writer.flush().await?;

    Ok(())
}

/// Unix Domain Socket client for sending commands to daemon
pub struct UnixSocketClient {
    socket_path: SocketPath,
}

impl UnixSocketClient {
    /// Create a new socket client
    pub fn new(socket_path: SocketPath) -> Self {
        Self { socket_path }
    }
}

#[async_trait]
impl IpcClient for UnixSocketClient {
    fn is_daemon_running(&self) -> bool {
        self.socket_path.exists()
    }

    async fn send_command(&self, cmd: &IpcCommand) -> io::Result<String> {
        let stream = UnixStream::connect(self.socket_path.path()).await?;
        let (reader, mut writer) = stream.into_split();

        writer
            .write_all(format!("{}\n", cmd.to_line()).as_bytes())
            .await?;
        writer.flush().await?;

        let mut reader = BufReader::new(reader);
        let mut response = String::new();
        reader.read_line(&mut response).await?;

        Ok(response)
    }
}
