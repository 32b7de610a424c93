//! Daemon command handler - sends commands to running daemon via IPC

use std::io;
use std::path::PathBuf;

use super::args::DaemonAction;
use super::ipc::{create_ipc_client, IpcCommand};
use super::presenter::Presenter;

/// Translate an action into its wire command.
///
/// The daemon runs in its own working directory, so a relative download
/// path is resolved against the client's `cwd` before it is sent.
fn to_command(
    action: DaemonAction,
    cwd: impl FnOnce() -> io::Result<PathBuf>,
) -> Result<IpcCommand, String> {
    Ok(match action {
        DaemonAction::Start => IpcCommand::Start,
        DaemonAction::Stop => IpcCommand::Stop,
        DaemonAction::Toggle => IpcCommand::Toggle,
        DaemonAction::Status => IpcCommand::Status,
        DaemonAction::Artifact => IpcCommand::Artifact,
        DaemonAction::Download { path: Some(path) } if path.is_relative() => {
            let cwd = cwd().map_err(|e| format!("Cannot resolve {}: {}", path.display(), e))?;
            IpcCommand::Download(Some(cwd.join(path)))
        }
        DaemonAction::Download { path } => IpcCommand::Download(path),
        DaemonAction::Upload => IpcCommand::Upload,
    })
}

/// Handle daemon subcommand
pub async fn handle_daemon_command(
    action: DaemonAction,
    presenter: &Presenter,
) -> Result<(), String> {
    let client = create_ipc_client();

    if !client.is_daemon_running() {
        return Err("No daemon running. Start with: screencast --daemon".to_string());
    }

    let command = to_command(action, std::env::current_dir)?;
    let response = client
        .send_command(&command)
        .await
        .map_err(|e| format!("Failed to communicate with daemon: {}", e))?;

    let response = response.trim();
    if let Some(stripped) = response.strip_prefix("error:") {
        return Err(stripped.trim().to_string());
    }

    let detail = response.strip_prefix("ok:").unwrap_or(response).trim();
    match command {
        IpcCommand::Status => presenter.daemon_status(response),
        IpcCommand::Artifact => presenter.output(response),
        IpcCommand::Download(_) | IpcCommand::Upload => presenter.output(detail),
        IpcCommand::Start | IpcCommand::Stop | IpcCommand::Toggle => {
            presenter.success(&format!("{}: {}", command.to_line(), detail))
        }
    }

    Ok(())
}
