//! Daemon app runner

use std::process::ExitCode;
use std::time::Duration as StdDuration;

use tokio::time::timeout;

use crate::application::ports::{
    ArtifactStore, CaptureSource, ControlSurface, MediaRecorder, Notifier,
};
use crate::application::{SessionConfig, SessionController, UploadArtifactUseCase};
use crate::domain::session::SessionState;
use crate::infrastructure::{
    create_notifier, FfmpegCapture, FfmpegRecorder, FsArtifactStore, UploadServiceClient,
};

use super::app::{resolve_output_path, EXIT_ERROR, EXIT_SUCCESS};
use super::args::DaemonOptions;
use super::ipc::create_ipc_server;
use super::pid_file::{PidFile, PidFileError};
use super::presenter::Presenter;
use super::signals::{CommandReply, DaemonSignal, DaemonSignalHandler};
use super::surface::TerminalSurface;

/// How often the max-duration limit is checked while recording
const LIMIT_POLL: StdDuration = StdDuration::from_millis(100);

/// Run daemon mode
pub async fn run_daemon(options: DaemonOptions) -> ExitCode {
    let presenter = Presenter::new();

    let pid_file = PidFile::new();
    if let Err(e) = pid_file.acquire() {
        match e {
            PidFileError::AlreadyRunning(pid) => {
                presenter.error(&format!("Another daemon is already running (PID: {})", pid));
            }
            _ => {
                presenter.error(&e.to_string());
            }
        }
        return ExitCode::from(EXIT_ERROR);
    }

    let surface = TerminalSurface::new(true);
    let controller = SessionController::new(
        FfmpegCapture::new(),
        FfmpegRecorder::new(options.container),
        FsArtifactStore::new(),
        surface.clone(),
        create_notifier(options.notify),
        SessionConfig {
            request: options.request.clone(),
            max_duration: options.max_duration,
            enable_notify: options.notify,
        },
    );

    // Setup signal handler (returns handler + sender for socket server)
    let (mut signals, signal_tx) = match DaemonSignalHandler::new().await {
        Ok(s) => s,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut ipc_server = create_ipc_server();
    if let Err(e) = ipc_server.bind() {
        presenter.error(&format!("Failed to bind socket: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }
    let ipc_path = ipc_server.path();

    let surface_for_ipc = surface.clone();
    tokio::spawn(async move {
        let _ = ipc_server
            .run(signal_tx, Box::new(move || surface_for_ipc.snapshot()))
            .await;
    });

    presenter.daemon_status("Started, waiting for commands...");
    presenter.info(&format!(
        "PID: {} | Socket: {} | SIGINT: exit",
        std::process::id(),
        ipc_path
    ));

    let result = daemon_loop(&controller, &mut signals, &presenter, &options).await;

    if let Err(e) = controller.shutdown().await {
        presenter.warn(&format!("Shutdown: {}", e));
    }
    let _ = pid_file.release();

    if result {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

async fn daemon_loop<C, R, S, F, N>(
    controller: &SessionController<C, R, S, F, N>,
    signals: &mut DaemonSignalHandler,
    presenter: &Presenter,
    options: &DaemonOptions,
) -> bool
where
    C: CaptureSource,
    R: MediaRecorder,
    S: ArtifactStore,
    F: ControlSurface,
    N: Notifier,
{
    loop {
        let state = controller.state().await;

        // While recording, wake up regularly to enforce max duration
        let signal = if state == SessionState::Recording {
            match timeout(LIMIT_POLL, signals.recv()).await {
                Ok(sig) => sig,
                Err(_) => {
                    if controller.check_max_duration() {
                        presenter.warn("Max duration reached, auto-stopping");
                        let _ = stop(controller, presenter).await;
                    }
                    continue;
                }
            }
        } else {
            signals.recv().await
        };

        match signal {
            Some(DaemonSignal::Start { reply }) => {
                let _ = reply.send(start(controller, presenter).await);
            }
            Some(DaemonSignal::Stop { reply }) => {
                let _ = reply.send(stop(controller, presenter).await);
            }
            Some(DaemonSignal::Toggle { reply }) => {
                let outcome = match controller.state().await {
                    SessionState::Idle => start(controller, presenter).await,
                    SessionState::Recording => stop(controller, presenter).await,
                };
                let _ = reply.send(outcome);
            }
            Some(DaemonSignal::Download { dest, reply }) => {
                download(controller, options, dest, reply).await;
            }
            Some(DaemonSignal::Upload { reply }) => {
                upload(controller, options, reply).await;
            }
            Some(DaemonSignal::Shutdown) => {
                presenter.daemon_status("Shutting down...");
                return true;
            }
            None => {
                // Channel closed
                return false;
            }
        }
    }
}

/// Start a session; the outcome is the reply sent back to the client
async fn start<C, R, S, F, N>(
    controller: &SessionController<C, R, S, F, N>,
    presenter: &Presenter,
) -> Result<String, String>
where
    C: CaptureSource,
    R: MediaRecorder,
    S: ArtifactStore,
    F: ControlSurface,
    N: Notifier,
{
    match controller.start().await {
        Ok(()) => {
            presenter.daemon_status("Recording...");
            Ok("recording".to_string())
        }
        Err(e) => {
            presenter.error(&format!("Failed to start recording: {}", e));
            Err(e.to_string())
        }
    }
}

async fn stop<C, R, S, F, N>(
    controller: &SessionController<C, R, S, F, N>,
    presenter: &Presenter,
) -> Result<String, String>
where
    C: CaptureSource,
    R: MediaRecorder,
    S: ArtifactStore,
    F: ControlSurface,
    N: Notifier,
{
    match controller.stop().await {
        Ok(Some(published)) => {
            let size = published.artifact.human_readable_size();
            presenter.daemon_status(&format!("Idle (recorded {})", size));
            Ok(format!("recorded {}", size))
        }
        Ok(None) => {
            presenter.warn("Not recording, nothing to stop");
            Ok("not recording".to_string())
        }
        Err(e) => {
            presenter.error(&format!("Failed to stop recording: {}", e));
            presenter.daemon_status("Idle (error)");
            Err(e.to_string())
        }
    }
}

async fn download<C, R, S, F, N>(
    controller: &SessionController<C, R, S, F, N>,
    options: &DaemonOptions,
    dest: Option<std::path::PathBuf>,
    reply: CommandReply,
) where
    C: CaptureSource,
    R: MediaRecorder,
    S: ArtifactStore,
    F: ControlSurface,
    N: Notifier,
{
    let result = match controller.latest_artifact().await {
        Some(published) => {
            let target = dest.unwrap_or_else(|| options.output_dir.clone());
            let path = resolve_output_path(&target, &published.artifact);
            controller
                .download(&path)
                .await
                .map(|_| path.display().to_string())
                .map_err(|e| e.to_string())
        }
        None => Err("Nothing has been recorded yet".to_string()),
    };
    let _ = reply.send(result);
}

async fn upload<C, R, S, F, N>(
    controller: &SessionController<C, R, S, F, N>,
    options: &DaemonOptions,
    reply: CommandReply,
) where
    C: CaptureSource,
    R: MediaRecorder,
    S: ArtifactStore,
    F: ControlSurface,
    N: Notifier,
{
    let result = match controller.latest_artifact().await {
        Some(published) => {
            let use_case = UploadArtifactUseCase::new(UploadServiceClient::new(
                options.upload_endpoint.clone(),
            ));
            use_case
                .execute(&published.artifact)
                .await
                .map(|receipt| format!("{}/{}", receipt.bucket, receipt.key))
                .map_err(|e| e.to_string())
        }
        None => Err("Nothing has been recorded yet".to_string()),
    };
    let _ = reply.send(result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::{mpsc, oneshot};

    use crate::application::ports::{CaptureError, CaptureStream, SilentNotifier};
    use crate::domain::capture::CaptureRequest;
    use crate::domain::recording::{Duration, VideoContainer};

    /// Capture source whose permission prompt is always dismissed
    struct DeniedCapture;

    #[async_trait]
    impl CaptureSource for DeniedCapture {
        async fn acquire(
            &self,
            _request: &CaptureRequest,
        ) -> Result<Box<dyn CaptureStream>, CaptureError> {
            Err(CaptureError::PermissionDenied("user dismissed".to_string()))
        }
    }

    fn options(output_dir: &std::path::Path) -> DaemonOptions {
        DaemonOptions {
            max_duration: Duration::default_max_duration(),
            output_dir: output_dir.to_path_buf(),
            container: VideoContainer::Webm,
            request: CaptureRequest::default(),
            upload_endpoint: None,
            notify: false,
        }
    }

    #[tokio::test]
    async fn denied_start_is_replied_as_error() {
        let staging = tempfile::tempdir().unwrap();
        let controller = SessionController::new(
            DeniedCapture,
            FfmpegRecorder::new(VideoContainer::Webm),
            FsArtifactStore::with_dir(staging.path()),
            TerminalSurface::new(false),
            SilentNotifier,
            SessionConfig::default(),
        );
        let (tx, rx) = mpsc::channel(4);
        let mut signals = DaemonSignalHandler::from_receiver(rx);

        let client = async move {
            let (reply, response) = oneshot::channel();
            tx.send(DaemonSignal::Start { reply }).await.unwrap();
            let start = response.await.unwrap();

            let (reply, response) = oneshot::channel();
            tx.send(DaemonSignal::Stop { reply }).await.unwrap();
            let stop = response.await.unwrap();

            tx.send(DaemonSignal::Shutdown).await.unwrap();
            (start, stop)
        };
        let opts = options(staging.path());
        let presenter = Presenter::new();
        let daemon = daemon_loop(&controller, &mut signals, &presenter, &opts);

        let (clean_exit, (start, stop)) = tokio::join!(daemon, client);
        assert!(clean_exit);
        let err = start.unwrap_err();
        assert!(err.contains("permission denied"), "{}", err);
        assert_eq!(stop, Ok("not recording".to_string()));
        assert_eq!(controller.state().await, SessionState::Idle);
    }
}
