//! Main app runner for one-shot mode

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::time::{interval, Duration as TokioDuration};
use tracing::info;

use crate::application::ports::ConfigStore;
use crate::application::{
    FetchUploadUseCase, SessionConfig, SessionController, UploadArtifactUseCase,
};
use crate::domain::config::AppConfig;
use crate::domain::recording::{Duration, RecordingArtifact};
use crate::infrastructure::{
    create_notifier, FfmpegCapture, FfmpegRecorder, FsArtifactStore, UploadServiceClient,
    XdgConfigStore,
};

use super::args::{DaemonOptions, RecordOptions};
use super::presenter::Presenter;
use super::signals::ShutdownSignal;
use super::surface::TerminalSurface;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable overriding `upload_endpoint`
pub const ENV_UPLOAD_ENDPOINT: &str = "SCREENCAST_UPLOAD_ENDPOINT";
/// Environment variable overriding `output_dir`
pub const ENV_OUTPUT_DIR: &str = "SCREENCAST_OUTPUT_DIR";

const PROGRESS_TICK: TokioDuration = TokioDuration::from_millis(100);

/// Run a one-shot recording: record until Ctrl+C or the duration, save
/// the result and optionally upload it.
pub async fn run_oneshot(options: RecordOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let shutdown = ShutdownSignal::new();
    if let Err(e) = shutdown.setup().await {
        presenter.error(&format!("Failed to setup signal handler: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    let controller = SessionController::new(
        FfmpegCapture::new(),
        FfmpegRecorder::new(options.container),
        FsArtifactStore::new(),
        TerminalSurface::new(false),
        create_notifier(options.notify),
        SessionConfig {
            request: options.request.clone(),
            max_duration: options.max_duration,
            enable_notify: options.notify,
        },
    );

    if let Err(e) = controller.start().await {
        presenter.error(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }

    let limit_ms = options.duration.map(|d| d.as_millis());
    presenter.start_spinner("Recording... (Ctrl+C to stop)");

    let mut ticker = interval(PROGRESS_TICK);
    loop {
        ticker.tick().await;
        if shutdown.is_shutdown() {
            break;
        }

        let elapsed = controller.elapsed_ms();
        presenter.update_recording_progress(elapsed, limit_ms);

        if limit_ms.is_some_and(|limit| elapsed >= limit) {
            break;
        }
        if controller.check_max_duration() {
            presenter.warn("Max duration reached, auto-stopping");
            break;
        }
    }

    let published = match controller.stop().await {
        Ok(Some(published)) => published,
        Ok(None) => {
            presenter.spinner_fail("No recording in progress");
            return ExitCode::from(EXIT_ERROR);
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            let _ = controller.shutdown().await;
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let artifact = published.artifact.as_ref();
    presenter.spinner_success(&format!(
        "Recording complete ({})",
        artifact.human_readable_size()
    ));
    if artifact.is_empty() {
        presenter.warn("The recorder produced no data");
    }

    let dest = resolve_output_path(&options.output, artifact);
    let mut exit = EXIT_SUCCESS;

    match controller.download(&dest).await {
        Ok(_) => presenter.output(&dest.to_string_lossy()),
        Err(e) => {
            presenter.error(&e.to_string());
            exit = EXIT_ERROR;
        }
    }

    if options.upload {
        let use_case = UploadArtifactUseCase::new(UploadServiceClient::new(
            options.upload_endpoint.clone(),
        ));
        match use_case.execute(artifact).await {
            Ok(receipt) => {
                presenter.success(&format!("Uploaded to {}/{}", receipt.bucket, receipt.key))
            }
            Err(e) => {
                presenter.error(&e.to_string());
                exit = EXIT_ERROR;
            }
        }
    }

    // Staged copy is no longer needed once it has been saved
    if let Err(e) = controller.shutdown().await {
        presenter.warn(&e.to_string());
    }

    ExitCode::from(exit)
}

/// Where a download of `artifact` should go.
///
/// Directories (existing ones, or paths without an extension) get a
/// generated file name; anything else is used as the file path.
pub fn resolve_output_path(output: &Path, artifact: &RecordingArtifact) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        output.join(artifact.file_name(stamp))
    } else {
        output.to_path_buf()
    }
}

/// Fetch an uploaded file by key and save it under `dest`, or the
/// configured output directory.
pub async fn run_fetch(config: &AppConfig, key: &str, dest: Option<PathBuf>) -> ExitCode {
    let presenter = Presenter::new();
    let use_case =
        FetchUploadUseCase::new(UploadServiceClient::new(config.upload_endpoint.clone()));

    let fetched = match use_case.execute(key).await {
        Ok(fetched) => fetched,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let target = dest.unwrap_or_else(|| config.output_dir_or_default());
    let path = resolve_fetch_path(&target, &fetched.file_name);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            presenter.error(&format!("Failed to create {}: {}", parent.display(), e));
            return ExitCode::from(EXIT_ERROR);
        }
    }

    match tokio::fs::write(&path, &fetched.data).await {
        Ok(()) => {
            presenter.output(&path.to_string_lossy());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.error(&format!("Failed to write {}: {}", path.display(), e));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Where a fetched file should go: directories get the key's file name
pub fn resolve_fetch_path(output: &Path, file_name: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(file_name)
    } else {
        output.to_path_buf()
    }
}

/// Parse a duration option, naming the option in the error
fn parse_duration_option(name: &str, value: &str) -> Result<Duration, String> {
    value
        .parse::<Duration>()
        .map_err(|e| format!("Invalid {}: {}", name, e))
}

/// Build one-shot options from the merged config
pub fn record_options(
    config: &AppConfig,
    output: Option<PathBuf>,
    upload: bool,
) -> Result<RecordOptions, String> {
    let duration = config
        .duration
        .as_deref()
        .map(|d| parse_duration_option("duration", d))
        .transpose()?;
    let max_duration = config
        .max_duration
        .as_deref()
        .map(|d| parse_duration_option("max-duration", d))
        .transpose()?
        .unwrap_or_else(Duration::default_max_duration);

    Ok(RecordOptions {
        duration,
        max_duration,
        output: output.unwrap_or_else(|| config.output_dir_or_default()),
        container: config.container_or_default(),
        request: config.capture_request(),
        upload,
        upload_endpoint: config.upload_endpoint.clone(),
        notify: config.notify_or_default(),
    })
}

/// Build daemon options from the merged config
pub fn daemon_options(config: &AppConfig) -> Result<DaemonOptions, String> {
    let max_duration = config
        .max_duration
        .as_deref()
        .map(|d| parse_duration_option("max-duration", d))
        .transpose()?
        .unwrap_or_else(Duration::default_max_duration);

    Ok(DaemonOptions {
        max_duration,
        output_dir: config.output_dir_or_default(),
        container: config.container_or_default(),
        request: config.capture_request(),
        upload_endpoint: config.upload_endpoint.clone(),
        notify: config.notify_or_default(),
    })
}

/// Config layer from environment variables
pub fn env_config(lookup: impl Fn(&str) -> Option<String>) -> AppConfig {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    AppConfig {
        upload_endpoint: non_empty(ENV_UPLOAD_ENDPOINT),
        output_dir: non_empty(ENV_OUTPUT_DIR),
        ..Default::default()
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            Presenter::new().warn(&format!("Ignoring config file: {}", e));
            AppConfig::empty()
        }
    };

    let env_config = env_config(|key| env::var(key).ok());
    info!(path = %store.path().display(), "configuration loaded");

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::CaptureConfig;
    use crate::domain::recording::VideoContainer;

    fn artifact() -> RecordingArtifact {
        RecordingArtifact::new(vec![1u8; 10], VideoContainer::Webm, 1)
    }

    #[test]
    fn output_file_path_is_kept() {
        let path = resolve_output_path(Path::new("/tmp/take.webm"), &artifact());
        assert_eq!(path, PathBuf::from("/tmp/take.webm"));
    }

    #[test]
    fn output_directory_gets_generated_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = resolve_output_path(dir.path(), &artifact());
        assert_eq!(path.parent(), Some(dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("screencast-"));
        assert!(name.ends_with(".webm"));
    }

    #[test]
    fn extensionless_missing_path_is_treated_as_directory() {
        let path = resolve_output_path(Path::new("/tmp/not-yet-created"), &artifact());
        assert!(path.starts_with("/tmp/not-yet-created"));
    }

    #[test]
    fn fetched_file_keeps_key_name_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_fetch_path(dir.path(), "1b4e28ba.webm"),
            dir.path().join("1b4e28ba.webm")
        );
        assert_eq!(
            resolve_fetch_path(Path::new("/tmp/clip.webm"), "1b4e28ba.webm"),
            PathBuf::from("/tmp/clip.webm")
        );
    }

    #[test]
    fn record_options_from_defaults() {
        let options = record_options(&AppConfig::defaults(), None, false).unwrap();
        assert!(options.duration.is_none());
        assert_eq!(options.max_duration, Duration::default_max_duration());
        assert_eq!(options.container, VideoContainer::Mp4);
        assert!(options.request.audio);
    }

    #[test]
    fn record_options_reject_bad_duration() {
        let config = AppConfig {
            duration: Some("soon".to_string()),
            ..AppConfig::defaults()
        };
        let err = record_options(&config, None, false).unwrap_err();
        assert!(err.starts_with("Invalid duration"));
    }

    #[test]
    fn daemon_options_follow_capture_config() {
        let config = AppConfig::defaults().merge(AppConfig {
            max_duration: Some("10m".to_string()),
            capture: Some(CaptureConfig {
                audio: Some(false),
                container: Some("mkv".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        });
        let options = daemon_options(&config).unwrap();
        assert_eq!(options.max_duration, Duration::from_secs(600));
        assert_eq!(options.container, VideoContainer::Matroska);
        assert!(!options.request.audio);
    }

    #[test]
    fn env_config_reads_known_variables() {
        let config = env_config(|key| match key {
            ENV_UPLOAD_ENDPOINT => Some("https://up.example.com".to_string()),
            ENV_OUTPUT_DIR => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(
            config.upload_endpoint,
            Some("https://up.example.com".to_string())
        );
        assert!(config.output_dir.is_none());
    }
}
