//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::capture::CaptureRequest;
use crate::domain::recording::{Duration, VideoContainer};

/// Screencast - record the screen and microphone to a video file
#[derive(Parser, Debug)]
#[command(name = "screencast")]
#[command(version)]
#[command(about = "Screen and audio recorder with preview, download and upload")]
#[command(long_about = None)]
pub struct Cli {
    /// Stop automatically after this long (e.g., 30s, 5m, 1h30m)
    #[arg(short = 'd', long, value_name = "TIME", conflicts_with = "daemon")]
    pub duration: Option<String>,

    /// Where to save the recording (file or directory)
    #[arg(short = 'o', long, value_name = "PATH", conflicts_with = "daemon")]
    pub output: Option<PathBuf>,

    /// Container format for the recording
    #[arg(short = 'f', long, value_name = "FORMAT")]
    pub container: Option<ContainerArg>,

    /// X11 display (or avfoundation screen index) to capture
    #[arg(long, value_name = "DISPLAY")]
    pub display: Option<String>,

    /// Record the screen only
    #[arg(long)]
    pub no_audio: bool,

    /// Upload the recording when it is finished
    #[arg(short = 'u', long, conflicts_with = "daemon")]
    pub upload: bool,

    /// Upload service base URL
    #[arg(long, value_name = "URL")]
    pub upload_endpoint: Option<String>,

    /// Show desktop notifications
    #[arg(short = 'n', long)]
    pub notify: bool,

    /// Run as daemon (control via: screencast daemon start/stop/toggle/status)
    #[arg(long)]
    pub daemon: bool,

    /// Recording safety limit
    #[arg(long, value_name = "TIME")]
    pub max_duration: Option<String>,

    /// More diagnostic output (-v lifecycle, -vv everything)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Errors only
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Send commands to running daemon
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
    /// Download an uploaded file from the upload service
    Fetch {
        /// Object key of the uploaded file
        key: String,
        /// Destination file or directory (default: output directory)
        path: Option<PathBuf>,
    },
}

/// Daemon control actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum DaemonAction {
    /// Start recording
    Start,
    /// Stop recording and publish the result
    Stop,
    /// Toggle recording (start if idle, stop if recording)
    Toggle,
    /// Show daemon status
    Status,
    /// Show the URL of the last recording
    Artifact,
    /// Save the last recording
    Download {
        /// Destination file or directory (default: output directory)
        path: Option<PathBuf>,
    },
    /// Upload the last recording
    Upload,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Container argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ContainerArg {
    Mp4,
    Webm,
    Mkv,
}

impl From<ContainerArg> for VideoContainer {
    fn from(arg: ContainerArg) -> Self {
        match arg {
            ContainerArg::Mp4 => VideoContainer::Mp4,
            ContainerArg::Webm => VideoContainer::Webm,
            ContainerArg::Mkv => VideoContainer::Matroska,
        }
    }
}

/// Parsed one-shot recording options
#[derive(Debug, Clone)]
pub struct RecordOptions {
    /// Auto-stop after this long; record until interrupted when `None`
    pub duration: Option<Duration>,
    pub max_duration: Duration,
    pub output: PathBuf,
    pub container: VideoContainer,
    pub request: CaptureRequest,
    pub upload: bool,
    pub upload_endpoint: Option<String>,
    pub notify: bool,
}

/// Parsed daemon options
#[derive(Debug, Clone)]
pub struct DaemonOptions {
    pub max_duration: Duration,
    pub output_dir: PathBuf,
    pub container: VideoContainer,
    pub request: CaptureRequest,
    pub upload_endpoint: Option<String>,
    pub notify: bool,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "duration",
    "max_duration",
    "output_dir",
    "notify",
    "upload_endpoint",
    "capture.display",
    "capture.audio",
    "capture.audio_device",
    "capture.framerate",
    "capture.container",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::parse_from(["screencast"]);
        assert!(cli.duration.is_none());
        assert!(cli.output.is_none());
        assert!(cli.container.is_none());
        assert!(!cli.no_audio);
        assert!(!cli.upload);
        assert!(!cli.notify);
        assert!(!cli.daemon);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn cli_parses_recording_options() {
        let cli = Cli::parse_from([
            "screencast",
            "-d",
            "30s",
            "-o",
            "/tmp/take.mp4",
            "-f",
            "webm",
            "--no-audio",
            "-u",
        ]);
        assert_eq!(cli.duration, Some("30s".to_string()));
        assert_eq!(cli.output, Some(PathBuf::from("/tmp/take.mp4")));
        assert_eq!(cli.container, Some(ContainerArg::Webm));
        assert!(cli.no_audio);
        assert!(cli.upload);
    }

    #[test]
    fn cli_parses_daemon_with_max_duration() {
        let cli = Cli::parse_from(["screencast", "--daemon", "--max-duration", "5m"]);
        assert!(cli.daemon);
        assert_eq!(cli.max_duration, Some("5m".to_string()));
    }

    #[test]
    fn cli_counts_verbosity() {
        let cli = Cli::parse_from(["screencast", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn cli_parses_fetch() {
        let cli = Cli::parse_from(["screencast", "fetch", "videos/abc.mp4", "/tmp/out"]);
        match cli.command {
            Some(Commands::Fetch { key, path }) => {
                assert_eq!(key, "videos/abc.mp4");
                assert_eq!(path, Some(PathBuf::from("/tmp/out")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn cli_parses_daemon_download() {
        let cli = Cli::parse_from(["screencast", "daemon", "download", "/tmp/out"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Daemon {
                action: DaemonAction::Download { path: Some(_) }
            })
        ));

        let cli = Cli::parse_from(["screencast", "daemon", "download"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Daemon {
                action: DaemonAction::Download { path: None }
            })
        ));
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["screencast", "config", "set", "capture.container", "webm"]);
        if let Some(Commands::Config {
            action: ConfigAction::Set { key, value },
        }) = cli.command
        {
            assert_eq!(key, "capture.container");
            assert_eq!(value, "webm");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn container_arg_converts() {
        assert_eq!(VideoContainer::from(ContainerArg::Mp4), VideoContainer::Mp4);
        assert_eq!(VideoContainer::from(ContainerArg::Mkv), VideoContainer::Matroska);
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("max_duration"));
        assert!(is_valid_config_key("capture.framerate"));
        assert!(!is_valid_config_key("api_key"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
