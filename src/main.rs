//! Screencast CLI entry point

use std::process::ExitCode;

use clap::Parser;

use screencast::cli::{
    app::{
        daemon_options, load_merged_config, record_options, run_fetch, run_oneshot, EXIT_ERROR,
        EXIT_USAGE_ERROR,
    },
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    daemon_app::run_daemon,
    daemon_cmd::handle_daemon_command,
    presenter::Presenter,
};
use screencast::domain::config::{AppConfig, CaptureConfig};
use screencast::domain::recording::VideoContainer;
use screencast::infrastructure::{init_logging, Verbosity, XdgConfigStore};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        Verbosity::from_occurrences(cli.verbose)
    };
    init_logging(verbosity);

    let presenter = Presenter::new();

    // Handle subcommands; fetch needs the merged config
    let fetch = match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Daemon { action }) => {
            if let Err(e) = handle_daemon_command(action, &presenter).await {
                presenter.error(&e);
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        Some(Commands::Fetch { key, path }) => Some((key, path)),
        None => None,
    };

    // Build CLI config from args
    let capture = CaptureConfig {
        display: cli.display.clone(),
        audio: cli.no_audio.then_some(false),
        audio_device: None,
        framerate: None,
        container: cli
            .container
            .map(|c| VideoContainer::from(c).as_str().to_string()),
    };
    let cli_config = AppConfig {
        duration: cli.duration.clone(),
        max_duration: cli.max_duration.clone(),
        output_dir: None,
        notify: cli.notify.then_some(true),
        upload_endpoint: cli.upload_endpoint.clone(),
        capture: Some(capture),
    };

    let config = load_merged_config(cli_config).await;

    if let Some((key, path)) = fetch {
        return run_fetch(&config, &key, path).await;
    }

    if cli.daemon {
        match daemon_options(&config) {
            Ok(options) => run_daemon(options).await,
            Err(e) => {
                presenter.error(&e);
                ExitCode::from(EXIT_USAGE_ERROR)
            }
        }
    } else {
        match record_options(&config, cli.output.clone(), cli.upload) {
            Ok(options) => run_oneshot(options).await,
            Err(e) => {
                presenter.error(&e);
                ExitCode::from(EXIT_USAGE_ERROR)
            }
        }
    }
}
