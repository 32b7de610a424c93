//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, CaptureConfig};
use crate::domain::error::ConfigError;
use crate::domain::recording::{Duration, VideoContainer};

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";
const MAX_FRAMERATE: u32 = 240;

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

fn ensure_known_key(key: &str) -> Result<(), ConfigError> {
    if !is_valid_config_key(key) {
        return Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        });
    }
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    ensure_known_key(key)?;
    validate_config_value(key, value)?;

    let mut config = store.load().await?;
    apply_config_value(&mut config, key, value)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

/// Write a validated value into the config
fn apply_config_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let value_owned = value.to_string();
    match key {
        "duration" => config.duration = Some(value_owned),
        "max_duration" => config.max_duration = Some(value_owned),
        "output_dir" => config.output_dir = Some(value_owned),
        "notify" => config.notify = Some(parse_bool_for(key, value)?),
        "upload_endpoint" => config.upload_endpoint = Some(value_owned),
        capture_key => {
            let capture = config.capture.get_or_insert_with(CaptureConfig::default);
            match capture_key {
                "capture.display" => capture.display = Some(value_owned),
                "capture.audio" => capture.audio = Some(parse_bool_for(key, value)?),
                "capture.audio_device" => capture.audio_device = Some(value_owned),
                "capture.framerate" => capture.framerate = Some(parse_framerate(key, value)?),
                "capture.container" => capture.container = Some(value.to_lowercase()),
                _ => return Err(unknown_key(key)),
            }
        }
    }
    Ok(())
}

/// Read a value from the config as display text
fn read_config_value(config: &AppConfig, key: &str) -> Option<String> {
    let capture = config.capture.as_ref();
    match key {
        "duration" => config.duration.clone(),
        "max_duration" => config.max_duration.clone(),
        "output_dir" => config.output_dir.clone(),
        "notify" => config.notify.map(|b| b.to_string()),
        "upload_endpoint" => config.upload_endpoint.clone(),
        "capture.display" => capture.and_then(|c| c.display.clone()),
        "capture.audio" => capture.and_then(|c| c.audio).map(|b| b.to_string()),
        "capture.audio_device" => capture.and_then(|c| c.audio_device.clone()),
        "capture.framerate" => capture.and_then(|c| c.framerate).map(|f| f.to_string()),
        "capture.container" => capture.and_then(|c| c.container.clone()),
        _ => None,
    }
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    ensure_known_key(key)?;

    let config = store.load().await?;
    match read_config_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        presenter.key_value(
            key,
            read_config_value(&config, key).as_deref().unwrap_or(NOT_SET),
        );
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

/// Validate a config value based on key type
fn validate_config_value(key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "duration" | "max_duration" => {
            value
                .parse::<Duration>()
                .map_err(|e| ConfigError::ValidationError {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;
        }
        "notify" | "capture.audio" => {
            parse_bool_for(key, value)?;
        }
        "capture.framerate" => {
            parse_framerate(key, value)?;
        }
        "capture.container" => {
            value
                .parse::<VideoContainer>()
                .map_err(|e| ConfigError::ValidationError {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;
        }
        "upload_endpoint" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(ConfigError::ValidationError {
                    key: key.to_string(),
                    message: "Value must be an http:// or https:// URL".to_string(),
                });
            }
        }
        _ => {} // free-form strings
    }
    Ok(())
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    }
}

fn parse_bool_for(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).map_err(|_| ConfigError::ValidationError {
        key: key.to_string(),
        message: "Value must be 'true' or 'false'".to_string(),
    })
}

fn parse_framerate(key: &str, value: &str) -> Result<u32, ConfigError> {
    value
        .parse::<u32>()
        .ok()
        .filter(|f| (1..=MAX_FRAMERATE).contains(f))
        .ok_or_else(|| ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Value must be a number between 1 and {}", MAX_FRAMERATE),
        })
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}
