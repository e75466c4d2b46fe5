use std::{fs, path::Path};

use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const SETTINGS_FILE: &str = "ruva.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub backend_url: String,
    /// `None` waits on the backend indefinitely.
    pub request_timeout_seconds: Option<u64>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            request_timeout_seconds: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    backend_url: Option<String>,
    request_timeout_seconds: Option<u64>,
}

/// Defaults, then `ruva.toml` in the working directory, then environment.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

pub fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = non_blank(file_cfg.backend_url) {
                    settings.backend_url = v;
                }
                if file_cfg.request_timeout_seconds.is_some() {
                    settings.request_timeout_seconds = file_cfg.request_timeout_seconds;
                }
            }
            Err(err) => warn!(path = %file.display(), %err, "ignoring unreadable settings file"),
        }
    }

    if let Some(v) = non_blank(env("BACKEND_URL")) {
        settings.backend_url = v;
    }
    if let Some(v) = non_blank(env("APP__BACKEND_URL")) {
        settings.backend_url = v;
    }

    if let Some(v) = non_blank(env("APP__REQUEST_TIMEOUT_SECONDS")) {
        match v.parse::<u64>() {
            Ok(0) => settings.request_timeout_seconds = None,
            Ok(parsed) => settings.request_timeout_seconds = Some(parsed),
            Err(_) => warn!(value = %v, "ignoring non-numeric APP__REQUEST_TIMEOUT_SECONDS"),
        }
    }

    settings
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
