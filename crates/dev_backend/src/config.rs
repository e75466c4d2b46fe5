use std::{collections::HashMap, fs, path::Path};

pub const SETTINGS_FILE: &str = "dev_backend.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// `dev_backend.toml` first, then `DEV_BACKEND_BIND`, then `APP__BIND_ADDR`.
/// Blank values are ignored.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("bind_addr").filter(|v| !v.trim().is_empty()) {
                    settings.bind_addr = v.trim().to_string();
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "ignoring unreadable settings file: {err}");
            }
        }
    }

    for key in ["DEV_BACKEND_BIND", "APP__BIND_ADDR"] {
        if let Some(v) = env(key).filter(|v| !v.trim().is_empty()) {
            settings.bind_addr = v.trim().to_string();
        }
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
