use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "directory.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub gateway_url: String,
    pub database_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gateway_url: "http://localhost:4000/graphql".into(),
            database_url: "sqlite://./data/directory.db".into(),
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    gateway_url: Option<String>,
    database_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then `directory.toml` in the working directory, then the environment.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file '{}'", file.display()))?;
        if let Some(v) = file_cfg.gateway_url {
            settings.gateway_url = v;
        }
        if let Some(v) = file_cfg.database_url {
            settings.database_url = v;
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            settings.request_timeout_secs = v;
        }
    }

    if let Some(v) = env("DIRECTORY_GATEWAY_URL") {
        settings.gateway_url = v;
    }
    if let Some(v) = env("APP__GATEWAY_URL") {
        settings.gateway_url = v;
    }

    if let Some(v) = env("DIRECTORY_DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = v
            .trim()
            .parse()
            .with_context(|| format!("APP__REQUEST_TIMEOUT_SECS is not a number: '{v}'"))?;
    }

    settings.database_url = normalize_database_url(&settings.database_url);
    Ok(settings)
}

pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
