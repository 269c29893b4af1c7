use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const LOCAL_API_BASE: &str = "http://localhost:8000/api/snippets/";

/// API endpoint baked in at build time
#[cfg(debug_assertions)]
pub const DEFAULT_API_BASE: &str = LOCAL_API_BASE;

#[cfg(not(debug_assertions))]
pub const DEFAULT_API_BASE: &str = match option_env!("CODEPASTE_API_BASE") {
    Some(base) => base,
    None => LOCAL_API_BASE,
};

pub const LOCAL_SHARE_ORIGIN: &str = "http://localhost:5173";

/// Web client origin share links point at, baked in at build time
#[cfg(debug_assertions)]
pub const DEFAULT_SHARE_ORIGIN: &str = LOCAL_SHARE_ORIGIN;

#[cfg(not(debug_assertions))]
pub const DEFAULT_SHARE_ORIGIN: &str = match option_env!("CODEPASTE_WEB_ORIGIN") {
    Some(origin) => origin,
    None => LOCAL_SHARE_ORIGIN,
};

pub const ENV_API_URL: &str = "CODEPASTE_API_URL";
pub const ENV_SHARE_ORIGIN: &str = "CODEPASTE_SHARE_ORIGIN";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine the config directory")]
    NoConfigDir,
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    /// Web client origin share links are built on. Defaults to
    /// [`DEFAULT_SHARE_ORIGIN`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_origin: Option<String>,
    /// Transport timeout; unset leaves reqwest's default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            share_origin: None,
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    /// `<config_dir>/codepaste/config.toml`
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("codepaste").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Read settings from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(origin) = lookup(ENV_SHARE_ORIGIN).filter(|v| !v.trim().is_empty()) {
            self.share_origin = Some(origin);
        }
    }

    /// Defaults, then the config file, then the environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Self::load_from(&Self::default_path()?)?;
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Origin used for share links. The web client serves `/view/<id>`,
    /// the API host does not.
    pub fn share_origin(&self) -> String {
        self.share_origin
            .as_deref()
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .unwrap_or(DEFAULT_SHARE_ORIGIN)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the defaults to `path` unless a file is already there.
    /// Returns whether a file was written.
    pub fn write_default(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = Self::default().to_toml()?;
        let tmp_path = path.with_extension("tmp");
        let mut tmp = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.sync_all()?;
        fs::rename(&tmp_path, path)?;

        tracing::info!(path = %path.display(), "wrote default config");
        Ok(true)
    }
}
