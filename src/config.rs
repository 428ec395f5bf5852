//! Client configuration parsed from environment variables.

use std::path::PathBuf;

use crate::error::SessionError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const STORAGE_DIR: &str = ".gophora";
const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeouts: HttpTimeouts,
    pub storage_path: PathBuf,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `GOPHORA_API_URL`: backend base URL, default `http://127.0.0.1:8000`
    /// - `GOPHORA_REQUEST_TIMEOUT_SECS`: default 30
    /// - `GOPHORA_CONNECT_TIMEOUT_SECS`: default 10
    /// - `GOPHORA_STORAGE_PATH`: default `$HOME/.gophora/storage.json`
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the API URL is not an http(s) URL.
    pub fn from_env() -> Result<Self, SessionError> {
        let api_url = normalize_api_url(std::env::var("GOPHORA_API_URL").ok().as_deref())?;
        let timeouts = HttpTimeouts {
            request_secs: env_parse_u64("GOPHORA_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("GOPHORA_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let storage_path = std::env::var("GOPHORA_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_storage_path(std::env::var("HOME").ok().as_deref()));

        Ok(Self { api_url, timeouts, storage_path })
    }

    /// Replace the API URL, applying the same validation as `from_env`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the URL is not an http(s) URL.
    pub fn with_api_url(mut self, raw: &str) -> Result<Self, SessionError> {
        self.api_url = normalize_api_url(Some(raw))?;
        Ok(self)
    }
}

pub(crate) fn normalize_api_url(raw: Option<&str>) -> Result<String, SessionError> {
    let url = raw.map_or(DEFAULT_API_URL, str::trim).trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(SessionError::Config(format!("GOPHORA_API_URL must be an http(s) URL, got '{url}'")));
    }
    Ok(url.to_owned())
}

pub(crate) fn default_storage_path(home: Option<&str>) -> PathBuf {
    let base = home.filter(|h| !h.is_empty()).map_or_else(PathBuf::new, PathBuf::from);
    base.join(STORAGE_DIR).join(STORAGE_FILE)
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
