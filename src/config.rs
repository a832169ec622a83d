use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const SERVER_ENV: &str = "VIDEO_SUMMARIZER_SERVER";

/// Client configuration. Only connection details live here; tasks and
/// backend settings are never stored locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend root, e.g. "http://127.0.0.1:8000"
    pub server_url: String,
    /// Fixed anti-forgery token. When unset the token is taken from the
    /// `csrftoken` cookie the backend issues.
    pub csrf_token: Option<String>,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            csrf_token: None,
            poll_interval_ms: 2000,
            request_timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Directory: ~/.config/video-summarizer/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("video-summarizer");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, returning defaults if file doesn't exist or is invalid.
    /// A missing file is created with the defaults so it can be edited.
    /// `VIDEO_SUMMARIZER_SERVER` overrides the stored server URL.
    pub fn load() -> Self {
        let path = Self::path();
        let mut config = match fs::read_to_string(&path) {
            Ok(data) => Self::parse(&data),
            Err(_) => {
                let config = Self::default();
                match config.save() {
                    Ok(()) => log::info!("Wrote default config to {}", path.display()),
                    Err(e) => log::warn!("Failed to save config: {e}"),
                }
                config
            }
        };
        if let Ok(server) = std::env::var(SERVER_ENV) {
            if !server.trim().is_empty() {
                config.server_url = server.trim().to_string();
            }
        }
        config
    }

    fn parse(data: &str) -> Self {
        match serde_json::from_str(data) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring invalid config file: {e}");
                Self::default()
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let dir = Self::dir();
        fs::create_dir_all(&dir)?;
        let data = serde_json::to_string_pretty(self)?;
        fs::write(Self::path(), data)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(100))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
