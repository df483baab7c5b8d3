//! Sortscope configuration file handling

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use sortscope_client::ClientConfig;
use sortscope_core::Algorithm;
use sortscope_player::PlaybackConfig;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "sortscope.toml";

/// Upper bound for `playback.base_delay_ms`
pub const MAX_BASE_DELAY_MS: u64 = 60_000;

/// Top-level configuration (sortscope.toml)
#[derive(Debug, Default, PartialEq, Deserialize)]
pub struct SortscopeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub playback: PlaybackSettings,
}

/// Algorithm-execution service settings
#[derive(Debug, PartialEq, Deserialize)]
pub struct ServerConfig {
    /// Service origin
    #[serde(default = "default_url")]
    pub url: String,
    /// Transport timeout in seconds; unset waits for the transport
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: None,
        }
    }
}

/// Playback settings
#[derive(Debug, PartialEq, Deserialize)]
pub struct PlaybackSettings {
    /// Speed multiplier
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Delay between steps at speed 1.0, in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Algorithm used when none is given on the command line
    #[serde(default)]
    pub algorithm: Algorithm,
}

fn default_speed() -> f64 {
    1.0
}

fn default_base_delay_ms() -> u64 {
    100
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            base_delay_ms: default_base_delay_ms(),
            algorithm: Algorithm::default(),
        }
    }
}

impl SortscopeConfig {
    /// Load configuration.
    ///
    /// An explicitly named file must exist. Without one, `sortscope.toml` in
    /// the working directory is used if present, defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_file(path),
            None => {
                let path = Path::new(CONFIG_FILE);
                if path.exists() {
                    Self::load_file(path)
                } else {
                    tracing::debug!("no {CONFIG_FILE} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let delay = self.playback.base_delay_ms;
        if delay > MAX_BASE_DELAY_MS {
            bail!("playback.base_delay_ms must be at most {MAX_BASE_DELAY_MS}, got {delay}");
        }
        Ok(())
    }

    /// HTTP client configuration
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.server.url.clone());
        match self.server.timeout_secs {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }

    /// Playback controller configuration
    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig::default()
            .with_base_delay(Duration::from_millis(self.playback.base_delay_ms))
            .with_speed(self.playback.speed)
    }
}
