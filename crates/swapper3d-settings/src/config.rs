//! Configuration for the Swapper3D panel
//!
//! Settings are grouped into sections:
//! - Server (where the print server lives and how to authenticate)
//! - Plugin (identifier the host uses for push messages and the command route)
//! - Logging (diagnostic verbosity and format)
//!
//! Files may be TOML or JSON, chosen by extension.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{SettingsError, SettingsResult};

const CONFIG_DIR_NAME: &str = "swapper3d";
const CONFIG_FILE_NAME: &str = "config.toml";

pub const ENV_BASE_URL: &str = "SWAPPER3D_BASE_URL";
pub const ENV_API_KEY: &str = "SWAPPER3D_API_KEY";

/// Print server connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Root URL of the print server
    pub base_url: String,
    /// API key sent with every command, if the server requires one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            api_key: None,
            timeout_ms: 10_000,
        }
    }
}

/// Host plugin settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginSettings {
    /// Plugin identifier; push messages for any other identifier are ignored
    pub identifier: String,
    /// Command route; derived from the identifier when empty
    pub command_path: String,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            identifier: "Swapper3D".to_string(),
            command_path: String::new(),
        }
    }
}

/// Diagnostic logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete panel configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub server: ServerSettings,
    pub plugin: PluginSettings,
    pub logging: LoggingSettings,
}

impl PanelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location in the platform config directory
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no config directory on this platform".to_string())
        })?;
        Ok(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load config from file (TOML or JSON)
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = match Format::of(path)? {
            Format::Toml => toml::from_str(&content)?,
            Format::Json => serde_json::from_str(&content)?,
        };
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save config to file (TOML or JSON), creating parent directories
    pub fn save(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Toml => toml::to_string_pretty(self)?,
            Format::Json => serde_json::to_string_pretty(self)?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override settings from `SWAPPER3D_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override settings from any key lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.server.base_url = base_url;
        }
        if let Some(api_key) = lookup(ENV_API_KEY) {
            self.server.api_key = if api_key.is_empty() {
                None
            } else {
                Some(api_key)
            };
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.server.base_url.trim().is_empty() {
            return Err(SettingsError::invalid("server.base_url", "must not be empty"));
        }
        if self.server.timeout_ms == 0 {
            return Err(SettingsError::invalid("server.timeout_ms", "must be > 0"));
        }
        if self.plugin.identifier.trim().is_empty() {
            return Err(SettingsError::invalid("plugin.identifier", "must not be empty"));
        }
        if !self.plugin.command_path.is_empty() && !self.plugin.command_path.starts_with('/') {
            return Err(SettingsError::invalid(
                "plugin.command_path",
                "must start with '/'",
            ));
        }
        Ok(())
    }

    /// Command route, derived from the plugin identifier unless set
    pub fn command_path(&self) -> String {
        if self.plugin.command_path.is_empty() {
            format!("/plugin/{}/command", self.plugin.identifier)
        } else {
            self.plugin.command_path.clone()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.server.timeout_ms)
    }
}

enum Format {
    Toml,
    Json,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Format::Toml),
            Some("json") => Ok(Format::Json),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}
