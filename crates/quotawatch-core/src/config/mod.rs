//! Application settings loaded from a TOML config file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default upstream usage endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.z.ai/api/biz/v1/subscription/usage";

/// Application settings (from config file)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Outbound usage-fetch settings
    #[serde(default)]
    pub fetch: FetchSettings,

    /// Web server settings
    #[serde(default)]
    pub web: WebSettings,

    /// Credential store settings
    #[serde(default)]
    pub store: StoreSettings,
}

/// Outbound usage-fetch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Upstream usage endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum in-flight fetches per aggregation cycle
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_concurrent() -> usize {
    8
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSettings {
    /// Enable the web server
    #[serde(default = "default_web_enabled")]
    pub enabled: bool,

    /// Web server port
    #[serde(default = "default_web_port")]
    pub port: u16,
}

fn default_web_enabled() -> bool {
    true
}

fn default_web_port() -> u16 {
    8787
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            enabled: default_web_enabled(),
            port: default_web_port(),
        }
    }
}

/// Credential store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Path of the credential file (defaults to the platform data dir)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StoreSettings {
    /// Resolve the credential file path, falling back to
    /// `<data_dir>/quotawatch/credentials.json` and finally the working
    /// directory.
    pub fn resolve_path(&self) -> PathBuf {
        if let Some(ref path) = self.path {
            return path.clone();
        }
        dirs::data_dir()
            .map(|d| d.join("quotawatch/credentials.json"))
            .unwrap_or_else(|| PathBuf::from("credentials.json"))
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read config file: {:?}", p))?;
                return toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {:?}", p));
            }
        }

        // Try default config locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("quotawatch/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/quotawatch/config.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                return toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {:?}", path));
            }
        }

        // Return defaults if no config file found
        Ok(Self::default())
    }

    /// Validate and normalize settings values.
    ///
    /// An unbounded or zero-width fetch pool would either exhaust sockets or
    /// deadlock the cycle, so both limits get a floor.
    pub fn validate(&mut self) {
        if self.fetch.max_concurrent < 1 {
            self.fetch.max_concurrent = 1;
        }
        if self.fetch.timeout_secs < 1 {
            self.fetch.timeout_secs = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.fetch.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.fetch.timeout_secs, 10);
        assert_eq!(settings.fetch.max_concurrent, 8);
        assert!(settings.web.enabled);
        assert_eq!(settings.web.port, 8787);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [fetch]
            endpoint = "http://localhost:9999/usage"

            [web]
            port = 3000
            "#,
        )
        .unwrap();
        assert_eq!(settings.fetch.endpoint, "http://localhost:9999/usage");
        assert_eq!(settings.fetch.timeout_secs, 10);
        assert_eq!(settings.web.port, 3000);
        assert!(settings.web.enabled);
    }

    #[test]
    fn test_validate_clamps_limits() {
        let mut settings = Settings::default();
        settings.fetch.max_concurrent = 0;
        settings.fetch.timeout_secs = 0;
        settings.validate();
        assert_eq!(settings.fetch.max_concurrent, 1);
        assert_eq!(settings.fetch.timeout_secs, 1);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[web]\nport = 4000\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.web.port, 4000);
    }

    #[test]
    fn test_store_path_override() {
        let store = StoreSettings {
            path: Some(PathBuf::from("/tmp/creds.json")),
        };
        assert_eq!(store.resolve_path(), PathBuf::from("/tmp/creds.json"));
    }
}
