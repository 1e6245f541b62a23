use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SCORING_TIMEOUT_SECS,
    DEFAULT_SCORING_URL,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Scoring service configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ScoringFileConfig {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub scoring: Option<ScoringFileConfig>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(scoring) = other.scoring {
            let current = self.scoring.get_or_insert_with(ScoringFileConfig::default);
            if scoring.url.is_some() {
                tracing::trace!(url = ?scoring.url, "Merging scoring.url");
                current.url = scoring.url;
            }
            if scoring.timeout_secs.is_some() {
                tracing::trace!(timeout_secs = ?scoring.timeout_secs, "Merging scoring.timeout_secs");
                current.timeout_secs = scoring.timeout_secs;
            }
        }

        if other.debug.is_some() {
            tracing::trace!(debug = ?other.debug, "Merging debug");
            self.debug = other.debug;
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// ML scoring service configuration
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Base URL of the external scoring service
    pub url: String,
    /// Request timeout for model runs (seconds)
    pub timeout_secs: u64,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub scoring: ScoringConfig,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.pricepulse/pricepulse.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Load from profile dir (~/.pricepulse/pricepulse.json) - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        // 3. Extract file config values with defaults
        let file_server = file_config.server.unwrap_or_default();
        let file_scoring = file_config.scoring.unwrap_or_default();

        // 4. Layer configs: defaults -> file config -> CLI/env overrides
        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let scoring_url = cli
            .scoring_url
            .clone()
            .or(file_scoring.url)
            .unwrap_or_else(|| DEFAULT_SCORING_URL.to_string());

        let scoring_timeout_secs = cli
            .scoring_timeout_secs
            .or(file_scoring.timeout_secs)
            .unwrap_or(DEFAULT_SCORING_TIMEOUT_SECS);

        let debug = file_config.debug.unwrap_or(false);

        let config = Self {
            server: ServerConfig { host, port },
            scoring: ScoringConfig {
                url: scoring_url.trim_end_matches('/').to_string(),
                timeout_secs: scoring_timeout_secs,
            },
            debug,
        };

        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            scoring_url = %config.scoring.url,
            scoring_timeout_secs = config.scoring.timeout_secs,
            debug = config.debug,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port 0 would cause a bind failure
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        if self.scoring.url.is_empty() {
            anyhow::bail!("Configuration error: scoring.url must not be empty");
        }

        if self.scoring.timeout_secs == 0 {
            anyhow::bail!("Configuration error: scoring.timeout_secs must be greater than 0");
        }

        Ok(())
    }
}

/// Check if a host string means "bind all interfaces"
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

/// Path to the profile config file (~/.pricepulse/pricepulse.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(super::constants::APP_DOT_FOLDER)
            .join(CONFIG_FILE_NAME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overlay_wins() {
        let mut base = FileConfig {
            server: Some(ServerFileConfig {
                host: Some("0.0.0.0".to_string()),
                port: Some(8000),
            }),
            ..Default::default()
        };
        let overlay = FileConfig {
            server: Some(ServerFileConfig {
                host: None,
                port: Some(9000),
            }),
            ..Default::default()
        };

        base.merge(overlay);

        let server = base.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(server.port, Some(9000));
    }

    #[test]
    fn test_merge_scoring_section() {
        let mut base = FileConfig::default();
        let overlay = FileConfig {
            scoring: Some(ScoringFileConfig {
                url: Some("http://localhost:9999".to_string()),
                timeout_secs: None,
            }),
            ..Default::default()
        };

        base.merge(overlay);

        let scoring = base.scoring.unwrap();
        assert_eq!(scoring.url.as_deref(), Some("http://localhost:9999"));
        assert_eq!(scoring.timeout_secs, None);
    }

    #[test]
    fn test_load_defaults() {
        let cli = CliConfig::default();
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.scoring.timeout_secs, DEFAULT_SCORING_TIMEOUT_SECS);
        assert!(!config.debug);
    }

    #[test]
    fn test_load_cli_overrides() {
        let cli = CliConfig {
            host: Some("0.0.0.0".to_string()),
            port: Some(9999),
            scoring_url: Some("http://scoring.internal/".to_string()),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9999);
        // Trailing slash is normalized away
        assert_eq!(config.scoring.url, "http://scoring.internal");
    }

    #[test]
    fn test_validate_rejects_port_zero() {
        let cli = CliConfig {
            port: Some(0),
            ..Default::default()
        };
        assert!(AppConfig::load(&cli).is_err());
    }

    #[test]
    fn test_parse_file_config() {
        let json = r#"{
            "server": {"host": "127.0.0.1", "port": 5480},
            "scoring": {"timeout_secs": 60},
            "debug": true
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.server.as_ref().unwrap().port, Some(5480));
        assert_eq!(config.scoring.as_ref().unwrap().timeout_secs, Some(60));
        assert_eq!(config.debug, Some(true));
    }

    #[test]
    fn test_unknown_fields_collected() {
        let json = r#"{"server": {}, "tracing": {"enabled": true}}"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        if let serde_json::Value::Object(map) = &config.extra {
            assert!(map.contains_key("tracing"));
        } else {
            panic!("extra should be an object");
        }
    }
}
