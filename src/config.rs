//! Configuration management
//!
//! Loads server configuration from an optional `config.toml` with
//! environment overrides. All values are fixed at startup; nothing in
//! the core mutates configuration after load.

use config::{Config, ConfigError, Environment, File};
use log::warn;
use serde::Deserialize;
use std::path::PathBuf;

/// Server configuration, immutable after startup
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the HTTP listener
    pub bind_address: String,

    /// Port for the HTTP listener
    pub port: u16,

    /// Root directory all buckets live under; every resolved path must
    /// stay inside it
    pub storage_root: PathBuf,

    /// Shared secret for the explicit-path retrieval endpoint
    /// Environment: DAYDROP_API_KEY
    pub api_key: String,

    /// Maximum accepted upload size in MB
    pub max_file_size_mb: u64,
}

impl ServerConfig {
    /// Load configuration from config.toml (optional) with DAYDROP_*
    /// environment overrides on top of built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("bind_address", "0.0.0.0")?
            .set_default("port", 5000)?
            .set_default("storage_root", "./data")?
            .set_default("api_key", "")?
            .set_default("max_file_size_mb", 50)?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("DAYDROP"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("Port cannot be 0".into()));
        }

        if self.storage_root.as_os_str().is_empty() {
            return Err(ConfigError::Message("storage_root cannot be empty".into()));
        }

        if self.max_file_size_mb == 0 {
            return Err(ConfigError::Message(
                "max_file_size_mb must be at least 1".into(),
            ));
        }

        // An empty secret is a misconfiguration, not "no auth required":
        // the guarded endpoint still compares keys and will reject any
        // non-empty presented key.
        if self.api_key.is_empty() {
            warn!("DAYDROP_API_KEY is not set; explicit-path retrieval is effectively locked");
        }

        Ok(())
    }

    /// Socket address string for the listener bind
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Maximum accepted upload size in bytes
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ServerConfig {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            port: 5000,
            storage_root: PathBuf::from("./data"),
            api_key: "secret".to_string(),
            max_file_size_mb: 50,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
        assert_eq!(base_config().socket_addr(), "127.0.0.1:5000");
        assert_eq!(base_config().max_upload_bytes(), 50 * 1024 * 1024);
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut config = base_config();
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_storage_root_is_rejected() {
        let mut config = base_config();
        config.storage_root = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_size_limit_is_rejected() {
        let mut config = base_config();
        config.max_file_size_mb = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_api_key_is_accepted_with_warning() {
        let mut config = base_config();
        config.api_key = String::new();
        assert!(config.validate().is_ok());
    }
}
