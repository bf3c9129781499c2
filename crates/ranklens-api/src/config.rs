//! Server configuration.
//!
//! Values come from an optional `ranklens.toml` next to the binary plus
//! `RANKLENS_*` environment overrides (nested keys use `__`, e.g.
//! `RANKLENS_PROVIDER__LOGIN`).

use ranklens_core::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database_url: String,
    #[serde(default)]
    pub provider: ProviderSettings,
}

/// Credentials and endpoint for the SEO data provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            login: String::new(),
            password: String::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_provider_base_url() -> String {
    "https://api.dataforseo.com".to_string()
}

impl ServerConfig {
    /// Load configuration from file and environment.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("ranklens").required(false))
            .add_source(config::Environment::with_prefix("RANKLENS").separator("__"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: ServerConfig = serde_json::from_value(serde_json::json!({
            "database_url": "postgres://localhost/ranklens"
        }))
        .unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.provider.base_url, "https://api.dataforseo.com");
        assert!(config.provider.login.is_empty());
    }
}
