use crate::constants::{DEFAULT_API_URL, MAX_BATCH_SIZE};
use crate::error::{ListError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const ENV_API_URL: &str = "LIST_VERIFIER_API_URL";
pub const ENV_AUTH_ID: &str = "LIST_VERIFIER_AUTH_ID";
pub const ENV_AUTH_TOKEN: &str = "LIST_VERIFIER_AUTH_TOKEN";
pub const ENV_BATCH_SIZE: &str = "LIST_VERIFIER_BATCH_SIZE";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub auth_id: Option<String>,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Left unset, the transport's own default applies.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default = "default_include_invalid")]
    pub include_invalid: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_batch_size() -> usize {
    MAX_BATCH_SIZE
}

fn default_include_invalid() -> bool {
    true
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            auth_id: None,
            auth_token: None,
            batch_size: default_batch_size(),
            timeout_seconds: None,
            include_invalid: default_include_invalid(),
        }
    }
}

/// Authentication pair sent as query parameters on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub auth_id: String,
    pub auth_token: String,
}

impl Config {
    /// Load configuration from `path` (or `config.toml` when it exists), then
    /// apply environment overrides. A missing default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => {
                debug!("No config file found, using defaults");
                Config::default()
            }
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ListError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(url) = non_empty_var(ENV_API_URL) {
            self.service.api_url = url;
        }
        if let Some(id) = non_empty_var(ENV_AUTH_ID) {
            self.service.auth_id = Some(id);
        }
        if let Some(token) = non_empty_var(ENV_AUTH_TOKEN) {
            self.service.auth_token = Some(token);
        }
        if let Some(size) = non_empty_var(ENV_BATCH_SIZE) {
            self.service.batch_size = size.parse().map_err(|_| {
                ListError::Config(format!("{} must be a positive integer, got '{}'", ENV_BATCH_SIZE, size))
            })?;
        }
        Ok(())
    }
}

impl ServiceConfig {
    /// Batch size clamped to what the service accepts.
    pub fn effective_batch_size(&self) -> usize {
        let clamped = self.batch_size.clamp(1, MAX_BATCH_SIZE);
        if clamped != self.batch_size {
            warn!(
                "Configured batch size {} is outside 1..={}, using {}",
                self.batch_size, MAX_BATCH_SIZE, clamped
            );
        }
        clamped
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    pub fn credentials(&self) -> Result<Credentials> {
        match (&self.auth_id, &self.auth_token) {
            (Some(id), Some(token)) if !id.trim().is_empty() && !token.trim().is_empty() => {
                Ok(Credentials {
                    auth_id: id.clone(),
                    auth_token: token.clone(),
                })
            }
            _ => Err(ListError::Config(format!(
                "Missing service credentials: set auth_id/auth_token in the config file or {} and {}",
                ENV_AUTH_ID, ENV_AUTH_TOKEN
            ))),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_service_table_missing() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.service.api_url, DEFAULT_API_URL);
        assert_eq!(config.service.batch_size, 100);
        assert!(config.service.include_invalid);
        assert!(config.service.timeout().is_none());
    }

    #[test]
    fn test_service_table_parsed() {
        let config = Config::from_toml(
            r#"
            [service]
            api_url = "http://localhost:9000/street-address"
            auth_id = "id"
            auth_token = "token"
            batch_size = 25
            timeout_seconds = 90
            "#,
        )
        .unwrap();

        assert_eq!(config.service.api_url, "http://localhost:9000/street-address");
        assert_eq!(config.service.effective_batch_size(), 25);
        assert_eq!(config.service.timeout(), Some(Duration::from_secs(90)));
        assert_eq!(
            config.service.credentials().unwrap(),
            Credentials {
                auth_id: "id".to_string(),
                auth_token: "token".to_string()
            }
        );
    }

    #[test]
    fn test_batch_size_is_clamped() {
        let mut service = ServiceConfig::default();
        service.batch_size = 500;
        assert_eq!(service.effective_batch_size(), MAX_BATCH_SIZE);
        service.batch_size = 0;
        assert_eq!(service.effective_batch_size(), 1);
    }

    #[test]
    fn test_missing_credentials_is_config_error() {
        let service = ServiceConfig {
            auth_id: Some("id".to_string()),
            auth_token: Some("  ".to_string()),
            ..ServiceConfig::default()
        };
        assert!(matches!(service.credentials(), Err(ListError::Config(_))));
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        assert!(matches!(
            Config::from_toml("[service\nbatch_size = 1"),
            Err(ListError::Toml(_))
        ));
    }
}
