//! Configuration management for the rate limiting service.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::error::{RateLimitServiceError, Result};
use crate::ratelimit::PolicySet;

/// Main configuration for the rate limiting service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server address
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
        }
    }
}

fn default_http_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Path to a policy overrides file
    pub policies_path: Option<String>,

    /// Interval between sweeps of expired entries, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            policies_path: None,
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_sweep_interval() -> u64 {
    60
}

impl RateLimitingConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Load the configured policies, or the built-in presets when no file is set.
    pub fn load_policies(&self) -> Result<PolicySet> {
        match &self.policies_path {
            Some(path) => PolicySet::from_file(path),
            None => Ok(PolicySet::default()),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ServiceConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rate_limiting.sweep_interval_secs == 0 {
            return Err(RateLimitServiceError::Config(
                "sweep_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.http_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.rate_limiting.sweep_interval(), Duration::from_secs(60));
        assert!(config.rate_limiting.policies_path.is_none());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
server:
  http_addr: "0.0.0.0:9000"
"#;
        let config = ServiceConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.http_addr.port(), 9000);
        assert_eq!(config.rate_limiting.sweep_interval_secs, 60);
    }

    #[test]
    fn test_zero_sweep_interval_rejected() {
        let yaml = r#"
rate_limiting:
  sweep_interval_secs: 0
"#;
        assert!(matches!(
            ServiceConfig::from_yaml(yaml),
            Err(RateLimitServiceError::Config(_))
        ));
    }

    #[test]
    fn test_load_policies_from_file() {
        let path = std::env::temp_dir().join(format!("prooflayer-policies-{}.yaml", std::process::id()));
        std::fs::write(&path, "policies:\n  export:\n    max_requests: 2\n    window_seconds: 3600\n").unwrap();

        let config = RateLimitingConfig {
            policies_path: Some(path.display().to_string()),
            ..Default::default()
        };
        let policies = config.load_policies().unwrap();
        assert!(policies.get("export").is_some());
        assert!(policies.get("submissions").is_some());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ServiceConfig::from_file("/nonexistent/prooflayer.yaml");
        assert!(matches!(result, Err(RateLimitServiceError::Io(_))));
    }
}
