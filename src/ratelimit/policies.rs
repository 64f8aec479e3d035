//! Rate limit configurations and named policy presets.
//!
//! Each endpoint class uses one named policy. The four built-in presets can be
//! overridden or extended from a YAML file:
//!
//! ```yaml
//! policies:
//!   submissions:
//!     max_requests: 20
//!     window_seconds: 60
//!   export:
//!     max_requests: 2
//!     window_seconds: 3600
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::{RateLimitServiceError, Result};

/// Limit and window length for one class of requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum requests allowed per window
    pub max_requests: u64,
    /// Window length in seconds
    pub window_seconds: u64,
}

impl RateLimitConfig {
    pub const fn new(max_requests: u64, window_seconds: u64) -> Self {
        Self {
            max_requests,
            window_seconds,
        }
    }

    /// Window length as a duration.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    /// Window length in milliseconds.
    pub fn window_millis(&self) -> i64 {
        (self.window_seconds as i64).saturating_mul(1000)
    }

    /// Reject zero limits or windows.
    ///
    /// `RateLimiter::check` does not call this; it is applied when policies
    /// are loaded from configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_requests == 0 {
            return Err(RateLimitServiceError::Config(
                "max_requests must be positive".to_string(),
            ));
        }
        if self.window_seconds == 0 {
            return Err(RateLimitServiceError::Config(
                "window_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Built-in endpoint classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Public testimonial and form submissions
    Submissions,
    /// Authentication flows
    Auth,
    /// General API traffic
    Api,
    /// Sensitive one-off actions such as checkout, concierge intake and login
    Strict,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Submissions, Preset::Auth, Preset::Api, Preset::Strict];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Submissions => "submissions",
            Preset::Auth => "auth",
            Preset::Api => "api",
            Preset::Strict => "strict",
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        match self {
            Preset::Submissions => RateLimitConfig::new(10, 60),
            Preset::Auth => RateLimitConfig::new(5, 60),
            Preset::Api => RateLimitConfig::new(60, 60),
            Preset::Strict => RateLimitConfig::new(3, 60),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = RateLimitServiceError;

    fn from_str(s: &str) -> Result<Self> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| RateLimitServiceError::Config(format!("unknown preset: {}", s)))
    }
}

/// Named policies available to request handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySet {
    /// Map of policy name to configuration
    #[serde(default)]
    pub policies: BTreeMap<String, RateLimitConfig>,
}

impl Default for PolicySet {
    fn default() -> Self {
        let policies = Preset::ALL
            .into_iter()
            .map(|preset| (preset.name().to_string(), preset.config()))
            .collect();
        Self { policies }
    }
}

impl PolicySet {
    /// A set with no policies at all.
    pub fn empty() -> Self {
        Self {
            policies: BTreeMap::new(),
        }
    }

    /// Load overrides from a YAML file, merged over the built-in presets.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading rate limit policies");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load overrides from a YAML string, merged over the built-in presets.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let overrides: PolicySet = serde_yaml::from_str(yaml).map_err(|e| {
            RateLimitServiceError::Config(format!("Failed to parse rate limit policies: {}", e))
        })?;

        let mut set = PolicySet::default();
        for (name, config) in overrides.policies {
            config
                .validate()
                .map_err(|e| RateLimitServiceError::Config(format!("policy {}: {}", name, e)))?;
            set.insert(name, config);
        }
        Ok(set)
    }

    pub fn get(&self, name: &str) -> Option<&RateLimitConfig> {
        self.policies.get(name)
    }

    /// Add or replace a policy.
    pub fn insert(&mut self, name: impl Into<String>, config: RateLimitConfig) {
        self.policies.insert(name.into(), config);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }
}
