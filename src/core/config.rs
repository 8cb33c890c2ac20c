/*!
 * Configuration
 * Startup configuration surface: guard list, cache TTL, cache namespace
 */

use crate::core::types::GuardName;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use std::time::Duration;

/// Default cache TTL: 24 hours
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default cache key namespace
pub const DEFAULT_CACHE_KEY_PREFIX: &str = "rolegate.capabilities";

/// Per-guard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GuardConfig {
    /// Guard name (e.g. `web`, `api`)
    pub name: GuardName,
    /// Whether this guard uses roles
    #[serde(default = "default_true")]
    pub roles: bool,
    /// Whether this guard uses permissions
    #[serde(default = "default_true")]
    pub permissions: bool,
}

impl GuardConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: true,
            permissions: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_guards() -> Vec<GuardConfig> {
    vec![GuardConfig::new("web"), GuardConfig::new("api")]
}

fn default_cache_ttl() -> Duration {
    DEFAULT_CACHE_TTL
}

fn default_cache_key_prefix() -> String {
    DEFAULT_CACHE_KEY_PREFIX.to_string()
}

/// Authorization core configuration, consumed once at startup
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuthzConfig {
    /// Known guards
    #[serde(default = "default_guards")]
    pub guards: Vec<GuardConfig>,
    /// Snapshot time-to-live
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: Duration,
    /// Namespace prefix for cache entry keys
    #[serde(default = "default_cache_key_prefix")]
    pub cache_key_prefix: String,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            guards: default_guards(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_key_prefix: DEFAULT_CACHE_KEY_PREFIX.to_string(),
        }
    }
}

impl AuthzConfig {
    /// Load configuration from a JSON document
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Look up a guard's configuration by name
    pub fn guard(&self, name: &str) -> Option<&GuardConfig> {
        self.guards.iter().find(|g| g.name == name)
    }

    /// Override the cache TTL
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Add a guard
    pub fn with_guard(mut self, guard: GuardConfig) -> Self {
        self.guards.push(guard);
        self
    }
}
