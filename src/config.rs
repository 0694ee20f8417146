use chrono::TimeDelta;
use clap::{Args, ValueEnum};
use thiserror::Error;

use crate::cooldown::duration::parse_duration;
use crate::cooldown::error::DurationError;

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_UPSTREAM_PROXY: &str = "https://proxy.golang.org";

/// Default number of (module, version) entries kept in memory
pub const DEFAULT_CACHE_SIZE: usize = 10_000;

pub const DEFAULT_COOLDOWN: &str = "7d";

// =============================================================================
// Upstream-related constants
// =============================================================================

/// Timeout for each outbound request to the upstream proxy in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// Maximum number of `.info` lookups in flight while filtering a single version list
pub const FETCH_CONCURRENCY: usize = 8;

pub const USER_AGENT: &str = concat!("go-cooldown/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid default cooldown {value:?}: {source}")]
    InvalidCooldown {
        value: String,
        #[source]
        source: DurationError,
    },

    #[error("cache size must be greater than zero")]
    ZeroCacheSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Command line and environment settings, as given by the operator
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Base URL of the Go module proxy to mirror
    #[arg(long, env = "UPSTREAM_PROXY", default_value = DEFAULT_UPSTREAM_PROXY)]
    pub upstream_proxy: String,

    /// Maximum number of version metadata entries to keep in memory
    #[arg(long, env = "CACHE_SIZE", default_value_t = DEFAULT_CACHE_SIZE)]
    pub cache_size: usize,

    /// Cooldown applied when the request path carries no duration prefix (e.g. 7d, 2M, 36h)
    #[arg(long, env = "DEFAULT_COOLDOWN", default_value = DEFAULT_COOLDOWN)]
    pub default_cooldown: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Settings {
    /// Validates the raw settings into the configuration used by the proxy
    pub fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let default_cooldown = parse_duration(&self.default_cooldown).map_err(|source| {
            ConfigError::InvalidCooldown {
                value: self.default_cooldown.clone(),
                source,
            }
        })?;

        if self.cache_size == 0 {
            return Err(ConfigError::ZeroCacheSize);
        }

        Ok(ProxyConfig {
            port: self.port,
            upstream: self.upstream_proxy.trim_end_matches('/').to_string(),
            cache_size: self.cache_size,
            default_cooldown,
        })
    }
}

/// Validated proxy configuration, built once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyConfig {
    pub port: u16,
    /// Upstream base URL without a trailing slash
    pub upstream: String,
    pub cache_size: usize,
    pub default_cooldown: TimeDelta,
}

impl ProxyConfig {
    pub fn new(upstream: &str, default_cooldown: TimeDelta) -> Self {
        Self {
            port: DEFAULT_PORT,
            upstream: upstream.trim_end_matches('/').to_string(),
            cache_size: DEFAULT_CACHE_SIZE,
            default_cooldown,
        }
    }
}
