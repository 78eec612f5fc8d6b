//! Process configuration from command-line flags and environment variables.

use std::time::Duration;

use clap::Args;

use crate::fetch::DEFAULT_FEED_URL;
use crate::processor::DEFAULT_CACHE_TTL;

/// Service configuration.
///
/// Every flag can also be set through the environment variable named next to
/// it. Flags win over the environment.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Port to run the server on
    #[arg(long, env = "SERVER_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Authentication token for API requests (leave empty to disable auth)
    #[arg(long, env = "AUTH_TOKEN", default_value = "", hide_env_values = true)]
    pub auth_token: String,

    /// Duration to cache IP data (e.g. 1h, 90m, 24h)
    #[arg(long, env = "CACHE_DURATION", default_value = "1h")]
    pub cache_duration: String,

    /// Allocation feed URL
    #[arg(long, env = "FEED_URL", default_value = DEFAULT_FEED_URL)]
    pub feed_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: String::new(),
            cache_duration: "1h".to_string(),
            feed_url: DEFAULT_FEED_URL.to_string(),
        }
    }
}

impl Config {
    /// Parsed cache TTL, one hour when `cache_duration` does not parse.
    pub fn cache_ttl(&self) -> Duration {
        match humantime::parse_duration(self.cache_duration.trim()) {
            Ok(ttl) => ttl,
            Err(e) => {
                log::warn!(
                    "Invalid cache duration {:?} ({}), using {:?}",
                    self.cache_duration,
                    e,
                    DEFAULT_CACHE_TTL
                );
                DEFAULT_CACHE_TTL
            }
        }
    }

    /// Configured auth token, `None` when authentication is disabled.
    pub fn auth_token(&self) -> Option<&str> {
        Some(self.auth_token.as_str()).filter(|token| !token.is_empty())
    }
}
