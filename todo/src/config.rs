//! Configuration loaded from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// How much longer the page waits than a single HTTP request may take
pub const PAGE_TIMEOUT_MARGIN: Duration = Duration::from_secs(2);

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Remote task service configuration
    pub api: ApiConfig,
    /// Credentials used to pre-fill the sign-in form
    pub credentials: CredentialsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Remote task service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the service (default: `http://localhost:3000`)
    pub url: String,
    /// Per-request timeout in seconds (default: 10)
    pub request_timeout_secs: u64,
}

/// Sign-in credentials
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Username
    pub username: Option<String>,
    /// Password
    pub password: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive (default: `info,tidy=debug`)
    pub filter: String,
}

impl Config {
    /// Load configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api: ApiConfig {
                url: lookup("TIDY_API_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
                request_timeout_secs: lookup("TIDY_REQUEST_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            },
            credentials: CredentialsConfig {
                username: lookup("TIDY_USERNAME").filter(|s| !s.is_empty()),
                password: lookup("TIDY_PASSWORD").filter(|s| !s.is_empty()),
            },
            logging: LoggingConfig {
                filter: lookup("RUST_LOG").unwrap_or_else(|| "info,tidy=debug".to_string()),
            },
        }
    }

    /// Request timeout as a [`Duration`]
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    /// How long a page operation waits for its answer
    ///
    /// Exceeds [`request_timeout`](Self::request_timeout) so a slow server
    /// surfaces as the client's timeout error rather than the page's.
    #[must_use]
    pub fn page_timeout(&self) -> Duration {
        self.request_timeout() + PAGE_TIMEOUT_MARGIN
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
