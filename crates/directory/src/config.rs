//! Directory client configuration.

use crate::error::{DirectoryError, Result};

/// Base URL used when `APIGATE_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const API_URL_VAR: &str = "APIGATE_API_URL";
const TIMEOUT_VAR: &str = "APIGATE_HTTP_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    /// Base URL of the dashboard API, without a trailing slash
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl DirectoryConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_url(base_url),
            ..Self::default()
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Read the configuration from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(API_URL_VAR)
            .map(|v| normalize_url(&v))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs = match lookup(TIMEOUT_VAR).map(|v| v.trim().to_string()) {
            Some(raw) if !raw.is_empty() => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(DirectoryError::invalid_request(format!(
                        "{} must be a positive number of seconds, got '{}'",
                        TIMEOUT_VAR, raw
                    )))
                }
            },
            _ => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url,
            timeout_secs,
        })
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
