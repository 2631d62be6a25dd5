//! Client configuration with sensible defaults.
//!
//! [`ClientConfig`] captures everything the HTTP collaborators need: the two
//! endpoint URLs, the ordered credential list, and the request timeout.
//! Defaults point at the hosted API; [`ClientConfig::from_env`] overlays
//! values from the environment for headless use.

use std::time::Duration;

/// Default chat completions endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.a4f.co/v1/chat/completions";

/// Default image generation endpoint.
pub const DEFAULT_IMAGES_BASE: &str = "https://api.a4f.co/v1/images/generate";

/// Default per-request timeout in seconds. A hung connection surfaces as a
/// transport failure after this long instead of stalling the session.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the chat and image HTTP clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Chat completions endpoint URL.
    pub api_base: String,
    /// Image generation endpoint URL.
    pub images_base: String,
    /// API credentials, tried in order on each chat request. Empty means
    /// every request fails fast with a configuration error.
    pub api_keys: Vec<String>,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            images_base: DEFAULT_IMAGES_BASE.to_string(),
            api_keys: Vec::new(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Build a config from the environment.
    ///
    /// Reads `CONFAB_API_KEYS` (comma-separated, in fallback order),
    /// `CONFAB_API_BASE`, and `CONFAB_IMAGES_BASE`. Unset variables keep
    /// their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(keys) = std::env::var("CONFAB_API_KEYS") {
            config.api_keys = parse_key_list(&keys);
        }
        if let Ok(base) = std::env::var("CONFAB_API_BASE") {
            config.api_base = base;
        }
        if let Ok(base) = std::env::var("CONFAB_IMAGES_BASE") {
            config.images_base = base;
        }
        config
    }

    /// Replace the credential list.
    pub fn with_api_keys(mut self, keys: Vec<String>) -> Self {
        self.api_keys = keys;
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Split a comma-separated credential list, dropping empty entries.
fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}
