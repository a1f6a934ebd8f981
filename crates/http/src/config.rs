//! Session client configuration

use digs_core::DEFAULT_PLATFORM;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Settings the [`SessionClient`](crate::client::SessionClient) is built from
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend base URL; request paths are resolved against it
    pub base_url: String,

    /// Static service identification key sent as `X-API-Key`
    pub api_key: String,

    /// Request timeout in seconds (0 disables the client-side timeout)
    pub timeout_secs: u64,

    /// User agent override
    pub user_agent: Option<String>,

    /// Platform tag used when registering this device
    pub platform: String,
}

impl ClientConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            user_agent: None,
            platform: DEFAULT_PLATFORM.to_string(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("platform", &self.platform)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.platform, "web");
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_timeout_disables() {
        let config = ClientConfig {
            timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"api_key": "svc", "base_url": "https://api.digs.africa"}"#)
                .unwrap();
        assert_eq!(config.api_key, "svc");
        assert_eq!(config.timeout_secs, 30);
        assert!(!format!("{config:?}").contains("\"svc\""));
    }
}
