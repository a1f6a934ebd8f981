//! Device identification policy

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform tag sent when registering a device from this client
pub const DEFAULT_PLATFORM: &str = "web";

/// Prefix of client-synthesized device ids
pub const GENERATED_PREFIX: &str = "web-";

/// Identifies this client instance to the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceToken(String);

impl DeviceToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Synthesize a fresh id for a client the backend has not named
    pub fn generate() -> Self {
        Self(format!("{GENERATED_PREFIX}{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_generated(&self) -> bool {
        self.0.starts_with(GENERATED_PREFIX)
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DeviceToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Pick the device token for a fresh login.
///
/// A value issued by the server wins. Otherwise an already stored token is
/// kept so the device stays stable across logins, and only a client with
/// neither gets a generated one.
pub fn resolve_device_token(server_value: Option<&str>, stored_value: Option<&str>) -> DeviceToken {
    fn non_blank(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    if let Some(value) = non_blank(server_value) {
        return DeviceToken::new(value);
    }
    if let Some(value) = non_blank(stored_value) {
        return DeviceToken::new(value);
    }
    DeviceToken::generate()
}
