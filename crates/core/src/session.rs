//! Session entities kept in durable client-side storage

use serde::{Deserialize, Serialize};
use std::fmt;

/// Keys of the entities a signed-in session persists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKey {
    AccessToken,
    RefreshToken,
    UserId,
    Role,
    University,
    DeviceToken,
}

impl SessionKey {
    /// Every entity, in the order they are reported
    pub const ALL: [Self; 6] = [
        Self::AccessToken,
        Self::RefreshToken,
        Self::UserId,
        Self::Role,
        Self::University,
        Self::DeviceToken,
    ];

    /// Storage key name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
            Self::UserId => "user_id",
            Self::Role => "role",
            Self::University => "university",
            Self::DeviceToken => "device_token",
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access and refresh credentials. Always written and cleared together.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens never end up in logs.
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Point-in-time view of every stored session entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_id: Option<String>,
    pub role: Option<String>,
    pub university: Option<String>,
    pub device_token: Option<String>,
}

impl SessionSnapshot {
    /// Whether an access credential is present
    pub const fn is_signed_in(&self) -> bool {
        self.access_token.is_some()
    }

    /// Whether nothing at all is stored
    pub const fn is_empty(&self) -> bool {
        self.access_token.is_none()
            && self.refresh_token.is_none()
            && self.user_id.is_none()
            && self.role.is_none()
            && self.university.is_none()
            && self.device_token.is_none()
    }

    pub(crate) fn slot_mut(&mut self, key: SessionKey) -> &mut Option<String> {
        match key {
            SessionKey::AccessToken => &mut self.access_token,
            SessionKey::RefreshToken => &mut self.refresh_token,
            SessionKey::UserId => &mut self.user_id,
            SessionKey::Role => &mut self.role,
            SessionKey::University => &mut self.university,
            SessionKey::DeviceToken => &mut self.device_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_match_serde() {
        for key in SessionKey::ALL {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.as_str()));
        }
    }

    #[test]
    fn test_token_pair_debug_is_redacted() {
        let pair = TokenPair::new("secret-access", "secret-refresh");
        let rendered = format!("{pair:?}");
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_snapshot_state() {
        let mut snapshot = SessionSnapshot::default();
        assert!(snapshot.is_empty());
        assert!(!snapshot.is_signed_in());

        *snapshot.slot_mut(SessionKey::DeviceToken) = Some("web-1".into());
        assert!(!snapshot.is_empty());
        assert!(!snapshot.is_signed_in());

        *snapshot.slot_mut(SessionKey::AccessToken) = Some("a".into());
        assert!(snapshot.is_signed_in());
    }
}
