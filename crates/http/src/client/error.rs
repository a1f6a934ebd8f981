//! Client error types

use digs_core::CoreError;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// No access credential is stored and none could be obtained by refreshing
    #[error("No access credential available")]
    NoCredential,

    /// The refresh endpoint rejected the refresh credential or was unreachable
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// The server invalidated this session, e.g. after a login on another device
    #[error("Session was logged out: {0}")]
    ForcedLogout(String),

    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A value could not be used as an HTTP header
    #[error("Invalid header value for {0}")]
    InvalidHeader(String),

    /// The session store failed
    #[error("Session storage failed: {0}")]
    Storage(#[from] CoreError),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether the caller should send the user back to the login entry point
    pub const fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::NoCredential | Self::RefreshFailed(_) | Self::ForcedLogout(_)
        )
    }

    /// Transport-level failure (connect, timeout, body read)
    pub const fn is_network_fault(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ClientError::from_status(StatusCode::BAD_REQUEST, "x".into()),
            ClientError::BadRequest(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::UNAUTHORIZED, "x".into()),
            ClientError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::FORBIDDEN, "x".into()),
            ClientError::Forbidden(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::NOT_FOUND, "x".into()),
            ClientError::NotFound(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::BAD_GATEWAY, "x".into()),
            ClientError::ServerError { status: 502, .. }
        ));
    }

    #[test]
    fn test_requires_login() {
        assert!(ClientError::NoCredential.requires_login());
        assert!(ClientError::ForcedLogout("another device".into()).requires_login());
        assert!(ClientError::RefreshFailed("401".into()).requires_login());
        assert!(!ClientError::NotFound("listing".into()).requires_login());
    }
}
