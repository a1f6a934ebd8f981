//! Request and response bodies of the backend's auth endpoints

use digs_core::TokenPair;
use serde::{Deserialize, Serialize};

/// Username/password pair submitted to the login form
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Students and union members log in under a university; landlords omit it
    #[serde(skip)]
    pub university: Option<String>,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            university: None,
        }
    }

    #[must_use]
    pub fn university(mut self, university: impl Into<String>) -> Self {
        self.university = Some(university.into());
        self
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("university", &self.university)
            .finish()
    }
}

/// `POST /users/login` response
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub role: String,
    pub user_id: String,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub device_token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl LoginResponse {
    pub fn token_pair(&self) -> TokenPair {
        TokenPair::new(&self.access_token, &self.refresh_token)
    }
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("role", &self.role)
            .field("user_id", &self.user_id)
            .field("university", &self.university)
            .field("device_token", &self.device_token)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// `POST /users/auth/refresh` form body
#[derive(Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// `POST /users/auth/refresh` response
#[derive(Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl From<RefreshResponse> for TokenPair {
    fn from(response: RefreshResponse) -> Self {
        Self::new(response.access_token, response.refresh_token)
    }
}

/// `POST /users/logout` form body
#[derive(Serialize)]
pub(crate) struct LogoutRequest<'a> {
    pub refresh_token: &'a str,
}

/// `POST /device/register` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRegisterRequest {
    pub university: String,
    pub user_id: String,
    pub role: String,
    pub device_token: String,
    pub platform: String,
}

/// `POST /device/register` response
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceRegisterResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// What a successful login left in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user_id: String,
    pub role: String,
    pub university: Option<String>,
    pub device_token: String,
    pub message: Option<String>,
    /// Whether `/device/register` accepted this device
    pub device_registered: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_response_optional_fields() {
        let response: LoginResponse = serde_json::from_value(json!({
            "access_token": "a",
            "refresh_token": "r",
            "token_type": "bearer",
            "message": "Logged in as landlord",
            "role": "landlord",
            "user_id": "LL1",
            "university": null
        }))
        .unwrap();

        assert_eq!(response.university, None);
        assert_eq!(response.device_token, None);
        assert_eq!(response.token_pair(), TokenPair::new("a", "r"));
    }

    #[test]
    fn test_login_request_form_skips_university() {
        let request = LoginRequest::new("jane@uni.zm", "pw").university("UNZA");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({"username": "jane@uni.zm", "password": "pw"}));
    }

    #[test]
    fn test_secrets_not_in_debug() {
        let request = LoginRequest::new("jane@uni.zm", "hunter2");
        assert!(!format!("{request:?}").contains("hunter2"));
    }
}
