//! Buffered responses returned by the session client

use super::{ClientError, forced_logout};
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

/// How the returned response was arrived at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// First response, returned as received
    Direct,
    /// Response to the single retry issued after a successful refresh
    Retried,
    /// Original 401 returned because the refresh attempt failed
    RefreshFailed,
    /// Original 401 returned after the server invalidated the session
    ForcedLogout,
}

/// A fully read HTTP response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    disposition: Disposition,
}

impl ApiResponse {
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self, ClientError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Self {
            status,
            headers,
            body,
            disposition: Disposition::Direct,
        })
    }

    pub(crate) fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = disposition;
        self
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    pub const fn disposition(&self) -> Disposition {
        self.disposition
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as text, lossily decoded
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the body regardless of status
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// 401 whose body carries a forced-logout marker
    pub fn is_forced_logout(&self) -> bool {
        forced_logout::is_forced_logout(self.status, &self.text())
    }

    /// Turn a non-2xx response into the matching error
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.status.is_success() {
            return Ok(self);
        }

        let message = error_message(&self.body).unwrap_or_else(|| self.status.to_string());
        Err(match self.disposition {
            Disposition::ForcedLogout => ClientError::ForcedLogout(message),
            Disposition::RefreshFailed => ClientError::RefreshFailed(message),
            Disposition::Direct | Disposition::Retried => {
                ClientError::from_status(self.status, message)
            }
        })
    }

    /// Fail on non-2xx, then deserialize
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        self.error_for_status()?.json()
    }
}

/// Prefer the backend's `detail` field, fall back to the raw text
fn error_message(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    let detail = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail").and_then(|d| d.as_str()).map(str::to_owned));
    Some(detail.unwrap_or_else(|| String::from_utf8_lossy(body).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str, disposition: Disposition) -> ApiResponse {
        ApiResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::from(body.to_owned()),
            disposition,
        }
    }

    #[test]
    fn test_success_passes_through() {
        let ok = response(200, r#"{"ok":true}"#, Disposition::Retried);
        let value: serde_json::Value = ok.into_json().unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[test]
    fn test_forced_logout_error_uses_detail() {
        let resp = response(
            401,
            r#"{"detail":"Logged in on another device"}"#,
            Disposition::ForcedLogout,
        );
        assert!(resp.is_forced_logout());
        match resp.error_for_status() {
            Err(ClientError::ForcedLogout(message)) => {
                assert_eq!(message, "Logged in on another device");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_refresh_failed_error() {
        let resp = response(401, "Token expired", Disposition::RefreshFailed);
        assert!(matches!(
            resp.error_for_status(),
            Err(ClientError::RefreshFailed(m)) if m == "Token expired"
        ));
    }

    #[test]
    fn test_plain_status_mapping() {
        let resp = response(404, "", Disposition::Direct);
        assert!(matches!(
            resp.error_for_status(),
            Err(ClientError::NotFound(m)) if m == "404 Not Found"
        ));
    }
}
