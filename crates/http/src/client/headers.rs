//! Standard headers for authenticated requests

use super::ClientError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

/// Static service identification key header
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Device identification header
pub const DEVICE_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-device-token");

/// Credentials that go into one request's headers
#[derive(Debug, Clone, Copy)]
pub struct HeaderInputs<'a> {
    pub api_key: &'a str,
    pub access_token: Option<&'a str>,
    pub device_token: Option<&'a str>,
    pub json_body: bool,
}

/// Build the header set for an authenticated request.
///
/// Fails with [`ClientError::NoCredential`] when no access token is present.
pub fn build_headers(inputs: HeaderInputs<'_>) -> Result<HeaderMap, ClientError> {
    let access_token = inputs
        .access_token
        .filter(|token| !token.is_empty())
        .ok_or(ClientError::NoCredential)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        sensitive_value("authorization", &format!("Bearer {access_token}"))?,
    );
    headers.insert(API_KEY_HEADER, sensitive_value("x-api-key", inputs.api_key)?);

    if inputs.json_body {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    if let Some(device) = inputs.device_token.filter(|token| !token.is_empty()) {
        headers.insert(DEVICE_TOKEN_HEADER, header_value("x-device-token", device)?);
    }

    Ok(headers)
}

/// Headers for unauthenticated calls (login, refresh, ping)
pub fn public_headers(api_key: &str) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(API_KEY_HEADER, sensitive_value("x-api-key", api_key)?);
    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ClientError> {
    HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader(name.to_string()))
}

fn sensitive_value(name: &str, value: &str) -> Result<HeaderValue, ClientError> {
    let mut value = header_value(name, value)?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(device_token: Option<&str>) -> HeaderInputs<'_> {
        HeaderInputs {
            api_key: "svc-key",
            access_token: Some("access-1"),
            device_token,
            json_body: true,
        }
    }

    #[test]
    fn test_standard_headers() {
        let headers = build_headers(inputs(None)).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer access-1");
        assert_eq!(headers[API_KEY_HEADER], "svc-key");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_device_header_only_when_stored() {
        let without = build_headers(inputs(None)).unwrap();
        assert!(without.get(DEVICE_TOKEN_HEADER).is_none());

        let blank = build_headers(inputs(Some(""))).unwrap();
        assert!(blank.get(DEVICE_TOKEN_HEADER).is_none());

        let with = build_headers(inputs(Some("web-42"))).unwrap();
        assert_eq!(with[DEVICE_TOKEN_HEADER], "web-42");
    }

    #[test]
    fn test_no_content_type_without_body() {
        let headers = build_headers(HeaderInputs {
            json_body: false,
            ..inputs(None)
        })
        .unwrap();
        assert!(headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_missing_access_token() {
        let result = build_headers(HeaderInputs {
            access_token: None,
            ..inputs(Some("web-42"))
        });
        assert!(matches!(result, Err(ClientError::NoCredential)));

        let result = build_headers(HeaderInputs {
            access_token: Some(""),
            ..inputs(None)
        });
        assert!(matches!(result, Err(ClientError::NoCredential)));
    }

    #[test]
    fn test_invalid_header_value() {
        let result = build_headers(HeaderInputs {
            device_token: Some("bad\nvalue"),
            ..inputs(None)
        });
        assert!(matches!(result, Err(ClientError::InvalidHeader(name)) if name == "x-device-token"));
    }

    #[test]
    fn test_public_headers_carry_only_service_key() {
        let headers = public_headers("svc-key").unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[API_KEY_HEADER], "svc-key");
    }
}
