//! Detection of server-initiated session invalidation
//!
//! The backend has no structured error code for "this session was replaced".
//! It answers 401 with a free-text detail such as `Logged in on another
//! device`, so detection is a case-insensitive substring match on the body.

use reqwest::StatusCode;

/// Body fragments that mark a 401 as a forced logout
pub const FORCED_LOGOUT_MARKERS: [&str; 4] = [
    "another device",
    "force logout",
    "logged out",
    "session invalidated",
];

/// Notice shown to the user when the session is force-closed
pub const FORCED_LOGOUT_NOTICE: &str =
    "You have been logged out by the server. Please log in again.";

/// Notice for a session taken over by a login elsewhere
pub const ANOTHER_DEVICE_NOTICE: &str =
    "You have been logged out because your account was signed in on another device.";

/// Status 401 and a body carrying one of [`FORCED_LOGOUT_MARKERS`]
pub fn is_forced_logout(status: StatusCode, body: &str) -> bool {
    status == StatusCode::UNAUTHORIZED && matched_marker(body).is_some()
}

/// The first marker found in `body`, ignoring case
pub fn matched_marker(body: &str) -> Option<&'static str> {
    let body = body.to_lowercase();
    FORCED_LOGOUT_MARKERS
        .into_iter()
        .find(|marker| body.contains(marker))
}

/// User-facing notice matching the marker found in `body`
pub fn notice_for(body: &str) -> &'static str {
    match matched_marker(body) {
        Some("another device") => ANOTHER_DEVICE_NOTICE,
        _ => FORCED_LOGOUT_NOTICE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_detail_is_detected() {
        assert!(is_forced_logout(
            StatusCode::UNAUTHORIZED,
            r#"{"detail":"Logged in on another device"}"#
        ));
    }

    #[test]
    fn test_every_marker_case_insensitive() {
        for marker in FORCED_LOGOUT_MARKERS {
            let body = format!("Error: {}", marker.to_uppercase());
            assert!(is_forced_logout(StatusCode::UNAUTHORIZED, &body), "{marker}");
        }
    }

    #[test]
    fn test_requires_401() {
        assert!(!is_forced_logout(
            StatusCode::FORBIDDEN,
            "logged out: another device"
        ));
        assert!(!is_forced_logout(StatusCode::OK, "logged out"));
    }

    #[test]
    fn test_plain_expiry_is_not_forced() {
        assert!(!is_forced_logout(
            StatusCode::UNAUTHORIZED,
            r#"{"detail":"Token expired"}"#
        ));
        assert!(!is_forced_logout(StatusCode::UNAUTHORIZED, ""));
    }

    #[test]
    fn test_matched_marker_reports_first_hit() {
        assert_eq!(
            matched_marker("logged out: another device"),
            Some("another device")
        );
        assert_eq!(matched_marker("Session Invalidated"), Some("session invalidated"));
    }

    #[test]
    fn test_notice_follows_marker() {
        assert_eq!(
            notice_for(r#"{"detail":"Logged in on another device"}"#),
            ANOTHER_DEVICE_NOTICE
        );
        assert_eq!(notice_for("Session invalidated by admin"), FORCED_LOGOUT_NOTICE);
        assert_eq!(notice_for("force logout"), FORCED_LOGOUT_NOTICE);
        assert!(!FORCED_LOGOUT_NOTICE.contains("another device"));
    }
}
