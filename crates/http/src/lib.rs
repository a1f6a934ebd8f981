//! Digs HTTP client
//!
//! Session-aware access to the boarding-house backend: login, transparent
//! token refresh, forced-logout detection and device registration.

pub mod client;
pub mod config;
pub mod types;

pub use client::{
    ApiResponse, ClientError, Disposition, NoopObserver, RefreshOutcome, SessionClient,
    SessionClientBuilder, SessionObserver, TracingObserver,
};
pub use config::ClientConfig;
pub use types::{LoginOutcome, LoginRequest};
