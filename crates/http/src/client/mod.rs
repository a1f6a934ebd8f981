//! Digs session client
//!
//! [`SessionClient`] wraps every authenticated call with the stored bearer
//! token, refreshes it once when the server answers 401, and clears the
//! session when the server reports it was taken over by another device.

pub mod auth;
pub mod error;
pub mod forced_logout;
pub mod headers;
pub mod observer;
pub mod response;

pub use error::ClientError;
pub use observer::{NoopObserver, SessionObserver, TracingObserver};
pub use response::{ApiResponse, Disposition};

use crate::config::ClientConfig;
use bytes::Bytes;
use digs_core::{MemoryStore, SessionKey, SessionStore};
use headers::{HeaderInputs, build_headers};
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

/// Result of a token refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New tokens were fetched and stored
    Refreshed,
    /// A concurrent request refreshed while this one waited
    Shared,
    /// Nothing to refresh with; no network call was made
    NoRefreshToken,
    /// The refresh endpoint refused; the session has been cleared
    Rejected(StatusCode),
    /// The refresh endpoint could not be reached
    Unreachable,
}

impl RefreshOutcome {
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Refreshed | Self::Shared)
    }
}

/// Refresh budget of a single verb call
#[derive(Debug, Default)]
struct Attempt {
    refreshed: bool,
}

/// Authenticated client for the Digs backend
#[derive(Clone)]
pub struct SessionClient {
    client: Client,
    base_url: Url,
    api_key: String,
    platform: String,
    store: Arc<dyn SessionStore>,
    observer: Arc<dyn SessionObserver>,
    refresh_gate: Arc<Mutex<()>>,
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("base_url", &self.base_url.as_str())
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

impl SessionClient {
    /// Create a new client builder
    pub fn builder() -> SessionClientBuilder {
        SessionClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// The injected session store
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Resolve a path against the base URL. Absolute `http(s)` URLs pass through.
    pub fn resolve(&self, target: &str) -> Result<Url, ClientError> {
        if let Ok(url) = Url::parse(target)
            && matches!(url.scheme(), "http" | "https")
        {
            return Ok(url);
        }

        self.base_url
            .join(target.trim_start_matches('/'))
            .map_err(|e| ClientError::Configuration(format!("invalid target {target}: {e}")))
    }

    pub async fn get(&self, target: &str) -> Result<ApiResponse, ClientError> {
        self.send::<()>(Method::GET, target, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        target: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        self.send(Method::POST, target, Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        target: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        self.send(Method::PUT, target, Some(body)).await
    }

    pub async fn delete(&self, target: &str) -> Result<ApiResponse, ClientError> {
        self.send::<()>(Method::DELETE, target, None).await
    }

    /// GET and deserialize a 2xx body
    pub async fn get_json<T: DeserializeOwned>(&self, target: &str) -> Result<T, ClientError> {
        self.get(target).await?.into_json()
    }

    /// POST and deserialize a 2xx body
    pub async fn post_json<B, T>(&self, target: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(target, body).await?.into_json()
    }

    /// PUT and deserialize a 2xx body
    pub async fn put_json<B, T>(&self, target: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.put(target, body).await?.into_json()
    }

    /// DELETE and deserialize a 2xx body
    pub async fn delete_json<T: DeserializeOwned>(&self, target: &str) -> Result<T, ClientError> {
        self.delete(target).await?.into_json()
    }

    /// Issue an authenticated request.
    ///
    /// At most one refresh and one retry happen per call:
    /// - a 401 carrying a forced-logout marker clears the session and is
    ///   returned as-is;
    /// - any other 401 triggers a single refresh, and on success the request
    ///   is re-sent once and that response is returned whatever its status;
    /// - everything else is returned untouched.
    ///
    /// Errors only when no access credential can be obtained, the body cannot
    /// be serialized, storage fails, or the transport fails.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        target: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.resolve(target)?;
        let payload = body
            .map(|body| serde_json::to_vec(body))
            .transpose()?
            .map(Bytes::from);
        let mut attempt = Attempt::default();

        let (first, used_token) = self
            .issue(&method, &url, payload.as_ref(), &mut attempt)
            .await?;

        if first.is_forced_logout() {
            self.end_forced_session(&first).await?;
            return Ok(first.with_disposition(Disposition::ForcedLogout));
        }

        if first.status() != StatusCode::UNAUTHORIZED {
            return Ok(first);
        }

        if attempt.refreshed {
            debug!(%method, %url, "401 right after a refresh, returning it");
            return Ok(first);
        }
        attempt.refreshed = true;

        let outcome = self.refresh_rejected(&used_token).await?;
        if !outcome.is_success() {
            debug!(%method, %url, ?outcome, "Refresh failed, returning original 401");
            return Ok(first.with_disposition(Disposition::RefreshFailed));
        }

        let (retried, _) = self
            .issue(&method, &url, payload.as_ref(), &mut attempt)
            .await?;

        if retried.is_forced_logout() {
            self.end_forced_session(&retried).await?;
            return Ok(retried.with_disposition(Disposition::ForcedLogout));
        }

        Ok(retried.with_disposition(Disposition::Retried))
    }

    /// Send one request with freshly built headers. Returns the response and
    /// the access token it was sent with.
    async fn issue(
        &self,
        method: &Method,
        url: &Url,
        payload: Option<&Bytes>,
        attempt: &mut Attempt,
    ) -> Result<(ApiResponse, String), ClientError> {
        let access_token = self.access_token(attempt).await?;
        let device_token = self.store.get(SessionKey::DeviceToken).await?;

        let headers = build_headers(HeaderInputs {
            api_key: &self.api_key,
            access_token: Some(&access_token),
            device_token: device_token.as_deref(),
            json_body: payload.is_some(),
        })?;

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .headers(headers);
        if let Some(payload) = payload {
            request = request.body(payload.clone());
        }

        debug!(%method, %url, "Sending request");
        let response = request.send().await.map_err(|e| {
            warn!(%method, %url, "Request failed: {e}");
            ClientError::from(e)
        })?;
        let response = ApiResponse::read(response).await?;
        debug!(%method, %url, status = %response.status(), "Response received");

        Ok((response, access_token))
    }

    /// The stored access token, refreshing first when none is stored and the
    /// call still has its refresh budget.
    async fn access_token(&self, attempt: &mut Attempt) -> Result<String, ClientError> {
        if let Some(token) = self.stored_access_token().await? {
            return Ok(token);
        }
        if attempt.refreshed {
            return Err(ClientError::NoCredential);
        }
        attempt.refreshed = true;

        debug!("No access token stored, refreshing first");
        let _gate = self.refresh_gate.lock().await;
        if let Some(token) = self.stored_access_token().await? {
            return Ok(token);
        }
        self.refresh_locked().await?;
        self.stored_access_token()
            .await?
            .ok_or(ClientError::NoCredential)
    }

    /// Refresh after the server rejected `rejected`, unless a concurrent call
    /// already replaced it.
    async fn refresh_rejected(&self, rejected: &str) -> Result<RefreshOutcome, ClientError> {
        let _gate = self.refresh_gate.lock().await;
        if let Some(current) = self.stored_access_token().await?
            && current != rejected
        {
            debug!("Access token already refreshed by a concurrent request");
            return Ok(RefreshOutcome::Shared);
        }
        self.refresh_locked().await
    }

    async fn stored_access_token(&self) -> Result<Option<String>, ClientError> {
        Ok(self
            .store
            .get(SessionKey::AccessToken)
            .await?
            .filter(|token| !token.is_empty()))
    }

    /// Clear the store and notify the observer. The observer is told even
    /// when clearing fails; the storage error is returned afterwards.
    async fn end_forced_session(&self, response: &ApiResponse) -> Result<(), ClientError> {
        let body = response.text();
        let marker = forced_logout::matched_marker(&body).unwrap_or_default();
        warn!(marker, "Server invalidated the session, clearing local state");

        let cleared = self.store.clear().await;
        if let Err(e) = &cleared {
            warn!("Failed to clear the invalidated session: {e}");
        }
        self.observer.forced_logout(forced_logout::notice_for(&body));
        cleared.map_err(ClientError::from)
    }
}

/// Builder for SessionClient
#[derive(Default)]
pub struct SessionClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    platform: Option<String>,
    store: Option<Arc<dyn SessionStore>>,
    observer: Option<Arc<dyn SessionObserver>>,
}

impl SessionClientBuilder {
    /// Take every setting from a config
    #[must_use]
    pub fn config(mut self, config: &ClientConfig) -> Self {
        self.base_url = Some(config.base_url.clone());
        self.api_key = Some(config.api_key.clone());
        self.timeout = config.timeout();
        self.user_agent.clone_from(&config.user_agent);
        self.platform = Some(config.platform.clone());
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the service identification key
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the platform tag used for device registration
    #[must_use]
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Set the session store (defaults to an in-memory store)
    #[must_use]
    pub fn store(self, store: impl SessionStore + 'static) -> Self {
        self.shared_store(Arc::new(store))
    }

    /// Set a session store shared with other owners
    #[must_use]
    pub fn shared_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the session observer (defaults to logging only)
    #[must_use]
    pub fn observer(self, observer: impl SessionObserver + 'static) -> Self {
        self.shared_observer(Arc::new(observer))
    }

    /// Set an observer shared with other owners
    #[must_use]
    pub fn shared_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<SessionClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ClientError::Configuration("api_key is required".into()))?;

        let mut base_url = Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "base_url {base_url} cannot be a base"
            )));
        }
        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut client_builder = ClientBuilder::new();
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        client_builder = client_builder.user_agent(
            self.user_agent
                .unwrap_or_else(|| format!("digs-client/{}", env!("CARGO_PKG_VERSION"))),
        );
        let client = client_builder.build()?;

        Ok(SessionClient {
            client,
            base_url,
            api_key,
            platform: self
                .platform
                .unwrap_or_else(|| digs_core::DEFAULT_PLATFORM.to_string()),
            store: self.store.unwrap_or_else(|| Arc::new(MemoryStore::new())),
            observer: self.observer.unwrap_or_else(|| Arc::new(TracingObserver)),
            refresh_gate: Arc::new(Mutex::new(())),
        })
    }
}
