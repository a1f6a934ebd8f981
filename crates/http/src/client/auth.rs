//! Authentication endpoints: login, token refresh, logout, device registration

use super::headers::public_headers;
use super::{ApiResponse, ClientError, RefreshOutcome, SessionClient};
use crate::types::{
    DeviceRegisterRequest, DeviceRegisterResponse, LoginOutcome, LoginRequest, LoginResponse,
    LogoutRequest, RefreshRequest, RefreshResponse,
};
use digs_core::{SessionKey, SessionSnapshot, TokenPair, resolve_device_token};
use tracing::{debug, info, warn};

pub const LOGIN_PATH: &str = "/users/login";
pub const REFRESH_PATH: &str = "/users/auth/refresh";
pub const LOGOUT_PATH: &str = "/users/logout";
pub const PING_PATH: &str = "/users/ping";
pub const DEVICE_REGISTER_PATH: &str = "/device/register";

impl SessionClient {
    /// Log in with username and password and persist the new session.
    ///
    /// Every session entity is replaced. The device token is the one the
    /// server issued, else the one already stored, else a generated one.
    /// The device is then registered; a failed registration is logged and
    /// reported in the outcome, not returned as an error.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, ClientError> {
        let mut url = self.resolve(LOGIN_PATH)?;
        if let Some(university) = request.university.as_deref().filter(|u| !u.is_empty()) {
            url.query_pairs_mut().append_pair("university", university);
        }

        info!(username = %request.username, university = ?request.university, "Logging in");
        let response = self
            .client
            .post(url)
            .headers(public_headers(&self.api_key)?)
            .form(request)
            .send()
            .await?;
        let login: LoginResponse = ApiResponse::read(response).await?.into_json()?;

        let stored_device = self.store.get(SessionKey::DeviceToken).await?;
        let device = resolve_device_token(login.device_token.as_deref(), stored_device.as_deref());
        if device.is_generated() && stored_device.as_deref() != Some(device.as_str()) {
            debug!(device = %device, "Generated a new device token");
        }

        let university = login.university.clone().filter(|u| !u.is_empty());
        let pair = login.token_pair();
        let mut entries = vec![
            (SessionKey::AccessToken, pair.access_token),
            (SessionKey::RefreshToken, pair.refresh_token),
            (SessionKey::UserId, login.user_id.clone()),
            (SessionKey::Role, login.role.clone()),
            (SessionKey::DeviceToken, device.to_string()),
        ];
        if let Some(university) = &university {
            entries.push((SessionKey::University, university.clone()));
        }

        self.store.clear().await?;
        self.store.set_many(&entries).await?;
        info!(user_id = %login.user_id, role = %login.role, "Logged in");

        let device_registered = match self.register_device().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Device registration failed: {e}");
                false
            }
        };

        Ok(LoginOutcome {
            user_id: login.user_id,
            role: login.role,
            university,
            device_token: device.into_inner(),
            message: login.message,
            device_registered,
        })
    }

    /// Register the stored device token for the signed-in user
    pub async fn register_device(&self) -> Result<(), ClientError> {
        let session = self.store.snapshot().await?;
        let (Some(user_id), Some(role), Some(device_token)) =
            (session.user_id, session.role, session.device_token)
        else {
            return Err(ClientError::NoCredential);
        };

        let request = DeviceRegisterRequest {
            university: session.university.unwrap_or_default(),
            user_id,
            role,
            device_token,
            platform: self.platform.clone(),
        };

        let response: DeviceRegisterResponse =
            self.post_json(DEVICE_REGISTER_PATH, &request).await?;
        debug!(
            ok = response.ok,
            message = ?response.message,
            "Device registered"
        );
        Ok(())
    }

    /// Exchange the stored refresh token for a new token pair.
    ///
    /// Never raises for refresh failures; see [`RefreshOutcome`]. Errors only
    /// when the store fails.
    pub async fn refresh(&self) -> Result<RefreshOutcome, ClientError> {
        let _gate = self.refresh_gate.lock().await;
        self.refresh_locked().await
    }

    /// Refresh with the gate already held
    pub(super) async fn refresh_locked(&self) -> Result<RefreshOutcome, ClientError> {
        let Some(refresh_token) = self
            .store
            .get(SessionKey::RefreshToken)
            .await?
            .filter(|token| !token.is_empty())
        else {
            debug!("No refresh token stored");
            return Ok(RefreshOutcome::NoRefreshToken);
        };

        let url = self.resolve(REFRESH_PATH)?;
        let sent = self
            .client
            .post(url)
            .headers(public_headers(&self.api_key)?)
            .form(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                warn!("Token refresh unreachable: {e}");
                return Ok(RefreshOutcome::Unreachable);
            }
        };

        let status = response.status();
        if status.is_success() {
            match response.json::<RefreshResponse>().await {
                Ok(tokens) => {
                    self.store
                        .store_token_pair(&TokenPair::from(tokens))
                        .await?;
                    info!("Access token refreshed");
                    return Ok(RefreshOutcome::Refreshed);
                }
                Err(e) if e.is_decode() => {
                    warn!(%status, "Refresh response unreadable: {e}");
                }
                Err(e) => {
                    warn!("Token refresh interrupted: {e}");
                    return Ok(RefreshOutcome::Unreachable);
                }
            }
        } else {
            warn!(%status, "Refresh token rejected");
        }

        self.store.clear().await?;
        self.observer.session_expired();
        Ok(RefreshOutcome::Rejected(status))
    }

    /// Revoke the refresh token server-side, then clear the local session.
    ///
    /// The local session is cleared even if the server call fails.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Some(refresh_token) = self
            .store
            .get(SessionKey::RefreshToken)
            .await?
            .filter(|token| !token.is_empty())
        {
            let url = self.resolve(LOGOUT_PATH)?;
            let sent = self
                .client
                .post(url)
                .headers(public_headers(&self.api_key)?)
                .form(&LogoutRequest {
                    refresh_token: &refresh_token,
                })
                .send()
                .await;

            match sent {
                Ok(response) if response.status().is_success() => {
                    debug!("Refresh token revoked");
                }
                Ok(response) => warn!(status = %response.status(), "Logout rejected by server"),
                Err(e) => warn!("Logout request failed: {e}"),
            }
        }

        self.store.clear().await?;
        info!("Logged out");
        Ok(())
    }

    /// Unauthenticated health check
    pub async fn ping(&self) -> Result<serde_json::Value, ClientError> {
        let url = self.resolve(PING_PATH)?;
        let response = self
            .client
            .get(url)
            .headers(public_headers(&self.api_key)?)
            .send()
            .await?;
        ApiResponse::read(response).await?.into_json()
    }

    /// Everything currently stored for this session
    pub async fn session(&self) -> Result<SessionSnapshot, ClientError> {
        Ok(self.store.snapshot().await?)
    }
}
