//! Authentication against the Aurora backend.
//!
//! Holds the bearer token and user snapshot, persisted through the
//! preference store (the `localStorage` analog) and restored at startup.
//!
//! The JWT is decoded WITHOUT signature verification, purely to seed a
//! display-only user object when the snapshot lacks one. Decoded claims are
//! never an authorization decision; the backend re-verifies the token on
//! every request.

use std::sync::{Arc, RwLock};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::api::types::{LoginRequest, LoginResponse, User};
use crate::api::{ApiClient, ApiError, endpoints};
use crate::prefs::{PreferenceStore, keys};

/// Persisted session snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionSnapshot {
    token: String,
    #[serde(default)]
    user: Option<User>,
}

/// Result of a login attempt. The backend reports credential failures as a
/// message rather than an HTTP error, so this is not an `Err`.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Success { user: User },
    Failure { message: String },
}

/// Authentication state and operations.
pub struct AuthService {
    api: ApiClient,
    prefs: Arc<PreferenceStore>,
    session: RwLock<Option<User>>,
}

impl AuthService {
    #[must_use]
    pub fn new(api: ApiClient, prefs: Arc<PreferenceStore>) -> Self {
        Self {
            api,
            prefs,
            session: RwLock::new(None),
        }
    }

    /// Restore a persisted session, if any.
    ///
    /// A snapshot with a user is used as-is; a bare token seeds a minimal
    /// user from its decoded payload. A malformed token or corrupted
    /// snapshot degrades silently to the unauthenticated state.
    pub fn restore(&self) {
        let Some(snapshot) = self.prefs.get::<SessionSnapshot>(keys::AUTH_SESSION) else {
            return;
        };

        let user = match snapshot.user {
            Some(user) => Some(user),
            None => match decode_jwt_claims(&snapshot.token) {
                Some(user) => Some(user),
                None => {
                    debug!("Stored token did not decode, staying unauthenticated");
                    None
                }
            },
        };

        if let Some(user) = user {
            self.api.set_bearer(SecretString::from(snapshot.token));
            if let Ok(mut guard) = self.session.write() {
                *guard = Some(user);
            }
        }
    }

    /// The currently authenticated user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.session.read().ok().and_then(|guard| guard.clone())
    }

    /// Log in with email and password.
    ///
    /// On success the token and user are persisted, the default bearer
    /// header is set, and the user is enriched with their `cargo` (position)
    /// from the employees endpoint when the login response lacks it.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport failures; rejected credentials
    /// come back as [`LoginOutcome::Failure`].
    #[instrument(skip(self, password), fields(correo = %correo))]
    pub async fn login(&self, correo: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        let request = LoginRequest {
            correo: correo.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.api.post(endpoints::AUTH_LOGIN, &request).await?;

        let (Some(token), true) = (response.token, response.success) else {
            return Ok(LoginOutcome::Failure {
                message: response
                    .message
                    .unwrap_or_else(|| "Invalid credentials".to_string()),
            });
        };

        let mut user = response
            .user
            .or_else(|| decode_jwt_claims(&token))
            .unwrap_or_default();

        self.api.set_bearer(SecretString::from(token.clone()));

        // Best-effort enrichment; a missing employees record is not a login failure
        if user.cargo.is_none()
            && let Some(id) = &user.id
            && let Ok(employee) = self
                .api
                .get::<User>(&format!("{}/{}", endpoints::EMPLEADOS, id), &[])
                .await
        {
            user.cargo = employee.cargo;
        }

        let snapshot = SessionSnapshot {
            token,
            user: Some(user.clone()),
        };
        if let Err(e) = self.prefs.set(keys::AUTH_SESSION, &snapshot) {
            debug!(error = %e, "Could not persist session snapshot");
        }

        if let Ok(mut guard) = self.session.write() {
            *guard = Some(user.clone());
        }

        Ok(LoginOutcome::Success { user })
    }

    /// Clear the token, user, persisted snapshot, and default header.
    pub fn logout(&self) {
        self.api.clear_bearer();
        if let Ok(mut guard) = self.session.write() {
            *guard = None;
        }
        if let Err(e) = self.prefs.remove(keys::AUTH_SESSION) {
            debug!(error = %e, "Could not clear session snapshot");
        }
    }
}

/// Decode the payload segment of a JWT without verifying its signature.
///
/// Returns `None` for anything that is not three dot-separated segments with
/// a base64url JSON payload. The result is display data only.
fn decode_jwt_claims(token: &str) -> Option<User> {
    let mut segments = token.split('.');
    let _header = segments.next()?;
    let payload = segments.next()?;
    let _signature = segments.next()?;
    if segments.next().is_some() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}
