//! Auth route handlers.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::api::types::User;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::services::LoginOutcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub correo: String,
    pub password: String,
}

/// Login result in the same shape the backend reports: rejected credentials
/// are a `success: false` body, not an HTTP error.
#[derive(Debug, Serialize)]
pub struct LoginReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// `POST /auth/login`.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<LoginReply>> {
    let outcome = state.auth().login(&body.correo, &body.password).await?;

    let reply = match outcome {
        LoginOutcome::Success { user } => {
            if let Some(id) = &user.id {
                set_sentry_user(id, user.email.as_deref());
            }
            LoginReply {
                success: true,
                message: None,
                user: Some(user),
            }
        }
        LoginOutcome::Failure { message } => LoginReply {
            success: false,
            message: Some(message),
            user: None,
        },
    };
    Ok(Json(reply))
}

/// `POST /auth/logout` - clear session, bearer, and the cart snapshot.
pub async fn logout(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.auth().logout();
    state.cart().reset();
    clear_sentry_user();
    Json(serde_json::json!({ "success": true }))
}

/// `GET /auth/me` - current user, if authenticated.
pub async fn me(State(state): State<AppState>) -> Json<Option<User>> {
    Json(state.auth().current_user())
}
