//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`; conversion into a response
//! captures server-side failures to Sentry and maps backend errors onto the
//! user-facing messages the storefront shows.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::api::ApiError;
use crate::prefs::PrefsError;
use crate::services::appointments::AppointmentError;
use crate::services::checkout::PaymentError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Aurora backend call failed.
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Checkout failed (validation, declined charge, or backend).
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Appointment scheduling failed (validation or backend).
    #[error("Appointment error: {0}")]
    Appointment(#[from] AppointmentError),

    /// Preference persistence failed.
    #[error("Preference error: {0}")]
    Prefs(#[from] PrefsError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side failures to Sentry
        if is_server_error(&self) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Api(err) => api_status(err),
            Self::Payment(err) => match err {
                PaymentError::Validation(_) => StatusCode::BAD_REQUEST,
                PaymentError::Declined(_) => StatusCode::PAYMENT_REQUIRED,
                PaymentError::Api(inner) => api_status(inner),
            },
            Self::Appointment(err) => match err {
                AppointmentError::Api(inner) => api_status(inner),
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Prefs(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internals; backend errors use the classified message
        let message = match &self {
            Self::Api(err) => err.user_message().to_string(),
            Self::Payment(err) => match err {
                PaymentError::Api(inner) => inner.user_message().to_string(),
                other => other.to_string(),
            },
            Self::Appointment(err) => match err {
                AppointmentError::Api(inner) => inner.user_message().to_string(),
                other => other.to_string(),
            },
            Self::Prefs(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn is_server_error(error: &AppError) -> bool {
    match error {
        AppError::Prefs(_) | AppError::Internal(_) => true,
        AppError::Api(err) => !matches!(err, ApiError::Status { status: 400..=499, .. }),
        AppError::Payment(PaymentError::Api(err)) | AppError::Appointment(AppointmentError::Api(err)) => {
            !matches!(err, ApiError::Status { status: 400..=499, .. })
        }
        _ => false,
    }
}

fn api_status(error: &ApiError) -> StatusCode {
    match error {
        ApiError::Status { status: 404, .. } => StatusCode::NOT_FOUND,
        ApiError::Status { status: 401, .. } => StatusCode::UNAUTHORIZED,
        ApiError::Status { status: 403, .. } => StatusCode::FORBIDDEN,
        ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after a successful login.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
