//! Aurora backend REST API client.
//!
//! # Architecture
//!
//! - The backend is the source of truth - NO local persistence, direct API calls
//! - Responses come in several envelope shapes (`{success, data}`, bare
//!   arrays, `{message}` errors); [`envelope`] normalizes them
//! - Idempotent reads are retried with exponential backoff; writes never are
//!
//! # Example
//!
//! ```rust,ignore
//! use aurora_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(base_url);
//!
//! // Fetch a server page of lenses
//! let page: Paginated<Product> = api
//!     .get_paginated(endpoints::LENTES, &[("page", "1"), ("limit", "12")])
//!     .await?;
//! ```

mod client;
pub mod envelope;
pub mod types;

pub use client::ApiClient;

use thiserror::Error;

/// Backend endpoint paths, relative to the resolved base URL.
pub mod endpoints {
    pub const LENTES: &str = "lentes";
    pub const ACCESORIOS: &str = "accesorios";
    pub const CARRITO: &str = "carrito";
    pub const COTIZACIONES: &str = "cotizaciones";
    pub const VENTAS: &str = "ventas";
    pub const EMPLEADOS: &str = "empleados";
    pub const AUTH_LOGIN: &str = "auth/login";
    pub const AUDITORIA: &str = "auditoria";
    pub const WOMPI_TOKENLESS: &str = "wompi/tokenless";
    pub const CITAS: &str = "citas";
    pub const SUCURSALES: &str = "sucursales";
    // The backend mounts this route in the singular
    pub const OPTOMETRISTAS: &str = "optometrista";
}

/// Errors that can occur when talking to the Aurora backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure (connect, DNS, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Backend returned a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response JSON did not fit any known envelope shape.
    #[error("Invalid API response: {0}")]
    Envelope(String),
}

impl ApiError {
    /// Whether a retry could plausibly help (network and timeout failures only).
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout)
    }

    /// User-facing message for this error.
    ///
    /// The taxonomy mirrors what the storefront shows customers: not-found,
    /// server error, auth, connectivity, timeout, then a generic fallback.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Status { status: 404, .. } => "Resource not found.",
            Self::Status { status: 500, .. } => "Internal server error. Please try again later.",
            Self::Status { status: 401, .. } => "Not authorized. Please sign in.",
            Self::Status { status: 403, .. } => "Access denied.",
            Self::Status { .. } | Self::Parse(_) | Self::Envelope(_) => "Unexpected error.",
            Self::Http(_) => "Connection error. Check your internet connection.",
            Self::Timeout => "The request is taking too long. Please try again.",
        }
    }
}
