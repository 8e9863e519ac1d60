//! HTTP client for the Aurora backend.
//!
//! One `reqwest::Client` behind an `Arc`, holding the base URL resolved at
//! startup and the current bearer token. Reads retry with exponential
//! backoff on network/timeout failures; writes are issued exactly once.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{MAX_RETRIES, REQUEST_TIMEOUT, RETRY_DELAY};

use super::types::Paginated;
use super::{ApiError, envelope};

/// Client for the Aurora backend REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base: Url,
    token: RwLock<Option<SecretString>>,
}

impl ApiClient {
    /// Create a new client for the given resolved base URL.
    ///
    /// # Panics
    ///
    /// Panics if the underlying HTTP client cannot be constructed.
    #[must_use]
    pub fn new(base: Url) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(ApiClientInner {
                client,
                base,
                token: RwLock::new(None),
            }),
        }
    }

    /// The base URL this client was resolved against.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.inner.base
    }

    /// Set the default bearer token attached to every subsequent request.
    pub fn set_bearer(&self, token: SecretString) {
        if let Ok(mut guard) = self.inner.token.write() {
            *guard = Some(token);
        }
    }

    /// Clear the default bearer token.
    pub fn clear_bearer(&self) {
        if let Ok(mut guard) = self.inner.token.write() {
            *guard = None;
        }
    }

    fn bearer(&self) -> Option<String> {
        self.inner
            .token
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|t| t.expose_secret().to_string()))
    }

    /// Build a full URL from an endpoint path and query parameters.
    ///
    /// Query encoding goes through `url::Url`, so no manual escaping.
    #[must_use]
    pub fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> Url {
        let mut url = self.inner.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .expect("base URL cannot be a base");
            segments.pop_if_empty();
            for segment in endpoint.split('/') {
                segments.push(segment);
            }
        }
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.bearer() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn send_once(&self, url: Url) -> Result<Value, ApiError> {
        let response = self
            .apply_auth(self.inner.client.get(url))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::read_json(response).await
    }

    /// GET the raw JSON body, retrying network/timeout failures.
    ///
    /// Retries are local and silent: exponential backoff with jitter, capped
    /// at `MAX_RETRIES`. Non-retryable errors surface immediately.
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted.
    #[instrument(skip(self, params), fields(endpoint = %endpoint))]
    pub async fn get_raw(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Value, ApiError> {
        let url = self.build_url(endpoint, params);

        let mut attempt = 0;
        loop {
            match self.send_once(url.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < MAX_RETRIES => {
                    let delay = backoff_delay(attempt);
                    warn!(error = %e, attempt, delay_ms = delay.as_millis() as u64, "Retrying read");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// GET a typed payload through envelope normalization.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, an error envelope, or a
    /// payload that does not deserialize as `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let body = self.get_raw(endpoint, params).await?;
        let data = envelope::normalize(body)?;
        Ok(serde_json::from_value(data)?)
    }

    /// GET one server page of a listing endpoint.
    ///
    /// Accepts both `{data, pagination}` envelopes and bare arrays (older
    /// controllers); a bare array becomes a degenerate single page.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an unrecognized payload.
    pub async fn get_paginated<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Paginated<T>, ApiError> {
        let body = self.get_raw(endpoint, params).await?;
        let data = envelope::normalize(body)?;

        if data.is_array() {
            let items: Vec<T> = serde_json::from_value(data)?;
            debug!(count = items.len(), "Bare array page");
            return Ok(Paginated::single_page(items));
        }
        Ok(serde_json::from_value(data)?)
    }

    /// POST a JSON body. Never retried (non-idempotent).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.build_url(endpoint, &[]);
        let response = self
            .apply_auth(self.inner.client.post(url))
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let value = Self::read_json(response).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// PUT a JSON body. Never retried (non-idempotent in practice: the cart
    /// replace overwrites whatever the server holds).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn put<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.build_url(endpoint, &[]);
        let response = self
            .apply_auth(self.inner.client.put(url))
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let value = Self::read_json(response).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// DELETE with a JSON body (the cart remove endpoint takes the product id
    /// in the body). Never retried.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn delete<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.build_url(endpoint, &[]);
        let response = self
            .apply_auth(self.inner.client.delete(url))
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let value = Self::read_json(response).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Open a GET request and return the raw response for streaming (SSE).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn get_stream(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.build_url(endpoint, params);
        let response = self
            .apply_auth(self.inner.client.get(url))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        Ok(response)
    }
}

/// Map reqwest errors, surfacing timeouts as their own class.
fn map_reqwest_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Http(e)
    }
}

/// Exponential backoff with jitter: `RETRY_DELAY * 2^attempt + rand(0..250ms)`.
fn backoff_delay(attempt: u32) -> Duration {
    let base = RETRY_DELAY * 2_u32.saturating_pow(attempt);
    let jitter = Duration::from_millis(rand::rng().random_range(0..250));
    base + jitter
}
