//! Price quotes (cotizaciones).
//!
//! A quote freezes product prices and optional per-line customizations for
//! 30 days. The storefront computes the total and validity window locally
//! and sends the complete document; the backend stores it as-is.

use aurora_core::{ClientId, Price, QuoteId, QuoteStatus};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::api::types::{CreateQuoteRequest, Quote, QuoteItem};
use crate::api::{ApiClient, ApiError, endpoints};

/// Days a quote remains valid after creation.
const VALIDITY_DAYS: i64 = 30;

/// Client-side draft of a quote, before totals and dates are filled in.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteDraft {
    pub cliente_id: ClientId,
    #[serde(default)]
    pub correo_cliente: Option<String>,
    pub telefono_cliente: String,
    pub productos: Vec<QuoteItem>,
}

/// Response of the convert-to-order endpoint.
#[derive(Debug, Deserialize)]
pub struct ConvertedQuote {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub cotizacion: Option<Quote>,
    /// Id of the order the backend created from the quote.
    #[serde(default, rename = "pedidoId")]
    pub pedido_id: Option<String>,
}

/// Quote operations against the backend.
pub struct QuoteService {
    api: ApiClient,
}

impl QuoteService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Create a quote from a draft.
    ///
    /// Sets `fecha` to now, `validaHasta` to 30 days out, status to pending,
    /// and the total to the sum over lines including customizations.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error envelope.
    #[instrument(skip(self, draft), fields(cliente = %draft.cliente_id))]
    pub async fn create(&self, draft: QuoteDraft) -> Result<Quote, ApiError> {
        let now = Utc::now();
        let request = CreateQuoteRequest {
            cliente_id: draft.cliente_id,
            correo_cliente: draft.correo_cliente,
            telefono_cliente: draft.telefono_cliente,
            fecha: now,
            total: quote_total(&draft.productos),
            valida_hasta: valid_until(now),
            productos: draft.productos,
            estado: QuoteStatus::Pendiente,
        };
        let quote: Quote = self.api.post(endpoints::COTIZACIONES, &request).await?;
        info!(cotizacion = %quote.id, "Quote created");
        Ok(quote)
    }

    /// List a client's quotes.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error envelope.
    pub async fn list_for_client(&self, client_id: &ClientId) -> Result<Vec<Quote>, ApiError> {
        let endpoint = format!("{}/cliente/{}", endpoints::COTIZACIONES, client_id);
        self.api.get(&endpoint, &[]).await
    }

    /// Fetch one quote by id.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error envelope.
    pub async fn get(&self, id: &QuoteId) -> Result<Quote, ApiError> {
        let endpoint = format!("{}/{}", endpoints::COTIZACIONES, id);
        self.api.get(&endpoint, &[]).await
    }

    /// Delete a quote.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error envelope.
    #[instrument(skip(self), fields(cotizacion = %id))]
    pub async fn delete(&self, id: &QuoteId) -> Result<(), ApiError> {
        let endpoint = format!("{}/{}", endpoints::COTIZACIONES, id);
        let _: serde_json::Value = self.api.delete(&endpoint, &serde_json::json!({})).await?;
        Ok(())
    }

    /// Convert a quote into an order; the backend moves it to `convertida`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error envelope.
    #[instrument(skip(self), fields(cotizacion = %id))]
    pub async fn convert_to_order(&self, id: &QuoteId) -> Result<ConvertedQuote, ApiError> {
        let endpoint = format!("{}/{}/convertir-a-pedido", endpoints::COTIZACIONES, id);
        self.api.post(&endpoint, &serde_json::json!({})).await
    }
}

/// Validity cutoff for a quote created at `now`.
#[must_use]
pub fn valid_until(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(VALIDITY_DAYS)
}

/// Quote total: per line, unit price times quantity plus each customization's
/// price times its quantity.
#[must_use]
pub fn quote_total(items: &[QuoteItem]) -> Price {
    items
        .iter()
        .map(|item| {
            let extras: Price = item
                .personalizaciones
                .iter()
                .map(|p| p.precio * p.cantidad)
                .sum();
            item.precio_unitario * item.cantidad + extras
        })
        .sum()
}

/// Whether a quote is past its validity window at `now`.
#[must_use]
pub fn is_expired(quote: &Quote, now: DateTime<Utc>) -> bool {
    now > quote.valida_hasta
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::types::QuoteCustomization;
    use aurora_core::ProductId;

    fn item(cents: i64, cantidad: u32, extras: Vec<QuoteCustomization>) -> QuoteItem {
        QuoteItem {
            producto_id: ProductId::new("p1"),
            nombre: "Progresivo".to_string(),
            categoria: "lentes".to_string(),
            cantidad,
            precio_unitario: Price::from_cents(cents),
            subtotal: None,
            personalizaciones: extras,
        }
    }

    #[test]
    fn test_valid_until_is_thirty_days() {
        let now = Utc::now();
        assert_eq!(valid_until(now) - now, Duration::days(30));
    }

    #[test]
    fn test_quote_total_includes_customizations() {
        let items = vec![
            item(10000, 2, vec![]),
            item(
                5000,
                1,
                vec![QuoteCustomization {
                    nombre: "Antirreflejo".to_string(),
                    precio: Price::from_cents(1500),
                    cantidad: 2,
                }],
            ),
        ];
        // 2*100.00 + 1*50.00 + 2*15.00 = 280.00
        assert_eq!(quote_total(&items), Price::from_cents(28000));
    }

    #[test]
    fn test_quote_total_empty() {
        assert_eq!(quote_total(&[]), Price::ZERO);
    }

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        let quote: Quote = serde_json::from_value(serde_json::json!({
            "_id": "q1",
            "clienteId": "u1",
            "fecha": now.to_rfc3339(),
            "productos": [],
            "validaHasta": (now + Duration::days(30)).to_rfc3339(),
            "estado": "pendiente"
        }))
        .unwrap();

        assert!(!is_expired(&quote, now + Duration::days(29)));
        assert!(is_expired(&quote, now + Duration::days(31)));
    }
}
