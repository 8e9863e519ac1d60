//! Quote route handlers.

use axum::Json;
use axum::extract::{Path, State};
use aurora_core::{ClientId, QuoteId};

use crate::api::types::Quote;
use crate::error::Result;
use crate::services::QuoteDraft;
use crate::state::AppState;

/// `POST /quotes` - create a quote valid for 30 days.
pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<QuoteDraft>,
) -> Result<Json<Quote>> {
    let quote = state.quotes().create(draft).await?;
    Ok(Json(quote))
}

/// `GET /quotes/client/{id}` - a client's quotes.
pub async fn list_for_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Quote>>> {
    let quotes = state.quotes().list_for_client(&ClientId::new(id)).await?;
    Ok(Json(quotes))
}

/// `GET /quotes/{id}` - one quote.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Quote>> {
    let quote = state.quotes().get(&QuoteId::new(id)).await?;
    Ok(Json(quote))
}

/// `DELETE /quotes/{id}`.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state.quotes().delete(&QuoteId::new(id)).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// `POST /quotes/{id}/convert` - convert a quote into an order.
pub async fn convert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let converted = state.quotes().convert_to_order(&QuoteId::new(id)).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": converted.message,
        "pedidoId": converted.pedido_id,
        "cotizacion": converted.cotizacion,
    })))
}
