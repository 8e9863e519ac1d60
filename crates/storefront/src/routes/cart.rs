//! Cart route handlers.

use axum::Json;
use axum::extract::State;
use aurora_core::{ClientId, Price, ProductId};
use serde::{Deserialize, Serialize};

use crate::api::types::Cart;
use crate::catalog::CatalogKind;
use crate::error::Result;
use crate::state::AppState;

/// Cart snapshot plus the derived figures the UI renders.
#[derive(Debug, Serialize)]
pub struct CartSummary {
    pub cart: Option<Cart>,
    pub item_count: u32,
    pub total: Price,
}

fn summary(state: &AppState) -> CartSummary {
    CartSummary {
        cart: state.cart().snapshot(),
        item_count: state.cart().item_count(),
        total: state.cart().total(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadCartRequest {
    pub cliente_id: ClientId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub cliente_id: ClientId,
    pub producto_id: ProductId,
    /// Which collection the product lives in; defaults to lenses.
    #[serde(default)]
    pub tipo: Option<CatalogKind>,
    #[serde(default = "default_qty")]
    pub cantidad: u32,
}

const fn default_qty() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQtyRequest {
    pub producto_id: ProductId,
    pub cantidad: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    pub producto_id: ProductId,
}

/// `GET /cart` - current snapshot with count and total.
pub async fn show(State(state): State<AppState>) -> Json<CartSummary> {
    Json(summary(&state))
}

/// `POST /cart/load` - fetch the client's active cart, creating one if needed.
pub async fn load(
    State(state): State<AppState>,
    Json(request): Json<LoadCartRequest>,
) -> Result<Json<CartSummary>> {
    state.cart().fetch_or_create(&request.cliente_id).await?;
    Ok(Json(summary(&state)))
}

/// `POST /cart/add` - add a product, snapshotting its effective price.
/// Creates the client's cart first when none is loaded yet.
pub async fn add(
    State(state): State<AppState>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartSummary>> {
    let kind = request.tipo.unwrap_or(CatalogKind::Lentes);
    let product = state
        .catalog()
        .get_product(kind, &request.producto_id)
        .await?;
    state
        .cart()
        .add_item(&request.cliente_id, &product, request.cantidad)
        .await?;
    Ok(Json(summary(&state)))
}

/// `POST /cart/update` - set a line quantity; zero removes the line.
pub async fn update(
    State(state): State<AppState>,
    Json(request): Json<UpdateQtyRequest>,
) -> Result<Json<CartSummary>> {
    state
        .cart()
        .update_qty(&request.producto_id, request.cantidad)
        .await?;
    Ok(Json(summary(&state)))
}

/// `POST /cart/remove` - drop a line entirely.
pub async fn remove(
    State(state): State<AppState>,
    Json(request): Json<RemoveItemRequest>,
) -> Result<Json<CartSummary>> {
    state.cart().remove_item(&request.producto_id).await?;
    Ok(Json(summary(&state)))
}

/// `POST /cart/clear` - empty the cart without deleting it.
pub async fn clear(State(state): State<AppState>) -> Result<Json<CartSummary>> {
    state.cart().clear().await?;
    Ok(Json(summary(&state)))
}
