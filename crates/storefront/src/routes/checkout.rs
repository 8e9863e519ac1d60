//! Checkout route handler.

use axum::Json;
use axum::extract::State;

use crate::error::{AppError, Result};
use crate::services::checkout::{CheckoutForm, CheckoutReceipt};
use crate::state::AppState;

/// `POST /checkout` - validate the form, charge (card), create the sale.
///
/// The backend finalizes the cart as part of the sale, so the local cart
/// snapshot is dropped on success; the next `/cart/load` starts fresh.
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<CheckoutForm>,
) -> Result<Json<CheckoutReceipt>> {
    let cart = state
        .cart()
        .snapshot()
        .ok_or_else(|| AppError::BadRequest("No hay un carrito activo".to_string()))?;

    let receipt = state.checkout().submit(&cart, &form).await?;
    state.cart().reset();
    state.catalog().invalidate();
    Ok(Json(receipt))
}
