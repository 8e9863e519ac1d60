//! Shopping cart operations.
//!
//! The cart lives on the backend; this service keeps one in-memory snapshot
//! per process and mutates it through the backend's endpoints. Quantity
//! changes rebuild the full line list from the local snapshot and `PUT` it
//! as a whole-document replace, matching the backend's contract. Two writers
//! on the same cart can therefore lose each other's updates; the backend
//! offers no per-line update to avoid that.

use std::sync::RwLock;

use aurora_core::{ClientId, Price, ProductId};
use tracing::{debug, instrument};

use crate::api::types::{
    AddLineRequest, Cart, CartLine, CartMutationResponse, CreateCartRequest, Product,
    RemoveLineRequest, ReplaceLinesRequest,
};
use crate::api::{ApiClient, ApiError, endpoints};

/// Cart state and operations for one client session.
pub struct CartService {
    api: ApiClient,
    current: RwLock<Option<Cart>>,
}

impl CartService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            current: RwLock::new(None),
        }
    }

    /// The current cart snapshot, if one was loaded.
    #[must_use]
    pub fn snapshot(&self) -> Option<Cart> {
        self.current.read().ok().and_then(|guard| guard.clone())
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.snapshot().map_or(0, |cart| line_count(&cart.productos))
    }

    /// Cart total: the server-computed figure when present, else the sum of
    /// line prices times quantities.
    #[must_use]
    pub fn total(&self) -> Price {
        self.snapshot().map_or(Price::ZERO, |cart| cart_total(&cart))
    }

    /// Load the client's active cart, creating an empty one when none exists.
    ///
    /// The backend may return several carts for a client (finalized orders
    /// share the collection); the first active one wins, then the first
    /// document of any status.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error envelope.
    #[instrument(skip(self), fields(cliente = %client_id))]
    pub async fn fetch_or_create(&self, client_id: &ClientId) -> Result<Cart, ApiError> {
        let endpoint = format!("{}/cliente/{}", endpoints::CARRITO, client_id);
        let carts: Vec<Cart> = match self.api.get(&endpoint, &[]).await {
            Ok(carts) => carts,
            // A client with no carts yet comes back as 404
            Err(ApiError::Status { status: 404, .. }) => Vec::new(),
            Err(e) => return Err(e),
        };

        let cart = match pick_client_cart(carts) {
            Some(cart) => cart,
            None => {
                debug!("No active cart, creating one");
                let request = CreateCartRequest {
                    cliente_id: client_id.clone(),
                    productos: Vec::new(),
                };
                let response: CartMutationResponse =
                    self.api.post(endpoints::CARRITO, &request).await?;
                response
                    .carrito
                    .ok_or_else(|| ApiError::Envelope("Cart create returned no cart".to_string()))?
            }
        };

        self.store(cart.clone());
        Ok(cart)
    }

    /// Add `cantidad` units of a product.
    ///
    /// The cart is created lazily: with no snapshot loaded yet, the client's
    /// cart is fetched or created first. The line is always appended through
    /// the add endpoint with a price snapshot taken from the product's
    /// effective (discounted-else-base) price; the backend merges duplicate
    /// product lines.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error envelope.
    #[instrument(skip(self, product), fields(cliente = %client_id, producto = %product.id))]
    pub async fn add_item(
        &self,
        client_id: &ClientId,
        product: &Product,
        cantidad: u32,
    ) -> Result<Cart, ApiError> {
        let cart = match self.snapshot() {
            Some(cart) => cart,
            None => self.fetch_or_create(client_id).await?,
        };

        let request = AddLineRequest {
            producto_id: product.id.clone(),
            nombre: product.nombre.clone(),
            precio: product.effective_price(),
            cantidad,
        };
        let endpoint = format!("{}/{}/productos", endpoints::CARRITO, cart.id);
        let response: CartMutationResponse = self.api.post(&endpoint, &request).await?;
        self.adopt(response, &cart).await
    }

    /// Remove a product's line entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if no cart is loaded or the backend write fails.
    #[instrument(skip(self), fields(producto = %producto_id))]
    pub async fn remove_item(&self, producto_id: &ProductId) -> Result<Cart, ApiError> {
        let cart = self.require_cart()?;
        let endpoint = format!("{}/{}/productos", endpoints::CARRITO, cart.id);
        let request = RemoveLineRequest {
            producto_id: producto_id.clone(),
        };
        let response: CartMutationResponse = self.api.delete(&endpoint, &request).await?;
        self.adopt(response, &cart).await
    }

    /// Set a product's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns an error if no cart is loaded or the backend write fails.
    #[instrument(skip(self), fields(producto = %producto_id, cantidad))]
    pub async fn update_qty(
        &self,
        producto_id: &ProductId,
        cantidad: u32,
    ) -> Result<Cart, ApiError> {
        if cantidad == 0 {
            return self.remove_item(producto_id).await;
        }
        let cart = self.require_cart()?;
        self.replace_lines(&cart, lines_with_qty(&cart.productos, producto_id, cantidad))
            .await
    }

    /// Empty the cart without deleting it.
    ///
    /// # Errors
    ///
    /// Returns an error if no cart is loaded or the backend write fails.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<Cart, ApiError> {
        let cart = self.require_cart()?;
        self.replace_lines(&cart, Vec::new()).await
    }

    /// Drop the local snapshot (logout).
    pub fn reset(&self) {
        if let Ok(mut guard) = self.current.write() {
            *guard = None;
        }
    }

    async fn replace_lines(&self, cart: &Cart, productos: Vec<CartLine>) -> Result<Cart, ApiError> {
        let endpoint = format!("{}/{}", endpoints::CARRITO, cart.id);
        let request = ReplaceLinesRequest { productos };
        let response: CartMutationResponse = self.api.put(&endpoint, &request).await?;
        self.adopt(response, cart).await
    }

    /// Take the updated cart from a mutation response, refetching when the
    /// backend answered with a bare message.
    async fn adopt(&self, response: CartMutationResponse, previous: &Cart) -> Result<Cart, ApiError> {
        let cart = match response.carrito {
            Some(cart) => cart,
            None => {
                let endpoint = format!("{}/{}", endpoints::CARRITO, previous.id);
                self.api.get(&endpoint, &[]).await?
            }
        };
        self.store(cart.clone());
        Ok(cart)
    }

    fn store(&self, cart: Cart) {
        if let Ok(mut guard) = self.current.write() {
            *guard = Some(cart);
        }
    }

    fn require_cart(&self) -> Result<Cart, ApiError> {
        self.snapshot()
            .ok_or_else(|| ApiError::Envelope("No cart loaded for this session".to_string()))
    }
}

// =============================================================================
// Pure reconciliation helpers
// =============================================================================

/// Pick a client's working cart: the first still-active one, falling back to
/// the first document when every cart is closed (the backend reopens it on
/// the next write).
#[must_use]
pub fn pick_client_cart(carts: Vec<Cart>) -> Option<Cart> {
    let fallback = carts.first().cloned();
    carts
        .into_iter()
        .find(|cart| cart.estado.is_active())
        .or(fallback)
}

/// Rebuild a line list with one product's quantity changed, everything else
/// untouched and in order. Line subtotals are dropped so the server recomputes
/// them.
#[must_use]
pub fn lines_with_qty(lines: &[CartLine], producto_id: &ProductId, cantidad: u32) -> Vec<CartLine> {
    lines
        .iter()
        .map(|line| {
            let mut line = line.clone();
            line.subtotal = None;
            if line.producto_id == *producto_id {
                line.cantidad = cantidad;
            }
            line
        })
        .collect()
}

/// Total units across all lines.
#[must_use]
pub fn line_count(lines: &[CartLine]) -> u32 {
    lines.iter().map(|line| line.cantidad).sum()
}

/// Server total when present, else the sum over lines.
#[must_use]
pub fn cart_total(cart: &Cart) -> Price {
    cart.total.unwrap_or_else(|| {
        cart.productos
            .iter()
            .map(|line| line.precio * line.cantidad)
            .sum()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use aurora_core::CartStatus;

    fn line(id: &str, cantidad: u32, cents: i64) -> CartLine {
        CartLine {
            producto_id: ProductId::new(id),
            nombre: format!("Producto {id}"),
            precio: Price::from_cents(cents),
            cantidad,
            subtotal: None,
        }
    }

    fn cart(lines: Vec<CartLine>, estado: CartStatus) -> Cart {
        Cart {
            id: aurora_core::CartId::new("c1"),
            cliente_id: crate::api::types::ClientRef::Id(ClientId::new("u1")),
            productos: lines,
            total: None,
            estado,
        }
    }

    #[test]
    fn test_pick_cart_prefers_first_active() {
        let carts = vec![
            cart(vec![], CartStatus::Finalizado),
            cart(vec![line("a", 1, 100)], CartStatus::Activo),
            cart(vec![], CartStatus::Activo),
        ];
        let picked = pick_client_cart(carts).unwrap();
        assert_eq!(picked.productos.len(), 1);
    }

    #[test]
    fn test_pick_cart_falls_back_to_first_when_all_closed() {
        let carts = vec![
            cart(vec![line("a", 2, 100)], CartStatus::Finalizado),
            cart(vec![], CartStatus::Cancelado),
        ];
        let picked = pick_client_cart(carts).unwrap();
        assert_eq!(picked.estado, CartStatus::Finalizado);
        assert!(pick_client_cart(Vec::new()).is_none());
    }

    #[test]
    fn test_update_qty_leaves_other_lines_unchanged() {
        let lines = vec![line("a", 1, 1000), line("b", 2, 2000), line("c", 3, 3000)];
        let rebuilt = lines_with_qty(&lines, &ProductId::new("b"), 7);

        assert_eq!(rebuilt.len(), 3);
        assert_eq!(rebuilt[0].cantidad, 1);
        assert_eq!(rebuilt[1].cantidad, 7);
        assert_eq!(rebuilt[2].cantidad, 3);
        assert_eq!(rebuilt[1].precio, Price::from_cents(2000));
    }

    #[test]
    fn test_sequential_qty_updates_do_not_revert_each_other() {
        // Each rebuild starts from the previous result, so updating "b" must
        // not undo the earlier update of "a".
        let lines = vec![line("a", 1, 1000), line("b", 1, 2000)];
        let after_a = lines_with_qty(&lines, &ProductId::new("a"), 5);
        let after_b = lines_with_qty(&after_a, &ProductId::new("b"), 9);

        assert_eq!(after_b[0].cantidad, 5);
        assert_eq!(after_b[1].cantidad, 9);
    }

    #[test]
    fn test_rebuild_drops_stale_subtotals() {
        let mut stale = line("a", 2, 1000);
        stale.subtotal = Some(Price::from_cents(2000));
        let rebuilt = lines_with_qty(&[stale], &ProductId::new("a"), 3);
        assert!(rebuilt[0].subtotal.is_none());
    }

    #[test]
    fn test_line_count_sums_quantities() {
        let lines = vec![line("a", 2, 100), line("b", 3, 200)];
        assert_eq!(line_count(&lines), 5);
        assert_eq!(line_count(&[]), 0);
    }

    #[test]
    fn test_cart_total_prefers_server_figure() {
        let mut c = cart(vec![line("a", 2, 1000)], CartStatus::Activo);
        assert_eq!(cart_total(&c), Price::from_cents(2000));

        c.total = Some(Price::from_cents(1850));
        assert_eq!(cart_total(&c), Price::from_cents(1850));
    }

    #[tokio::test]
    async fn test_add_item_without_snapshot_fetches_the_cart() {
        // Nothing loaded yet: add must go through fetch-or-create and hit
        // the backend, not fail on the missing snapshot.
        let api = ApiClient::new(url::Url::parse("http://127.0.0.1:1/api").unwrap());
        let service = CartService::new(api);
        let product: Product = serde_json::from_value(serde_json::json!({
            "_id": "p1",
            "nombre": "Aviador",
            "precioBase": 100.0
        }))
        .unwrap();

        let err = service
            .add_item(&ClientId::new("u1"), &product, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Http(_)), "got {err:?}");
    }

    #[test]
    fn test_add_then_remove_restores_line_set() {
        // Appending a line and then rebuilding without it yields the original
        // line set, which is what the remove endpoint does server-side.
        let original = vec![line("a", 1, 1000), line("b", 2, 2000)];

        let mut with_new = original.clone();
        with_new.push(line("c", 1, 3000));

        let removed: Vec<CartLine> = with_new
            .into_iter()
            .filter(|l| l.producto_id != ProductId::new("c"))
            .collect();
        assert_eq!(removed, original);
    }
}
