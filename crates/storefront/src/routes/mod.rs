//! HTTP route handlers for the storefront facade.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Health check
//! GET  /health/ready               - Readiness (probes the backend)
//!
//! # Catalog
//! GET  /products                   - Filter/sort/paginate the product grid
//! GET  /products/{tipo}/{id}       - Product detail (tipo: lentes|accesorios)
//! GET  /products/prefs             - Persisted filter/sort/view state
//! PUT  /products/prefs             - Save filter/sort/view state
//! GET  /products/search-history    - Recent searches, newest first
//! DELETE /products/search-history  - Clear recent searches
//!
//! # Auth
//! POST /auth/login                 - Log in against the backend
//! POST /auth/logout                - Clear session and bearer token
//! GET  /auth/me                    - Current user snapshot
//!
//! # Cart
//! POST /cart/load                  - Load or create the client's active cart
//! GET  /cart                       - Cart snapshot with count and total
//! POST /cart/add                   - Add a product (creates the cart if needed)
//! POST /cart/update                - Set a line quantity (0 removes)
//! POST /cart/remove                - Remove a line
//! POST /cart/clear                 - Empty the cart
//!
//! # Checkout
//! POST /checkout                   - Validate, charge (card), create sale
//!
//! # Quotes
//! POST   /quotes                   - Create a 30-day quote
//! GET    /quotes/client/{id}       - A client's quotes
//! GET    /quotes/{id}              - One quote
//! DELETE /quotes/{id}              - Delete a quote
//! POST   /quotes/{id}/convert      - Mark converted to an order
//!
//! # Appointments
//! GET  /appointments/branches      - Branch offices
//! GET  /appointments/optometrists  - Optometrists with availability
//! GET  /appointments/availability  - Weekly slot grid for one optometrist
//! POST /appointments               - Schedule an appointment
//!
//! # Audit (admin)
//! GET  /audit                      - Paginated history (seeds the feed)
//! GET  /audit/feed                 - Current in-memory feed
//! GET  /audit/live                 - SSE tail of new entries
//! GET  /audit/export.csv           - Feed as CSV
//! GET  /audit/export.json          - Feed as pretty JSON
//! ```

pub mod appointments;
pub mod audit;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod products;
pub mod quotes;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::browse))
        .route("/prefs", get(products::get_prefs).put(products::put_prefs))
        .route(
            "/search-history",
            get(products::search_history).delete(products::clear_search_history),
        )
        .route("/{tipo}/{id}", get(products::show))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/load", post(cart::load))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the quote routes router.
pub fn quote_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(quotes::create))
        .route("/client/{id}", get(quotes::list_for_client))
        .route("/{id}", get(quotes::show).delete(quotes::remove))
        .route("/{id}/convert", post(quotes::convert))
}

/// Create the appointment routes router.
pub fn appointment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(appointments::schedule))
        .route("/branches", get(appointments::branches))
        .route("/optometrists", get(appointments::optometrists))
        .route("/availability", get(appointments::availability))
}

/// Create the audit routes router.
pub fn audit_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(audit::history))
        .route("/feed", get(audit::feed))
        .route("/live", get(audit::live))
        .route("/export.csv", get(audit::export_csv))
        .route("/export.json", get(audit::export_json))
}

/// Assemble all routes under their prefixes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/auth", auth_routes())
        .nest("/cart", cart_routes())
        .nest("/quotes", quote_routes())
        .nest("/appointments", appointment_routes())
        .route("/checkout", post(checkout::submit))
        .nest("/audit", audit_routes())
}
