//! Wire types for the Aurora backend API.
//!
//! Field names follow the backend's Spanish JSON (mongoose models); serde
//! renames map them onto Rust naming. Everything here is a transient copy
//! of backend state - the storefront never persists these.

use aurora_core::{
    AppointmentId, AppointmentStatus, BranchId, BrandId, CartId, CartStatus, CategoryId, ClientId,
    EmployeeId, Price, ProductId, QuoteId, QuoteStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog
// =============================================================================

/// A referenced entity the backend may send populated (`{_id, nombre}`) or
/// as a bare id string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamedRef<Id> {
    Populated {
        #[serde(rename = "_id")]
        id: Id,
        nombre: String,
    },
    Id(Id),
}

impl<Id> NamedRef<Id> {
    /// The referenced id, whether populated or bare.
    #[must_use]
    pub fn id(&self) -> &Id {
        match self {
            Self::Populated { id, .. } | Self::Id(id) => id,
        }
    }

    /// The display name, when the reference was populated.
    #[must_use]
    pub fn nombre(&self) -> Option<&str> {
        match self {
            Self::Populated { nombre, .. } => Some(nombre),
            Self::Id(_) => None,
        }
    }
}

/// A catalog product (lens or accessory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
    pub precio_base: Price,
    /// Current price after discounts; absent for products never discounted.
    #[serde(default)]
    pub precio_actual: Option<Price>,
    #[serde(default)]
    pub marca_id: Option<NamedRef<BrandId>>,
    #[serde(default)]
    pub categoria_id: Option<NamedRef<CategoryId>>,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub tipo_lente: String,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub imagenes: Vec<String>,
    #[serde(default)]
    pub en_promocion: bool,
}

impl Product {
    /// Effective price: the discounted price when present, else the base price.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        self.precio_actual.unwrap_or(self.precio_base)
    }

    /// Brand display name, empty when the reference is not populated.
    #[must_use]
    pub fn marca_nombre(&self) -> &str {
        self.marca_id
            .as_ref()
            .and_then(NamedRef::nombre)
            .unwrap_or("")
    }

    /// Category display name, empty when the reference is not populated.
    #[must_use]
    pub fn categoria_nombre(&self) -> &str {
        self.categoria_id
            .as_ref()
            .and_then(NamedRef::nombre)
            .unwrap_or("")
    }
}

/// Pagination metadata as returned by the list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub total_pages: u32,
}

/// One server page of a listing endpoint.
///
/// The backend sends either `{data, pagination}` or a bare array; a bare
/// array deserializes as a degenerate single page (see `ApiClient`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> Paginated<T> {
    /// Wrap a bare array response as a single page.
    #[must_use]
    pub fn single_page(data: Vec<T>) -> Self {
        Self {
            data,
            pagination: None,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One line in a cart: a product snapshot taken at add time.
///
/// `precio` is captured when the line is added and never re-synced against
/// the live product price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "productoId")]
    pub producto_id: ProductId,
    pub nombre: String,
    pub precio: Price,
    pub cantidad: u32,
    /// Server-computed precio * cantidad; not sent on writes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Price>,
}

/// A server-side shopping cart document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(rename = "_id")]
    pub id: CartId,
    #[serde(rename = "clienteId")]
    pub cliente_id: ClientRef,
    #[serde(default)]
    pub productos: Vec<CartLine>,
    #[serde(default)]
    pub total: Option<Price>,
    #[serde(default)]
    pub estado: CartStatus,
}

/// The backend populates `clienteId` on reads but echoes a bare id after
/// writes, so both shapes must deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientRef {
    Populated {
        #[serde(rename = "_id")]
        id: ClientId,
    },
    Id(ClientId),
}

impl ClientRef {
    #[must_use]
    pub const fn id(&self) -> &ClientId {
        match self {
            Self::Populated { id } | Self::Id(id) => id,
        }
    }
}

/// Body for `POST /carrito` (create a cart).
#[derive(Debug, Clone, Serialize)]
pub struct CreateCartRequest {
    #[serde(rename = "clienteId")]
    pub cliente_id: ClientId,
    pub productos: Vec<CartLine>,
}

/// Body for `POST /carrito/:id/productos` (append one line).
#[derive(Debug, Clone, Serialize)]
pub struct AddLineRequest {
    #[serde(rename = "productoId")]
    pub producto_id: ProductId,
    pub nombre: String,
    pub precio: Price,
    pub cantidad: u32,
}

/// Body for `DELETE /carrito/:id/productos` (remove one line).
#[derive(Debug, Clone, Serialize)]
pub struct RemoveLineRequest {
    #[serde(rename = "productoId")]
    pub producto_id: ProductId,
}

/// Body for `PUT /carrito/:id` (full line-list replace).
#[derive(Debug, Clone, Serialize)]
pub struct ReplaceLinesRequest {
    pub productos: Vec<CartLine>,
}

/// Cart mutation responses wrap the updated document as `carrito`.
#[derive(Debug, Clone, Deserialize)]
pub struct CartMutationResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub carrito: Option<Cart>,
}

// =============================================================================
// Auth
// =============================================================================

/// Authenticated user snapshot (also what the JWT payload decodes to).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct User {
    #[serde(default, alias = "_id")]
    pub id: Option<ClientId>,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default, alias = "correo")]
    pub email: Option<String>,
    #[serde(default)]
    pub rol: Option<String>,
    /// Position/title, fetched from the employees endpoint when absent.
    #[serde(default)]
    pub cargo: Option<String>,
}

/// Body for `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub correo: String,
    pub password: String,
}

/// Response from `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

// =============================================================================
// Quotes (cotizaciones)
// =============================================================================

/// Optional per-line customization on a quote item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteCustomization {
    pub nombre: String,
    pub precio: Price,
    pub cantidad: u32,
}

/// One quoted product line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    pub producto_id: ProductId,
    pub nombre: String,
    pub categoria: String,
    pub cantidad: u32,
    pub precio_unitario: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Price>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub personalizaciones: Vec<QuoteCustomization>,
}

/// A customer price quote, convertible into an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(rename = "_id")]
    pub id: QuoteId,
    pub cliente_id: ClientId,
    #[serde(default)]
    pub correo_cliente: Option<String>,
    #[serde(default)]
    pub telefono_cliente: Option<String>,
    pub fecha: DateTime<Utc>,
    pub productos: Vec<QuoteItem>,
    #[serde(default)]
    pub total: Option<Price>,
    pub valida_hasta: DateTime<Utc>,
    #[serde(default)]
    pub estado: QuoteStatus,
}

/// Body for `POST /cotizaciones`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    pub cliente_id: ClientId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correo_cliente: Option<String>,
    pub telefono_cliente: String,
    pub fecha: DateTime<Utc>,
    pub productos: Vec<QuoteItem>,
    pub total: Price,
    pub valida_hasta: DateTime<Utc>,
    pub estado: QuoteStatus,
}

// =============================================================================
// Audit log
// =============================================================================

/// Acting user recorded on an audit entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditUser {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub rol: Option<String>,
    #[serde(default)]
    pub cargo: Option<String>,
}

/// Request half of an audit entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRequest {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// Response half of an audit entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResponse {
    #[serde(default)]
    pub status: Option<u16>,
}

/// What the audited request did, as classified by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditAction {
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default, rename = "type")]
    pub action_type: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// One audit log entry. Read-only from the storefront's perspective.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: AuditUser,
    #[serde(default)]
    pub request: AuditRequest,
    #[serde(default)]
    pub response: AuditResponse,
    #[serde(default)]
    pub action: AuditAction,
}

/// Response of `GET /auditoria`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditPage {
    #[serde(default)]
    pub data: Vec<AuditEntry>,
    #[serde(default)]
    pub total: u64,
}

// =============================================================================
// Appointments
// =============================================================================

/// A branch office (sucursal).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    #[serde(rename = "_id")]
    pub id: BranchId,
    pub nombre: String,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
}

/// One weekday window in an optometrist's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindow {
    pub dia: String,
    #[serde(default)]
    pub hora_inicio: Option<String>,
    #[serde(default)]
    pub hora_fin: Option<String>,
}

/// An optometrist, with availability windows and assigned branches. Branch
/// assignments may come populated or as bare ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Optometrist {
    #[serde(rename = "_id")]
    pub id: EmployeeId,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub disponibilidad: Vec<AvailabilityWindow>,
    #[serde(default)]
    pub sucursales_asignadas: Vec<NamedRef<BranchId>>,
}

/// A scheduled appointment (cita).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id")]
    pub id: AppointmentId,
    pub cliente_id: ClientId,
    pub optometrista_id: NamedRef<EmployeeId>,
    pub sucursal_id: NamedRef<BranchId>,
    pub fecha: DateTime<Utc>,
    pub hora: String,
    #[serde(default)]
    pub estado: AppointmentStatus,
    #[serde(default)]
    pub motivo_cita: String,
    #[serde(default)]
    pub tipo_lente: String,
    #[serde(default)]
    pub graduacion: String,
    #[serde(default)]
    pub notas_adicionales: String,
}

/// Body for `POST /citas`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub cliente_id: ClientId,
    pub optometrista_id: EmployeeId,
    pub sucursal_id: BranchId,
    pub fecha: DateTime<Utc>,
    pub hora: String,
    pub estado: AppointmentStatus,
    pub motivo_cita: String,
    pub tipo_lente: String,
    pub graduacion: String,
    pub notas_adicionales: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_effective_price() {
        let mut product: Product = serde_json::from_value(json!({
            "_id": "64f7b2c8a1b2c3d4e5f6a7b8",
            "nombre": "Aviador Clásico",
            "descripcion": "Armazón metálico",
            "precioBase": 120.0,
            "precioActual": 99.5,
            "material": "metal",
            "color": "dorado",
            "tipoLente": "sol",
            "enPromocion": true
        }))
        .unwrap();

        assert_eq!(product.effective_price(), Price::from_cents(9950));

        product.precio_actual = None;
        assert_eq!(product.effective_price(), Price::from_cents(12000));
    }

    #[test]
    fn test_named_ref_both_shapes() {
        let populated: NamedRef<BrandId> =
            serde_json::from_value(json!({"_id": "abc", "nombre": "Ray-Ban"})).unwrap();
        assert_eq!(populated.nombre(), Some("Ray-Ban"));

        let bare: NamedRef<BrandId> = serde_json::from_value(json!("abc")).unwrap();
        assert_eq!(bare.nombre(), None);
    }

    #[test]
    fn test_cart_deserializes_populated_and_bare_client() {
        let populated: Cart = serde_json::from_value(json!({
            "_id": "c1",
            "clienteId": {"_id": "u1", "nombre": "Ana", "correo": "ana@example.com"},
            "productos": [],
            "total": 0,
            "estado": "activo"
        }))
        .unwrap();
        assert_eq!(populated.cliente_id.id().as_str(), "u1");

        let bare: Cart = serde_json::from_value(json!({
            "_id": "c2",
            "clienteId": "u2",
            "productos": []
        }))
        .unwrap();
        assert_eq!(bare.cliente_id.id().as_str(), "u2");
        assert_eq!(bare.estado, CartStatus::Activo);
    }

    #[test]
    fn test_cart_line_write_omits_subtotal() {
        let line = CartLine {
            producto_id: ProductId::new("p1"),
            nombre: "Aviador".to_string(),
            precio: Price::from_cents(9950),
            cantidad: 2,
            subtotal: None,
        };
        let json = serde_json::to_value(&line).unwrap();
        assert!(json.get("subtotal").is_none());
        assert_eq!(json.get("productoId").unwrap(), "p1");
    }

    #[test]
    fn test_audit_entry_tolerates_sparse_payloads() {
        let entry: AuditEntry = serde_json::from_value(json!({
            "request": {"method": "POST", "path": "/api/ventas"},
            "response": {"status": 201}
        }))
        .unwrap();
        assert_eq!(entry.request.method.as_deref(), Some("POST"));
        assert_eq!(entry.response.status, Some(201));
        assert!(entry.user.nombre.is_none());
    }
}
