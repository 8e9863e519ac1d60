//! Checkout: form validation, payment, and sale creation.
//!
//! Card payments go through the backend's Wompi tokenless endpoint first;
//! only an approved transaction creates the sale. Cash sales are created
//! directly and report change due. Validation stops at the first failing
//! check so the caller gets one actionable message at a time.

use aurora_core::{BranchId, ClientId, Email, EmployeeId, Price};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use crate::api::types::{Cart, CartLine};
use crate::api::{ApiClient, ApiError, endpoints};

/// Payment method selected at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "efectivo")]
    Efectivo,
    #[serde(rename = "tarjeta")]
    Tarjeta,
}

/// Card details for a Wompi tokenless charge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub numero: String,
    pub cvc: String,
    pub mes_expiracion: String,
    pub anio_expiracion: String,
    pub titular: String,
}

/// Checkout form as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub nombre: String,
    pub correo: String,
    pub telefono: String,
    #[serde(default)]
    pub direccion: String,
    /// Salvadoran national id, optional on the billing record.
    #[serde(default)]
    pub dui: Option<String>,
    #[serde(default)]
    pub observaciones: Option<String>,
    /// Branch the sale is attributed to.
    #[serde(default)]
    pub sucursal_id: Option<BranchId>,
    /// Employee registering the sale.
    #[serde(default)]
    pub empleado_id: Option<EmployeeId>,
    pub metodo_pago: PaymentMethod,
    /// Cash tendered; required for `Efectivo`.
    #[serde(default)]
    pub monto_pagado: Option<Price>,
    /// Card details; required for `Tarjeta`.
    #[serde(default)]
    pub tarjeta: Option<CardDetails>,
}

/// First failing validation check on a checkout form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("El carrito está vacío")]
    EmptyCart,
    #[error("Selecciona una sucursal")]
    MissingBranch,
    #[error("Selecciona un empleado")]
    MissingEmployee,
    #[error("El nombre es obligatorio")]
    MissingName,
    #[error("El correo no es válido")]
    InvalidEmail,
    #[error("El teléfono es obligatorio")]
    MissingPhone,
    #[error("El monto pagado es insuficiente")]
    InsufficientPayment,
    #[error("Los datos de la tarjeta están incompletos")]
    IncompleteCard,
    #[error("El número de tarjeta no es válido")]
    InvalidCardNumber,
}

impl CheckoutForm {
    /// Validate against a cart total, stopping at the first failing check.
    ///
    /// Check order: non-empty cart, branch, employee, the selected payment
    /// method's own fields, then billing (name, email, phone).
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn validate(&self, total: Price, line_count: u32) -> Result<(), CheckoutError> {
        if line_count == 0 {
            return Err(CheckoutError::EmptyCart);
        }
        if !id_present(self.sucursal_id.as_ref().map(BranchId::as_str)) {
            return Err(CheckoutError::MissingBranch);
        }
        if !id_present(self.empleado_id.as_ref().map(EmployeeId::as_str)) {
            return Err(CheckoutError::MissingEmployee);
        }
        match self.metodo_pago {
            PaymentMethod::Efectivo => {
                let paid = self.monto_pagado.unwrap_or(Price::ZERO);
                if paid < total {
                    return Err(CheckoutError::InsufficientPayment);
                }
            }
            PaymentMethod::Tarjeta => {
                let Some(card) = &self.tarjeta else {
                    return Err(CheckoutError::IncompleteCard);
                };
                if card.cvc.trim().is_empty()
                    || card.mes_expiracion.trim().is_empty()
                    || card.anio_expiracion.trim().is_empty()
                    || card.titular.trim().is_empty()
                {
                    return Err(CheckoutError::IncompleteCard);
                }
                let digits = card.numero.chars().filter(char::is_ascii_digit).count();
                if digits < 13 || digits > 19 {
                    return Err(CheckoutError::InvalidCardNumber);
                }
            }
        }
        if self.nombre.trim().is_empty() {
            return Err(CheckoutError::MissingName);
        }
        if Email::parse(&self.correo).is_err() {
            return Err(CheckoutError::InvalidEmail);
        }
        if self.telefono.trim().is_empty() {
            return Err(CheckoutError::MissingPhone);
        }
        Ok(())
    }
}

fn id_present(id: Option<&str>) -> bool {
    id.is_some_and(|id| !id.trim().is_empty())
}

/// Change owed on a cash sale. Never negative; overpayment below the total
/// is caught by validation before this is computed.
#[must_use]
pub fn change_due(total: Price, paid: Price) -> Price {
    if paid < total {
        Price::ZERO
    } else {
        Price::from(paid.amount() - total.amount())
    }
}

// =============================================================================
// Wire types
// =============================================================================

/// Body for `POST /wompi/tokenless` (3DS charge without a stored token).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WompiTokenlessRequest {
    numero_tarjeta: String,
    cvc: String,
    mes_expiracion: String,
    anio_expiracion: String,
    nombre_titular: String,
    /// Amount in cents, as Wompi expects.
    monto: i64,
    correo: String,
}

#[derive(Debug, Deserialize)]
struct WompiResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "idTransaccion")]
    id_transaccion: Option<String>,
}

/// Body for `POST /ventas`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaleRequest {
    cliente_id: ClientId,
    carrito_id: String,
    sucursal_id: BranchId,
    empleado_id: EmployeeId,
    productos: Vec<CartLine>,
    total: Price,
    metodo_pago: PaymentMethod,
    nombre_cliente: String,
    correo_cliente: String,
    telefono_cliente: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    direccion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dui: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    observaciones: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id_transaccion: Option<String>,
}

/// Outcome of a completed checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub venta_id: Option<String>,
    pub total: Price,
    pub metodo_pago: PaymentMethod,
    /// Cash change owed; zero for card payments.
    pub cambio: Price,
    pub id_transaccion: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SaleResponse {
    #[serde(default, rename = "_id", alias = "ventaId")]
    id: Option<String>,
}

/// Errors from the payment/sale flow, beyond form validation.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error(transparent)]
    Validation(#[from] CheckoutError),
    #[error("Pago rechazado: {0}")]
    Declined(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Payment and sale creation against the backend.
pub struct CheckoutService {
    api: ApiClient,
}

impl CheckoutService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Run the full checkout: validate, charge (card only), create the sale.
    ///
    /// The backend finalizes the cart when the sale is created; the caller
    /// should refetch or reset its cart snapshot afterwards.
    ///
    /// # Errors
    ///
    /// Returns a validation error, a declined charge, or a transport error.
    #[instrument(skip(self, cart, form), fields(carrito = %cart.id))]
    pub async fn submit(
        &self,
        cart: &Cart,
        form: &CheckoutForm,
    ) -> Result<CheckoutReceipt, PaymentError> {
        let total = super::cart::cart_total(cart);
        let line_count = super::cart::line_count(&cart.productos);
        form.validate(total, line_count)?;

        let id_transaccion = match form.metodo_pago {
            PaymentMethod::Tarjeta => Some(self.charge_card(form, total).await?),
            PaymentMethod::Efectivo => None,
        };

        let request = SaleRequest {
            cliente_id: cart.cliente_id.id().clone(),
            carrito_id: cart.id.to_string(),
            // Validation guarantees both are present
            sucursal_id: form
                .sucursal_id
                .clone()
                .ok_or(CheckoutError::MissingBranch)?,
            empleado_id: form
                .empleado_id
                .clone()
                .ok_or(CheckoutError::MissingEmployee)?,
            productos: cart.productos.clone(),
            total,
            metodo_pago: form.metodo_pago,
            nombre_cliente: form.nombre.clone(),
            correo_cliente: form.correo.clone(),
            telefono_cliente: form.telefono.clone(),
            direccion: form.direccion.clone(),
            dui: form.dui.clone(),
            observaciones: form.observaciones.clone(),
            id_transaccion: id_transaccion.clone(),
        };
        let sale: SaleResponse = self.api.post(endpoints::VENTAS, &request).await?;

        let cambio = match form.metodo_pago {
            PaymentMethod::Efectivo => {
                change_due(total, form.monto_pagado.unwrap_or(Price::ZERO))
            }
            PaymentMethod::Tarjeta => Price::ZERO,
        };

        info!(venta = ?sale.id, "Sale created");
        Ok(CheckoutReceipt {
            venta_id: sale.id,
            total,
            metodo_pago: form.metodo_pago,
            cambio,
            id_transaccion,
        })
    }

    /// Charge the card through the Wompi tokenless endpoint.
    async fn charge_card(&self, form: &CheckoutForm, total: Price) -> Result<String, PaymentError> {
        // Validation guarantees the card is present
        let card = form.tarjeta.as_ref().ok_or(CheckoutError::IncompleteCard)?;

        let request = WompiTokenlessRequest {
            numero_tarjeta: card.numero.chars().filter(char::is_ascii_digit).collect(),
            cvc: card.cvc.clone(),
            mes_expiracion: card.mes_expiracion.clone(),
            anio_expiracion: card.anio_expiracion.clone(),
            nombre_titular: card.titular.clone(),
            monto: total.cents(),
            correo: form.correo.clone(),
        };
        let response: WompiResponse = self.api.post(endpoints::WOMPI_TOKENLESS, &request).await?;

        match (response.success, response.id_transaccion) {
            (true, Some(id)) => Ok(id),
            (true, None) => Ok(String::new()),
            (false, _) => Err(PaymentError::Declined(
                response
                    .message
                    .unwrap_or_else(|| "La transacción fue rechazada".to_string()),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base_form() -> CheckoutForm {
        CheckoutForm {
            nombre: "Ana Morales".to_string(),
            correo: "ana@optica.sv".to_string(),
            telefono: "7777-0000".to_string(),
            direccion: String::new(),
            dui: None,
            observaciones: None,
            sucursal_id: Some(BranchId::new("suc1")),
            empleado_id: Some(EmployeeId::new("emp1")),
            metodo_pago: PaymentMethod::Efectivo,
            monto_pagado: Some(Price::from_cents(10000)),
            tarjeta: None,
        }
    }

    #[test]
    fn test_validation_stops_at_first_failure() {
        let mut form = base_form();
        form.nombre = "  ".to_string();
        form.correo = "no-arroba".to_string();
        // Name is checked before email
        assert_eq!(
            form.validate(Price::from_cents(100), 1),
            Err(CheckoutError::MissingName)
        );
    }

    #[test]
    fn test_validation_rejects_bad_email() {
        let mut form = base_form();
        form.correo = "sin-arroba.com".to_string();
        assert_eq!(
            form.validate(Price::from_cents(100), 1),
            Err(CheckoutError::InvalidEmail)
        );
    }

    #[test]
    fn test_branch_and_employee_required() {
        let mut form = base_form();
        form.sucursal_id = None;
        form.empleado_id = None;
        // Branch is checked before employee
        assert_eq!(
            form.validate(Price::from_cents(100), 1),
            Err(CheckoutError::MissingBranch)
        );

        form.sucursal_id = Some(BranchId::new("suc1"));
        assert_eq!(
            form.validate(Price::from_cents(100), 1),
            Err(CheckoutError::MissingEmployee)
        );

        form.empleado_id = Some(EmployeeId::new("  "));
        assert_eq!(
            form.validate(Price::from_cents(100), 1),
            Err(CheckoutError::MissingEmployee)
        );
    }

    #[test]
    fn test_form_reads_branch_and_employee_keys() {
        let form: CheckoutForm = serde_json::from_value(serde_json::json!({
            "nombre": "Ana Morales",
            "correo": "ana@optica.sv",
            "telefono": "7777-0000",
            "metodoPago": "efectivo",
            "montoPagado": 100.0,
            "sucursalId": "suc9",
            "empleadoId": "emp9"
        }))
        .unwrap();

        assert_eq!(form.sucursal_id.as_ref().map(BranchId::as_str), Some("suc9"));
        assert_eq!(
            form.empleado_id.as_ref().map(EmployeeId::as_str),
            Some("emp9")
        );
        assert!(form.validate(Price::from_cents(10000), 1).is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_cart() {
        let form = base_form();
        assert_eq!(
            form.validate(Price::ZERO, 0),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn test_cash_requires_sufficient_payment() {
        let mut form = base_form();
        form.monto_pagado = Some(Price::from_cents(500));
        assert_eq!(
            form.validate(Price::from_cents(1000), 1),
            Err(CheckoutError::InsufficientPayment)
        );

        form.monto_pagado = Some(Price::from_cents(1000));
        assert!(form.validate(Price::from_cents(1000), 1).is_ok());
    }

    #[test]
    fn test_card_fields_required() {
        let mut form = base_form();
        form.metodo_pago = PaymentMethod::Tarjeta;
        form.tarjeta = None;
        assert_eq!(
            form.validate(Price::from_cents(1000), 1),
            Err(CheckoutError::IncompleteCard)
        );

        form.tarjeta = Some(CardDetails {
            numero: "4242 4242 4242 4242".to_string(),
            cvc: "123".to_string(),
            mes_expiracion: "12".to_string(),
            anio_expiracion: "29".to_string(),
            titular: "ANA MORALES".to_string(),
        });
        assert!(form.validate(Price::from_cents(1000), 1).is_ok());
    }

    #[test]
    fn test_card_number_length_bounds() {
        let mut form = base_form();
        form.metodo_pago = PaymentMethod::Tarjeta;
        form.tarjeta = Some(CardDetails {
            numero: "1234".to_string(),
            cvc: "123".to_string(),
            mes_expiracion: "12".to_string(),
            anio_expiracion: "29".to_string(),
            titular: "ANA".to_string(),
        });
        assert_eq!(
            form.validate(Price::from_cents(1000), 1),
            Err(CheckoutError::InvalidCardNumber)
        );
    }

    #[test]
    fn test_change_due_never_negative() {
        assert_eq!(
            change_due(Price::from_cents(1000), Price::from_cents(1500)),
            Price::from_cents(500)
        );
        assert_eq!(
            change_due(Price::from_cents(1000), Price::from_cents(800)),
            Price::ZERO
        );
        assert_eq!(
            change_due(Price::from_cents(1000), Price::from_cents(1000)),
            Price::ZERO
        );
    }
}
