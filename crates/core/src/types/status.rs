//! Status enums for carts, quotes, and appointments.
//!
//! Wire values are the Spanish strings the Aurora backend stores in MongoDB
//! (`estado` fields), so serde renames are explicit rather than derived.

use serde::{Deserialize, Serialize};

/// Shopping cart lifecycle status.
///
/// A client has at most one `Activo` cart at a time; checkout moves it to
/// `Finalizado`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CartStatus {
    #[default]
    #[serde(rename = "activo")]
    Activo,
    #[serde(rename = "finalizado")]
    Finalizado,
    #[serde(rename = "cancelado")]
    Cancelado,
}

impl CartStatus {
    /// Whether this cart can still be mutated.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Activo)
    }
}

/// Quote (cotización) lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum QuoteStatus {
    #[default]
    #[serde(rename = "pendiente")]
    Pendiente,
    #[serde(rename = "aprobada")]
    Aprobada,
    #[serde(rename = "rechazada")]
    Rechazada,
    #[serde(rename = "expirada")]
    Expirada,
    #[serde(rename = "convertida")]
    Convertida,
}

/// Appointment (cita) lifecycle status. New appointments start `Pendiente`;
/// staff move them along from the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AppointmentStatus {
    #[default]
    #[serde(rename = "pendiente")]
    Pendiente,
    #[serde(rename = "confirmada")]
    Confirmada,
    #[serde(rename = "completada")]
    Completada,
    #[serde(rename = "cancelada")]
    Cancelada,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_status_wire_values() {
        assert_eq!(
            serde_json::to_string(&CartStatus::Activo).unwrap(),
            "\"activo\""
        );
        let s: CartStatus = serde_json::from_str("\"finalizado\"").unwrap();
        assert_eq!(s, CartStatus::Finalizado);
    }

    #[test]
    fn test_is_active() {
        assert!(CartStatus::Activo.is_active());
        assert!(!CartStatus::Cancelado.is_active());
    }

    #[test]
    fn test_appointment_status_wire_values() {
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::Pendiente).unwrap(),
            "\"pendiente\""
        );
        let s: AppointmentStatus = serde_json::from_str("\"confirmada\"").unwrap();
        assert_eq!(s, AppointmentStatus::Confirmada);
    }

    #[test]
    fn test_quote_status_wire_values() {
        assert_eq!(
            serde_json::to_string(&QuoteStatus::Pendiente).unwrap(),
            "\"pendiente\""
        );
        let s: QuoteStatus = serde_json::from_str("\"convertida\"").unwrap();
        assert_eq!(s, QuoteStatus::Convertida);
    }
}
