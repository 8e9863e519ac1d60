//! Appointment scheduling (citas).
//!
//! Customers book an optometrist visit at a branch. The storefront loads the
//! branch and optometrist lists, derives the bookable hour slots from each
//! optometrist's weekly availability, and posts the appointment with status
//! pending. Slot derivation is local; the backend stores what it is sent.

use aurora_core::{AppointmentStatus, BranchId, ClientId, EmployeeId};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::api::types::{Appointment, Branch, CreateAppointmentRequest, Optometrist};
use crate::api::{ApiClient, ApiError, endpoints};

/// Appointment request as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDraft {
    pub cliente_id: ClientId,
    pub optometrista_id: EmployeeId,
    pub sucursal_id: BranchId,
    pub fecha: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hora: String,
    #[serde(default)]
    pub motivo: String,
    #[serde(default)]
    pub tipo_lente: String,
    #[serde(default)]
    pub graduacion: String,
    #[serde(default)]
    pub notas_adicionales: String,
}

/// Errors from scheduling an appointment.
#[derive(Debug, Error)]
pub enum AppointmentError {
    /// One of the required fields is empty; one message covers them all,
    /// matching what the booking form shows.
    #[error("Completa todos los campos requeridos")]
    MissingFields,
    #[error("El optometrista seleccionado no atiende en la sucursal elegida")]
    BranchMismatch,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AppointmentDraft {
    /// Check that every required field is filled in.
    ///
    /// # Errors
    ///
    /// Returns `MissingFields` when any required field is empty.
    pub fn validate(&self) -> Result<(), AppointmentError> {
        let required = [
            self.cliente_id.as_str(),
            self.optometrista_id.as_str(),
            self.sucursal_id.as_str(),
            &self.hora,
            &self.motivo,
            &self.tipo_lente,
            &self.graduacion,
        ];
        if self.fecha.is_none() || required.iter().any(|field| field.trim().is_empty()) {
            return Err(AppointmentError::MissingFields);
        }
        Ok(())
    }
}

/// Appointment operations against the backend.
pub struct AppointmentService {
    api: ApiClient,
}

impl AppointmentService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// List the branch offices.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error envelope.
    pub async fn list_branches(&self) -> Result<Vec<Branch>, ApiError> {
        self.api.get(endpoints::SUCURSALES, &[]).await
    }

    /// List the optometrists with their availability.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error envelope.
    pub async fn list_optometrists(&self) -> Result<Vec<Optometrist>, ApiError> {
        self.api.get(endpoints::OPTOMETRISTAS, &[]).await
    }

    /// Schedule an appointment from a draft; new appointments start pending.
    ///
    /// # Errors
    ///
    /// Returns a validation error or a backend error.
    #[instrument(skip(self, draft), fields(cliente = %draft.cliente_id))]
    pub async fn schedule(&self, draft: AppointmentDraft) -> Result<Appointment, AppointmentError> {
        draft.validate()?;
        let fecha = draft.fecha.ok_or(AppointmentError::MissingFields)?;

        let request = CreateAppointmentRequest {
            cliente_id: draft.cliente_id,
            optometrista_id: draft.optometrista_id,
            sucursal_id: draft.sucursal_id,
            fecha,
            hora: draft.hora,
            estado: AppointmentStatus::Pendiente,
            motivo_cita: draft.motivo,
            tipo_lente: draft.tipo_lente,
            graduacion: draft.graduacion,
            notas_adicionales: draft.notas_adicionales,
        };
        let appointment: Appointment = self.api.post(endpoints::CITAS, &request).await?;
        info!(cita = %appointment.id, "Appointment scheduled");
        Ok(appointment)
    }
}

// =============================================================================
// Pure availability helpers
// =============================================================================

/// Canonical weekday keys for availability, Monday first.
pub const WEEK_DAYS: [&str; 7] = ["Lun", "Mar", "Mie", "Jue", "Vie", "Sab", "Dom"];

/// Whether an optometrist attends the given branch. Assignments may be
/// populated refs or bare ids; no assignments means attends nowhere.
#[must_use]
pub fn attends_branch(optometrist: &Optometrist, branch: &BranchId) -> bool {
    optometrist
        .sucursales_asignadas
        .iter()
        .any(|assigned| assigned.id() == branch)
}

/// Normalize a weekday as stored by the backend (Spanish or English names,
/// abbreviations, or 1-based numbers) to its canonical key.
#[must_use]
pub fn normalize_day(raw: &str) -> Option<&'static str> {
    if let Ok(n) = raw.trim().parse::<usize>() {
        return WEEK_DAYS.get(n.checked_sub(1)?).copied();
    }
    let key = raw.trim().to_lowercase();
    let canonical = match key.as_str() {
        "lun" | "lunes" | "mon" | "monday" => "Lun",
        "mar" | "martes" | "tue" | "tuesday" => "Mar",
        "mie" | "miercoles" | "miércoles" | "wed" | "wednesday" => "Mie",
        "jue" | "jueves" | "thu" | "thursday" => "Jue",
        "vie" | "viernes" | "fri" | "friday" => "Vie",
        "sab" | "sabado" | "sábado" | "sat" | "saturday" => "Sab",
        "dom" | "domingo" | "sun" | "sunday" => "Dom",
        _ => return None,
    };
    Some(canonical)
}

fn to_minutes(time: &str) -> Option<u32> {
    let (h, m) = time.trim().split_once(':')?;
    let hours: u32 = h.parse().ok()?;
    let minutes: u32 = m.parse().ok()?;
    Some(hours * 60 + minutes)
}

fn to_hour_str(minutes: u32) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

/// Hourly slots between a start (inclusive) and end (exclusive) time.
/// Unparseable or inverted windows yield nothing.
#[must_use]
pub fn hour_slots(inicio: Option<&str>, fin: Option<&str>) -> Vec<String> {
    let Some(start) = inicio.and_then(to_minutes) else {
        return Vec::new();
    };
    let Some(end) = fin.and_then(to_minutes) else {
        return Vec::new();
    };
    if end <= start {
        return Vec::new();
    }
    (start..end).step_by(60).map(to_hour_str).collect()
}

/// Bookable slots for one weekday of an optometrist's schedule: the union of
/// that day's windows, sorted and deduplicated.
#[must_use]
pub fn day_slots(optometrist: &Optometrist, dia: &str) -> Vec<String> {
    let mut minutes: Vec<u32> = optometrist
        .disponibilidad
        .iter()
        .filter(|window| normalize_day(&window.dia) == Some(dia))
        .flat_map(|window| {
            hour_slots(window.hora_inicio.as_deref(), window.hora_fin.as_deref())
        })
        .filter_map(|slot| to_minutes(&slot))
        .collect();
    minutes.sort_unstable();
    minutes.dedup();
    minutes.into_iter().map(to_hour_str).collect()
}
