//! Appointment scheduling route handlers.

use aurora_core::{BranchId, EmployeeId};
use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::api::types::{Appointment, Branch, Optometrist};
use crate::error::{AppError, Result};
use crate::services::appointments::{self, AppointmentDraft, AppointmentError};
use crate::state::AppState;

/// `GET /appointments/branches` - branch offices to book at.
pub async fn branches(State(state): State<AppState>) -> Result<Json<Vec<Branch>>> {
    Ok(Json(state.appointments().list_branches().await?))
}

/// `GET /appointments/optometrists` - optometrists with their availability.
pub async fn optometrists(State(state): State<AppState>) -> Result<Json<Vec<Optometrist>>> {
    Ok(Json(state.appointments().list_optometrists().await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityParams {
    pub optometrista_id: EmployeeId,
    #[serde(default)]
    pub sucursal_id: Option<BranchId>,
}

/// One weekday's bookable hour slots.
#[derive(Debug, Serialize)]
pub struct DaySlots {
    pub dia: &'static str,
    pub horas: Vec<String>,
}

/// Bookable hour slots per weekday, Monday first.
#[derive(Debug, Serialize)]
pub struct AvailabilityReply {
    pub dias: Vec<DaySlots>,
}

/// `GET /appointments/availability` - an optometrist's weekly slot grid.
///
/// With a branch given, rejects optometrists not assigned to it before any
/// slot is offered.
pub async fn availability(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<AvailabilityReply>> {
    let all = state.appointments().list_optometrists().await?;
    let optometrist = all
        .into_iter()
        .find(|opt| opt.id == params.optometrista_id)
        .ok_or_else(|| AppError::NotFound(params.optometrista_id.to_string()))?;

    if let Some(branch) = &params.sucursal_id
        && !appointments::attends_branch(&optometrist, branch)
    {
        return Err(AppError::Appointment(AppointmentError::BranchMismatch));
    }

    let dias = appointments::WEEK_DAYS
        .into_iter()
        .map(|dia| DaySlots {
            dia,
            horas: appointments::day_slots(&optometrist, dia),
        })
        .collect();
    Ok(Json(AvailabilityReply { dias }))
}

/// `POST /appointments` - schedule an appointment (starts pending).
pub async fn schedule(
    State(state): State<AppState>,
    Json(draft): Json<AppointmentDraft>,
) -> Result<Json<Appointment>> {
    let appointment = state.appointments().schedule(draft).await?;
    Ok(Json(appointment))
}
