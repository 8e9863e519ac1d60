//! Audit viewer route handlers.

use std::convert::Infallible;

use async_stream::stream;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::types::AuditEntry;
use crate::audit::{self, AuditQuery};
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HistoryReply {
    pub data: Vec<AuditEntry>,
    pub total: u64,
}

/// `GET /audit` - one page of history; also seeds the in-memory feed.
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<HistoryReply>> {
    let page = state.audit().fetch_page(&query).await?;

    state.audit_feed().replace_with_page(page.data.clone());
    Ok(Json(HistoryReply {
        data: page.data,
        total: page.total,
    }))
}

/// `GET /audit/feed` - the current in-memory feed, newest first.
pub async fn feed(State(state): State<AppState>) -> Json<Vec<AuditEntry>> {
    Json(state.audit_feed().snapshot())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LiveParams {
    /// Bearer token forwarded as a query parameter, the way `EventSource`
    /// clients authenticate.
    pub token: Option<String>,
}

/// `GET /audit/live` - SSE tail of new entries.
///
/// Each upstream entry is prepended to the feed and re-emitted to the
/// client. The upstream ending quietly ends this stream too; the viewer
/// reconnects the way an `EventSource` would.
pub async fn live(
    State(state): State<AppState>,
    Query(params): Query<LiveParams>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let upstream = audit::stream::subscribe(state.api(), params.token).await?;

    let events = stream! {
        use futures::StreamExt;

        let mut upstream = std::pin::pin!(upstream);
        while let Some(entry) = upstream.next().await {
            state.audit_feed().prepend(entry.clone());
            match Event::default().json_data(&entry) {
                Ok(event) => yield Ok(event),
                Err(e) => warn!(error = %e, "Could not serialize audit entry"),
            }
        }
    };

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// `GET /audit/export.csv` - the feed as CSV.
pub async fn export_csv(State(state): State<AppState>) -> ([(header::HeaderName, &'static str); 2], String) {
    let body = audit::export::to_csv(&state.audit_feed().snapshot());
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"auditoria.csv\"",
            ),
        ],
        body,
    )
}

/// `GET /audit/export.json` - the feed as pretty-printed JSON.
pub async fn export_json(
    State(state): State<AppState>,
) -> Result<([(header::HeaderName, &'static str); 2], String)> {
    let body = audit::export::to_pretty_json(&state.audit_feed().snapshot())
        .map_err(crate::api::ApiError::Parse)
        .map_err(crate::error::AppError::Api)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"auditoria.json\"",
            ),
        ],
        body,
    ))
}
