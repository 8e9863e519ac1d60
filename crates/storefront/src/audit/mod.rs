//! Admin audit log viewer: paginated history, live SSE tail, exports.

pub mod export;
pub mod feed;
pub mod stream;

pub use feed::AuditFeed;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::api::types::AuditPage;
use crate::api::{ApiClient, ApiError, endpoints};

/// Default page size when the viewer does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Server-side filters for the audit history endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuditQuery {
    /// Free-text search over user, path, and summary.
    pub q: Option<String>,
    pub entity: Option<String>,
    pub method: Option<String>,
    pub status: Option<u16>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl AuditQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.unwrap_or(1).max(1).to_string()),
            ("limit", self.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1).to_string()),
        ];
        if let Some(q) = &self.q {
            params.push(("q", q.clone()));
        }
        if let Some(entity) = &self.entity {
            params.push(("entity", entity.clone()));
        }
        if let Some(method) = &self.method {
            params.push(("method", method.clone()));
        }
        if let Some(status) = self.status {
            params.push(("status", status.to_string()));
        }
        if let Some(from) = self.from {
            params.push(("from", from.to_rfc3339()));
        }
        if let Some(to) = self.to {
            params.push(("to", to.to_rfc3339()));
        }
        params
    }
}

/// Read access to the audit log.
pub struct AuditService {
    api: ApiClient,
}

impl AuditService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Fetch one page of audit history, with optional server-side filters.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error envelope.
    pub async fn fetch_page(&self, query: &AuditQuery) -> Result<AuditPage, ApiError> {
        let params = query.params();
        let body = self.api.get_raw(endpoints::AUDITORIA, &params).await?;
        let data = crate::api::envelope::normalize(body)?;

        // Older deployments answer with a bare array and no total
        if data.is_array() {
            let entries: Vec<crate::api::types::AuditEntry> = serde_json::from_value(data)?;
            let total = u64::try_from(entries.len()).unwrap_or(u64::MAX);
            return Ok(AuditPage {
                data: entries,
                total,
            });
        }
        Ok(serde_json::from_value(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_default_to_first_page() {
        let params = AuditQuery::default().params();
        assert!(params.contains(&("page", "1".to_string())));
        assert!(params.contains(&("limit", DEFAULT_PAGE_SIZE.to_string())));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_query_params_include_filters() {
        let query = AuditQuery {
            q: Some("ventas".to_string()),
            method: Some("DELETE".to_string()),
            status: Some(403),
            page: Some(2),
            ..Default::default()
        };
        let params = query.params();
        assert!(params.contains(&("q", "ventas".to_string())));
        assert!(params.contains(&("method", "DELETE".to_string())));
        assert!(params.contains(&("status", "403".to_string())));
        assert!(params.contains(&("page", "2".to_string())));
    }
}
