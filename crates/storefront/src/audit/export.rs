//! Audit feed exports: CSV and pretty-printed JSON.

use chrono::SecondsFormat;

use crate::api::types::AuditEntry;

const CSV_HEADER: &str = "timestamp,usuario,email,rol,metodo,ruta,status,entidad,accion,resumen";

/// Render entries as CSV with a header row.
///
/// Fields containing commas, quotes, or newlines are quoted per RFC 4180;
/// summaries additionally have newlines collapsed to spaces so one entry is
/// always one row.
#[must_use]
pub fn to_csv(entries: &[AuditEntry]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    for entry in entries {
        let timestamp = entry
            .timestamp
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default();
        let status = entry
            .response
            .status
            .map(|s| s.to_string())
            .unwrap_or_default();
        let summary = entry
            .action
            .summary
            .as_deref()
            .unwrap_or_default()
            .replace(['\n', '\r'], " ");

        let fields = [
            timestamp.as_str(),
            entry.user.nombre.as_deref().unwrap_or_default(),
            entry.user.email.as_deref().unwrap_or_default(),
            entry.user.rol.as_deref().unwrap_or_default(),
            entry.request.method.as_deref().unwrap_or_default(),
            entry.request.path.as_deref().unwrap_or_default(),
            status.as_str(),
            entry.action.entity.as_deref().unwrap_or_default(),
            entry.action.action_type.as_deref().unwrap_or_default(),
            summary.as_str(),
        ];

        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Render entries as indented JSON.
///
/// # Errors
///
/// Returns an error if serialization fails (it cannot for these types, but
/// the signature follows `serde_json`).
pub fn to_pretty_json(entries: &[AuditEntry]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(entries)
}

/// Quote a CSV field when it needs it, doubling embedded quotes.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::types::{AuditAction, AuditRequest, AuditResponse, AuditUser};

    fn entry(summary: &str) -> AuditEntry {
        AuditEntry {
            id: Some("a1".to_string()),
            timestamp: None,
            user: AuditUser {
                nombre: Some("Ana".to_string()),
                email: Some("ana@optica.sv".to_string()),
                rol: Some("admin".to_string()),
                cargo: None,
            },
            request: AuditRequest {
                method: Some("POST".to_string()),
                path: Some("/api/ventas".to_string()),
            },
            response: AuditResponse { status: Some(201) },
            action: AuditAction {
                entity: Some("venta".to_string()),
                action_type: Some("crear".to_string()),
                summary: Some(summary.to_string()),
            },
        }
    }

    #[test]
    fn test_csv_has_header_and_one_row_per_entry() {
        let csv = to_csv(&[entry("venta creada"), entry("otra venta")]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert!(lines[1].contains("ana@optica.sv"));
    }

    #[test]
    fn test_csv_quotes_commas_and_doubles_quotes() {
        let csv = to_csv(&[entry("venta \"grande\", con descuento")]);
        assert!(csv.contains("\"venta \"\"grande\"\", con descuento\""));
    }

    #[test]
    fn test_csv_strips_newlines_from_summary() {
        let csv = to_csv(&[entry("línea uno\nlínea dos")]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("línea uno línea dos"));
    }

    #[test]
    fn test_pretty_json_roundtrips() {
        let json = to_pretty_json(&[entry("resumen")]).unwrap();
        let back: Vec<AuditEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].action.summary.as_deref(), Some("resumen"));
    }
}
