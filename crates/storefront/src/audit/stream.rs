//! Live audit entries over SSE.
//!
//! The backend pushes batches of new audit entries; each `data:` event
//! carries a JSON array (a lone object is tolerated). The token travels as
//! a query parameter because `EventSource`-style clients cannot set headers,
//! and the backend kept that contract.

use async_stream::stream;
use futures::Stream;
use tracing::warn;

use crate::api::types::AuditEntry;
use crate::api::{ApiClient, ApiError, endpoints};

/// Open the audit SSE stream.
///
/// The returned stream yields entries until the connection drops. Transport
/// errors and malformed events end or skip quietly (logged at warn); the
/// consumer resubscribes when the stream ends, mirroring how `EventSource`
/// reconnects.
///
/// # Errors
///
/// Returns an error if the stream cannot be opened (bad status, transport).
pub async fn subscribe(
    api: &ApiClient,
    token: Option<String>,
) -> Result<impl Stream<Item = AuditEntry> + use<>, ApiError> {
    let endpoint = format!("{}/stream", endpoints::AUDITORIA);
    let params: Vec<(&str, String)> = token.into_iter().map(|t| ("token", t)).collect();
    let response = api.get_stream(&endpoint, &params).await?;

    Ok(stream! {
        use futures::StreamExt;

        let mut buffer = String::new();
        let mut byte_stream = std::pin::pin!(response.bytes_stream());

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!(error = %e, "Audit stream dropped");
                    break;
                }
            };

            let text = match std::str::from_utf8(&chunk) {
                Ok(t) => t,
                Err(e) => {
                    warn!(error = %e, "Invalid UTF-8 in audit stream");
                    continue;
                }
            };

            buffer.push_str(text);

            while let Some(event) = extract_sse_event(&mut buffer) {
                for entry in parse_sse_event(&event) {
                    yield entry;
                }
            }
        }
    })
}

/// Extract a complete SSE event from the buffer.
///
/// Events end at a blank line, LF or CRLF framed; a partial event stays
/// buffered.
fn extract_sse_event(buffer: &mut String) -> Option<String> {
    let lf = buffer.find("\n\n").map(|idx| (idx, 2));
    let crlf = buffer.find("\r\n\r\n").map(|idx| (idx, 4));
    let (idx, sep_len) = match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 < b.0 { a } else { b }),
        (a, b) => a.or(b),
    }?;

    let event = buffer[..idx].to_string();
    *buffer = buffer[idx + sep_len..].to_string();
    Some(event)
}

/// Parse one SSE event into audit entries.
///
/// Multiple `data:` lines in one event concatenate with newlines, per the
/// SSE framing. Comment lines (`: keepalive`), events without a `data:`
/// line, and unparseable payloads yield nothing. A payload may be a batch
/// array or a single entry object.
fn parse_sse_event(event: &str) -> Vec<AuditEntry> {
    if event.trim().is_empty() {
        return Vec::new();
    }

    let mut data_lines: Vec<&str> = Vec::new();
    for line in event.lines() {
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if data_lines.is_empty() {
        return Vec::new();
    }
    let data = data_lines.join("\n");

    if data == "[DONE]" {
        return Vec::new();
    }

    match serde_json::from_str::<serde_json::Value>(&data) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        Ok(value) => serde_json::from_value(value).map_or_else(
            |e| {
                warn!(error = %e, "Unparseable audit stream entry");
                Vec::new()
            },
            |entry| vec![entry],
        ),
        Err(e) => {
            warn!(error = %e, "Unparseable audit stream payload");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // The stream owns the response, so it must outlive the `&ApiClient`
    // borrow it was opened with; handlers move it into their own streams.
    #[allow(dead_code)]
    async fn subscribed_stream_is_static(
        api: ApiClient,
    ) -> impl Stream<Item = AuditEntry> + 'static {
        match subscribe(&api, None).await {
            Ok(stream) => stream,
            Err(e) => panic!("{e}"),
        }
    }

    #[test]
    fn test_extract_sse_event() {
        let mut buffer =
            "data: {\"a\":1}\n\ndata: {\"b\":2}\n\ndata: partial".to_string();

        assert_eq!(
            extract_sse_event(&mut buffer).as_deref(),
            Some("data: {\"a\":1}")
        );
        assert_eq!(
            extract_sse_event(&mut buffer).as_deref(),
            Some("data: {\"b\":2}")
        );
        // The trailing partial event stays buffered
        assert!(extract_sse_event(&mut buffer).is_none());
        assert_eq!(buffer, "data: partial");
    }

    #[test]
    fn test_extract_sse_event_crlf_framing() {
        let mut buffer = "data: {\"a\":1}\r\n\r\ndata: partial".to_string();
        assert_eq!(
            extract_sse_event(&mut buffer).as_deref(),
            Some("data: {\"a\":1}")
        );
        assert!(extract_sse_event(&mut buffer).is_none());
        assert_eq!(buffer, "data: partial");
    }

    #[test]
    fn test_parse_joins_multiple_data_lines() {
        // A payload split across data lines rejoins with newlines
        let event = "data: [{\"response\":{\"status\":200}},\ndata: {\"response\":{\"status\":201}}]";
        let entries = parse_sse_event(event);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].response.status, Some(200));
        assert_eq!(entries[1].response.status, Some(201));
    }

    #[test]
    fn test_parse_sse_event_batch_array() {
        let event = "data: [{\"request\":{\"method\":\"POST\",\"path\":\"/api/ventas\"}},\
                     {\"request\":{\"method\":\"DELETE\",\"path\":\"/api/lentes/1\"}}]";
        let entries = parse_sse_event(event);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].request.method.as_deref(), Some("POST"));
        assert_eq!(entries[1].request.method.as_deref(), Some("DELETE"));
    }

    #[test]
    fn test_parse_sse_event_single_object() {
        let event = "data: {\"response\":{\"status\":201}}";
        let entries = parse_sse_event(event);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].response.status, Some(201));
    }

    #[test]
    fn test_parse_skips_keepalives_done_and_garbage() {
        assert!(parse_sse_event(": keepalive").is_empty());
        assert!(parse_sse_event("").is_empty());
        assert!(parse_sse_event("data: [DONE]").is_empty());
        assert!(parse_sse_event("data: {not json").is_empty());
    }
}
