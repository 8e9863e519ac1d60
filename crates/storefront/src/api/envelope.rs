//! Response envelope normalization.
//!
//! The Aurora backend answers in several shapes depending on the controller:
//! `{success: true, data: [...]}`, `{success: false, message}`, a bare JSON
//! array, or an ad-hoc object whose `message` may or may not be an error.
//! [`normalize`] applies one precedence order so callers only ever see the
//! unwrapped payload or an [`ApiError::Envelope`].
//!
//! Precedence (deliberately kept bug-for-bug with the original client):
//! 1. non-object, non-array input is invalid
//! 2. `success == false` is an error, using `message` when present
//! 3. `success == true` with a `data` key unwraps `data`
//! 4. a bare array is valid as-is
//! 5. an object whose `message` contains "Error" is an error
//! 6. anything else passes through unchanged
//!
//! Note the gap between rules 3 and 4: `{success: true}` WITHOUT a `data`
//! key is not short-circuited as an empty success; it falls through to the
//! message check and usually passes through as-is. The original client has
//! the same fallthrough and its intent is unclear, so it is preserved and
//! pinned by `test_success_true_without_data_falls_through`.

use serde_json::Value;

use super::ApiError;

/// Normalize a decoded JSON body into its payload.
///
/// # Errors
///
/// Returns [`ApiError::Envelope`] when the body is a scalar, declares
/// `success: false`, or carries an error-looking `message`.
pub fn normalize(body: Value) -> Result<Value, ApiError> {
    let obj = match &body {
        Value::Array(_) => return Ok(body),
        Value::Object(obj) => obj,
        _ => return Err(ApiError::Envelope("response is not an object".to_string())),
    };

    if obj.get("success").and_then(Value::as_bool) == Some(false) {
        let message = obj
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("API returned an error response");
        return Err(ApiError::Envelope(message.to_string()));
    }

    if obj.get("success").and_then(Value::as_bool) == Some(true)
        && let Some(data) = obj.get("data")
    {
        return Ok(data.clone());
    }

    if let Some(message) = obj.get("message").and_then(Value::as_str)
        && message.contains("Error")
    {
        return Err(ApiError::Envelope(message.to_string()));
    }

    Ok(body)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_is_invalid() {
        assert!(normalize(json!("hola")).is_err());
        assert!(normalize(json!(42)).is_err());
        assert!(normalize(Value::Null).is_err());
    }

    #[test]
    fn test_success_false_uses_message() {
        let err = normalize(json!({"success": false, "message": "Carrito no encontrado"}))
            .unwrap_err();
        assert!(err.to_string().contains("Carrito no encontrado"));
    }

    #[test]
    fn test_success_true_unwraps_data() {
        let out = normalize(json!({"success": true, "data": [1, 2]})).unwrap();
        assert_eq!(out, json!([1, 2]));
    }

    #[test]
    fn test_bare_array_passes() {
        let out = normalize(json!([{"_id": "a"}])).unwrap();
        assert_eq!(out, json!([{"_id": "a"}]));
    }

    #[test]
    fn test_error_message_detected() {
        let err = normalize(json!({"message": "Error obteniendo carritos"})).unwrap_err();
        assert!(matches!(err, ApiError::Envelope(_)));
    }

    #[test]
    fn test_benign_message_passes_through() {
        let body = json!({"message": "Carrito creado exitosamente", "carrito": {}});
        let out = normalize(body.clone()).unwrap();
        assert_eq!(out, body);
    }

    #[test]
    fn test_success_true_without_data_falls_through() {
        // Known ambiguity preserved from the original client: this is NOT
        // treated as a successful empty payload; it passes through whole.
        let body = json!({"success": true});
        let out = normalize(body.clone()).unwrap();
        assert_eq!(out, body);

        // ...and if such a response also carries an error-looking message,
        // the message check wins even though success was true.
        let err =
            normalize(json!({"success": true, "message": "Error parcial"})).unwrap_err();
        assert!(matches!(err, ApiError::Envelope(_)));
    }
}
