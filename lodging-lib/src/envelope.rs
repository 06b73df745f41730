//! Error envelope extraction and body normalization.
//!
//! The backend wraps business errors as
//! `{ "data": { "GLOBAL_ERROR_RESPONSE": [{ "ErrorDetail": .., "Title": .. }] } }`
//! (or without the `data` wrapper) while often still reporting
//! `"message": "OK"` alongside. The helpers here pull out the real detail and
//! rewrite the body so downstream consumers see one coherent message.

use serde_json::Value;

/// Statuses whose errors are resolved, normalized and shown to the user.
pub const NORMALIZED_STATUSES: [u16; 6] = [400, 403, 404, 408, 500, 503];

/// Fallback for a 404 without any detail.
pub const NOT_FOUND_MESSAGE: &str = "The Requested Resource Was Not Found.";

/// Generic fallback message.
pub const GENERIC_MESSAGE: &str = "Something went wrong.";

/// Returns `true` if errors with this status are normalized.
pub fn is_normalized_status(status: u16) -> bool {
    NORMALIZED_STATUSES.contains(&status)
}

/// Resolves the user-facing message for an error response.
pub fn extract_detail(status: u16, body: &Value) -> String {
    let container = body.get("data").filter(|d| !d.is_null()).unwrap_or(body);

    let envelope_detail = container
        .get("GLOBAL_ERROR_RESPONSE")
        .and_then(Value::as_array)
        .and_then(|entries| entries.first())
        .map(|first| {
            non_empty_str(first.get("ErrorDetail"))
                .or_else(|| non_empty_str(first.get("Title")))
                .unwrap_or(GENERIC_MESSAGE)
                .to_string()
        });

    if let Some(detail) = envelope_detail {
        return detail;
    }

    if status == 404 {
        return non_empty_str(body.get("detail"))
            .or_else(|| non_empty_str(body.get("title")))
            .unwrap_or(NOT_FOUND_MESSAGE)
            .to_string();
    }

    GENERIC_MESSAGE.to_string()
}

/// Rewrites the message and status fields of an object body in place.
///
/// Non-object bodies are left untouched.
pub fn normalize_body(body: &mut Value, detail: &str) {
    let Some(object) = body.as_object_mut() else {
        return;
    };

    for key in ["message", "Message", "errorMessage", "ErrorMessage", "userMessage"] {
        object.insert(key.to_string(), Value::String(detail.to_string()));
    }

    if object.contains_key("Status") {
        object.insert("Status".to_string(), Value::String("Error".to_string()));
    }
    if matches!(object.get("status"), Some(Value::String(_))) {
        object.insert("status".to_string(), Value::String("Error".to_string()));
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_envelope_inside_data() {
        let body = json!({
            "message": "OK",
            "data": { "GLOBAL_ERROR_RESPONSE": [{ "ErrorDetail": "Room already booked", "Title": "Conflict" }] }
        });
        assert_eq!(extract_detail(400, &body), "Room already booked");
    }

    #[test]
    fn test_envelope_top_level_title_fallback() {
        let body = json!({ "GLOBAL_ERROR_RESPONSE": [{ "Title": "Validation failed" }] });
        assert_eq!(extract_detail(500, &body), "Validation failed");

        let empty_entry = json!({ "GLOBAL_ERROR_RESPONSE": [{}] });
        assert_eq!(extract_detail(500, &empty_entry), GENERIC_MESSAGE);
    }

    #[test]
    fn test_not_found_fallbacks() {
        assert_eq!(extract_detail(404, &Value::Null), NOT_FOUND_MESSAGE);
        assert_eq!(
            extract_detail(404, &json!({ "title": "No such folio" })),
            "No such folio"
        );
        assert_eq!(
            extract_detail(404, &json!({ "detail": "Branch 7 missing", "title": "x" })),
            "Branch 7 missing"
        );
        assert_eq!(
            extract_detail(404, &json!({ "GLOBAL_ERROR_RESPONSE": [] })),
            NOT_FOUND_MESSAGE
        );
    }

    #[test]
    fn test_generic_fallback() {
        assert_eq!(extract_detail(503, &json!("Service Unavailable")), GENERIC_MESSAGE);
        assert_eq!(extract_detail(408, &json!({ "title": "ignored" })), GENERIC_MESSAGE);
    }

    #[test]
    fn test_normalize_body() {
        let mut body = json!({ "message": "OK", "Status": "Success", "status": "OK", "data": null });
        normalize_body(&mut body, "Room already booked");

        assert_eq!(body["message"], "Room already booked");
        assert_eq!(body["Message"], "Room already booked");
        assert_eq!(body["errorMessage"], "Room already booked");
        assert_eq!(body["ErrorMessage"], "Room already booked");
        assert_eq!(body["userMessage"], "Room already booked");
        assert_eq!(body["Status"], "Error");
        assert_eq!(body["status"], "Error");
    }

    #[test]
    fn test_normalize_keeps_numeric_status() {
        let mut body = json!({ "status": 400 });
        normalize_body(&mut body, "Bad");
        assert_eq!(body["status"], 400);
        assert!(body.get("Status").is_none());

        let mut text = json!("plain");
        normalize_body(&mut text, "Bad");
        assert_eq!(text, json!("plain"));
    }
}
