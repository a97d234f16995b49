//! Response body conventions and user-facing failure messages.
//!
//! The backend wraps results as `{"success": bool, "message": string, ...}`.
//! Only an explicit `"success": false` marks a logical failure; bodies without
//! the marker are returned as-is.

use serde_json::Value;

/// Shown when the backend gives no message of its own.
pub const REQUEST_FAILED: &str = "Request failed";
pub const UNAUTHORIZED: &str = "Unauthorized, please log in again";
pub const FORBIDDEN: &str = "Insufficient permission";
pub const NOT_FOUND: &str = "The requested resource does not exist";
pub const SERVER_ERROR: &str = "Server error";
pub const NETWORK_ERROR: &str = "Network error, please check your connection";

/// Message for a body flagged `"success": false`, or `None` if the body is
/// not a logical failure.
#[must_use]
pub fn logical_failure(body: &Value) -> Option<String> {
    if body.get("success") != Some(&Value::Bool(false)) {
        return None;
    }

    Some(carried_message(body).unwrap_or_else(|| REQUEST_FAILED.to_string()))
}

/// Non-empty `message` field of an error body, if the body is JSON.
#[must_use]
pub fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(carried_message)
}

/// Message to show for a non-success HTTP status.
#[must_use]
pub fn status_message(status: u16, server_message: Option<&str>) -> String {
    match status {
        401 => UNAUTHORIZED.to_string(),
        403 => FORBIDDEN.to_string(),
        404 => NOT_FOUND.to_string(),
        500 => SERVER_ERROR.to_string(),
        _ => server_message.unwrap_or(REQUEST_FAILED).to_string(),
    }
}

fn carried_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(String::from)
}
