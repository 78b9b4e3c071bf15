use serde_json::Value;

/// Pulls the `id` property out of a JSON response body.
///
/// Returns `None` when the body is not valid JSON at all; the caller
/// decides how to log that. A missing or `null` property yields an empty
/// id, a string property its contents, and any other value its compact
/// JSON text.
pub(crate) fn extract_id(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    Some(match parsed.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}
