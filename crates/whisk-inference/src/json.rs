//! Helpers for reading JSON out of model replies.

/// Strip Markdown code fences (```` ```json ```` / ```` ``` ````) a model may wrap
/// around a JSON reply, returning the trimmed inner text.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = rest.strip_prefix("json").unwrap_or(rest);
        body = body.trim_end();
        body = body.strip_suffix("```").unwrap_or(body);
    }
    body.trim()
}

/// Parse a model reply as a JSON object, tolerating code fences.
///
/// Returns `None` for anything that is not a JSON object.
pub fn parse_json_object(text: &str) -> Option<serde_json::Map<String, serde_json::Value>> {
    match serde_json::from_str::<serde_json::Value>(strip_code_fences(text)) {
        Ok(serde_json::Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Pull the outermost `{...}` block out of a chatty reply and parse it.
///
/// Backticks are dropped first, so fences anywhere in the reply are ignored.
/// Text before the first `{` and after the last `}` is discarded.
pub fn extract_json_object(text: &str) -> Option<serde_json::Map<String, serde_json::Value>> {
    let cleaned = text.replace("```json", "").replace('`', "");
    let cleaned = cleaned.trim();
    let block = match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => &cleaned[start..=end],
        _ => cleaned,
    };
    match serde_json::from_str::<serde_json::Value>(block) {
        Ok(serde_json::Value::Object(map)) => Some(map),
        _ => None,
    }
}
