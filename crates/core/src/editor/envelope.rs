//! Response-envelope normalization.
//!
//! The editing service wraps some responses in `{ "data": {...} }` and
//! returns others flat, and spells the project identifier differently
//! across endpoints. Both ambiguities are resolved here and nowhere else.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::EditorError;

/// Field names the project identifier has been observed under.
const PROJECT_ID_FIELDS: [&str; 4] = ["project_id", "projectId", "id", "uuid"];

/// Strip an optional `data` wrapper from a response value.
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(inner) => inner,
            None => Value::Object(map),
        },
        other => other,
    }
}

/// Decode a response body that may or may not carry a `data` wrapper.
pub fn decode_envelope<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, EditorError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| EditorError::MalformedResponse(e.to_string()))?;
    serde_json::from_value(unwrap_data(value))
        .map_err(|e| EditorError::MalformedResponse(e.to_string()))
}

/// Extract the project identifier from a create-project response.
///
/// Probes the known field spellings, descending through `data` and
/// `project` wrappers, before treating the response as failed for lack of
/// an id.
pub fn decode_project_id(bytes: &[u8]) -> Result<String, EditorError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| EditorError::MalformedResponse(e.to_string()))?;

    let mut scope = unwrap_data(value);
    if let Some(project) = scope.get("project") {
        scope = project.clone();
    }

    PROJECT_ID_FIELDS
        .iter()
        .find_map(|field| match scope.get(*field) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| {
            EditorError::MalformedResponse("no project id in create-project response".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct StatusBody {
        status: String,
    }

    #[test]
    fn test_decode_flat_body() {
        let body = br#"{"status": "completed"}"#;
        let parsed: StatusBody = decode_envelope(body).unwrap();
        assert_eq!(parsed.status, "completed");
    }

    #[test]
    fn test_decode_wrapped_body() {
        let body = br#"{"data": {"status": "failed"}}"#;
        let parsed: StatusBody = decode_envelope(body).unwrap();
        assert_eq!(parsed.status, "failed");
    }

    #[test]
    fn test_decode_invalid_json() {
        let result: Result<StatusBody, _> = decode_envelope(b"<html>502</html>");
        assert!(matches!(result, Err(EditorError::MalformedResponse(_))));
    }

    #[test]
    fn test_project_id_flat() {
        assert_eq!(
            decode_project_id(br#"{"project_id": "p-1"}"#).unwrap(),
            "p-1"
        );
    }

    #[test]
    fn test_project_id_camel_case() {
        assert_eq!(
            decode_project_id(br#"{"projectId": "p-2"}"#).unwrap(),
            "p-2"
        );
    }

    #[test]
    fn test_project_id_wrapped_in_data() {
        assert_eq!(
            decode_project_id(br#"{"data": {"id": "p-3"}}"#).unwrap(),
            "p-3"
        );
    }

    #[test]
    fn test_project_id_nested_project_object() {
        assert_eq!(
            decode_project_id(br#"{"data": {"project": {"uuid": "p-4"}}}"#).unwrap(),
            "p-4"
        );
    }

    #[test]
    fn test_project_id_numeric() {
        assert_eq!(decode_project_id(br#"{"id": 42}"#).unwrap(), "42");
    }

    #[test]
    fn test_project_id_missing() {
        let result = decode_project_id(br#"{"data": {"name": "shoot"}}"#);
        assert!(matches!(result, Err(EditorError::MalformedResponse(_))));
    }

    #[test]
    fn test_project_id_empty_string_rejected() {
        let result = decode_project_id(br#"{"project_id": ""}"#);
        assert!(matches!(result, Err(EditorError::MalformedResponse(_))));
    }
}
