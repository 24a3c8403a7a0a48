// ABOUTME: Validates raw tool input against the tool's JSON Schema (draft 7).
// ABOUTME: Object schemas with declared properties reject unknown fields.

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

use crate::error::ValidationError;

/// Validate `input` against `schema`, reporting the first violation.
///
/// When the schema declares `properties` and leaves `additionalProperties`
/// unset, unknown fields are rejected as if it were `false`.
pub fn validate_input(schema: &Value, input: &Value) -> Result<(), ValidationError> {
    let schema = strict(schema);
    let compiled = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema)
        .map_err(|e| ValidationError::Schema(e.to_string()))?;
    if let Err(errors) = compiled.validate(input) {
        let first = errors
            .into_iter()
            .next()
            .map(|err| err.to_string())
            .unwrap_or_else(|| "schema validation failed".to_string());
        return Err(ValidationError::Rejected(first));
    }
    Ok(())
}

fn strict(schema: &Value) -> Value {
    let mut schema = schema.clone();
    if let Value::Object(map) = &mut schema {
        if map.contains_key("properties") && !map.contains_key("additionalProperties") {
            map.insert("additionalProperties".to_string(), Value::Bool(false));
        }
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {"type": "string", "minLength": 1},
                "content": {"type": "string"}
            },
            "required": ["title", "content"]
        })
    }

    #[test]
    fn test_accepts_valid_input() {
        let input = json!({"title": "A", "content": "B"});
        assert!(validate_input(&draft_schema(), &input).is_ok());
    }

    #[test]
    fn test_rejects_missing_required() {
        let err = validate_input(&draft_schema(), &json!({"title": "A"})).unwrap_err();
        assert!(matches!(err, ValidationError::Rejected(ref m) if m.contains("content")));
    }

    #[test]
    fn test_rejects_unknown_field_by_default() {
        let input = json!({"title": "A", "content": "B", "tags": []});
        let err = validate_input(&draft_schema(), &input).unwrap_err();
        assert!(matches!(err, ValidationError::Rejected(_)));
    }

    #[test]
    fn test_explicit_additional_properties_is_respected() {
        let mut schema = draft_schema();
        schema["additionalProperties"] = json!(true);
        let input = json!({"title": "A", "content": "B", "tags": []});
        assert!(validate_input(&schema, &input).is_ok());
    }

    #[test]
    fn test_rejects_wrong_type() {
        let input = json!({"title": 5, "content": "B"});
        assert!(validate_input(&draft_schema(), &input).is_err());
    }

    #[test]
    fn test_invalid_schema() {
        let schema = json!({"type": 12});
        let err = validate_input(&schema, &json!({})).unwrap_err();
        assert!(matches!(err, ValidationError::Schema(_)));
    }
}
