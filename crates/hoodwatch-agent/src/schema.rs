//! # Argument Validation
//!
//! A small JSON-schema subset covering what the tool schemas use: `type`,
//! `required`, `properties`, `items`, `minItems` and `minLength`.
//!
//! An explicit `null` for an optional property is treated as absent, so
//! agents may send `{"strike_price": null}` to mean "no strike".

use serde_json::{Map, Value};

/// Location and reason of the first schema violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {message}")]
pub struct SchemaValidationError {
    pub path: String,
    pub message: String,
}

impl SchemaValidationError {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Validates `value` against `schema`, stopping at the first violation.
pub fn validate_against_schema(value: &Value, schema: &Value) -> Result<(), SchemaValidationError> {
    let schema = schema
        .as_object()
        .ok_or_else(|| SchemaValidationError::new("$", "schema must be an object"))?;

    validate_value(value, schema, "$")
}

fn validate_value(
    value: &Value,
    schema: &Map<String, Value>,
    path: &str,
) -> Result<(), SchemaValidationError> {
    if let Some(schema_type) = schema.get("type") {
        validate_type(value, schema_type, path)?;
    }

    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|fields| fields.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    if let Value::Object(fields) = value {
        for field in &required {
            if fields.get(*field).map_or(true, Value::is_null) {
                return Err(SchemaValidationError::new(
                    format!("{path}/{field}"),
                    format!("required field '{field}' is missing"),
                ));
            }
        }

        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            for (key, property_schema) in properties {
                let Some(property_value) = fields.get(key) else {
                    continue;
                };
                if property_value.is_null() && !required.contains(&key.as_str()) {
                    continue;
                }
                if let Some(property_schema) = property_schema.as_object() {
                    validate_value(property_value, property_schema, &format!("{path}/{key}"))?;
                }
            }
        }
    }

    if let Value::Array(items) = value {
        if let Some(item_schema) = schema.get("items").and_then(Value::as_object) {
            for (index, item) in items.iter().enumerate() {
                validate_value(item, item_schema, &format!("{path}/{index}"))?;
            }
        }

        if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
            if (items.len() as u64) < min {
                return Err(SchemaValidationError::new(
                    path,
                    format!("array must have at least {min} items, found {}", items.len()),
                ));
            }
        }
    }

    if let (Some(min), Value::String(text)) = (schema.get("minLength").and_then(Value::as_u64), value)
    {
        let len = text.chars().count() as u64;
        if len < min {
            return Err(SchemaValidationError::new(
                path,
                format!("string must have at least {min} characters, found {len}"),
            ));
        }
    }

    Ok(())
}

fn validate_type(value: &Value, schema_type: &Value, path: &str) -> Result<(), SchemaValidationError> {
    let type_name = schema_type
        .as_str()
        .ok_or_else(|| SchemaValidationError::new(path, "schema type must be a string"))?;

    let matches = match (type_name, value) {
        ("object", Value::Object(_)) => true,
        ("array", Value::Array(_)) => true,
        ("string", Value::String(_)) => true,
        ("integer", Value::Number(number)) => number.is_i64() || number.is_u64(),
        ("number", Value::Number(_)) => true,
        ("boolean", Value::Bool(_)) => true,
        ("null", Value::Null) => true,
        _ => false,
    };

    if !matches {
        return Err(SchemaValidationError::new(
            path,
            format!("expected type '{type_name}', found '{}'", value_type_name(value)),
        ));
    }
    Ok(())
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Tool;

    #[test]
    fn accepts_minimal_chain_arguments() {
        let schema = Tool::OptionsChain.input_schema();
        assert!(validate_against_schema(&json!({ "symbol": "AAPL" }), &schema).is_ok());
    }

    #[test]
    fn rejects_missing_required_field() {
        let schema = Tool::OptionsChain.input_schema();
        let error = validate_against_schema(&json!({ "strike_price": "150" }), &schema)
            .expect_err("symbol is required");
        assert_eq!(error.path, "$/symbol");
        assert_eq!(error.to_string(), "$/symbol: required field 'symbol' is missing");
    }

    #[test]
    fn rejects_wrong_item_type() {
        let schema = Tool::CurrentPrice.input_schema();
        let error = validate_against_schema(&json!({ "symbols": ["AAPL", 7] }), &schema)
            .expect_err("numbers are not symbols");
        assert_eq!(error.path, "$/symbols/1");
    }

    #[test]
    fn numeric_strike_is_a_type_error() {
        let schema = Tool::OptionsChain.input_schema();
        let error = validate_against_schema(&json!({ "symbol": "AAPL", "strike_price": 150 }), &schema)
            .expect_err("strike is a string");
        assert_eq!(error.message, "expected type 'string', found 'number'");
    }

    #[test]
    fn null_optional_property_counts_as_absent() {
        let schema = Tool::OptionsChain.input_schema();
        let arguments = json!({ "symbol": "AAPL", "strike_price": null, "option_type": null });
        assert!(validate_against_schema(&arguments, &schema).is_ok());
    }

    #[test]
    fn arguments_must_be_an_object() {
        let schema = Tool::AuthStatus.input_schema();
        assert!(validate_against_schema(&json!([]), &schema).is_err());
    }

    #[test]
    fn min_items_is_enforced() {
        let schema = json!({ "type": "array", "minItems": 1 });
        assert!(validate_against_schema(&json!([]), &schema).is_err());
    }
}
