//! Schema validation helpers.
//!
//! This module validates `serde_json::Value` state against a [`Schema`]
//! before it is sent to Sentry, so malformed plans are reported with an
//! attribute path instead of surfacing as an opaque API error.
//!
//! # Example
//!
//! ```
//! use sentry_provider::schema::{Attribute, AttributeType, AttributeFlags, Schema};
//! use sentry_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("name", Attribute::required_string())
//!     .with_attribute("frequency", Attribute::optional_computed_int64());
//!
//! let diagnostics = validate(&schema, &json!({"name": "High volume", "frequency": 30}));
//! assert!(diagnostics.is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"name": "High volume", "frequency": "often"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("frequency".to_string()));
//! ```

use crate::schema::{Attribute, AttributeType, Diagnostic, DiagnosticSeverity, Schema};
use serde_json::Value;

/// Validate a JSON value against a schema.
///
/// Returns a list of diagnostics for any validation errors found.
/// An empty list means the value is valid.
///
/// # Validation Rules
///
/// - Required attributes must be present and non-null
/// - Optional attributes may be absent or null
/// - Computed-only attributes are skipped (Sentry sets these)
/// - Attribute types must match the schema
/// - Attributes not in the schema are ignored
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match value {
        Value::Object(map) => map,
        Value::Null => return diagnostics,
        _ => {
            diagnostics.push(
                Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", value_type_name(value))),
            );
            return diagnostics;
        },
    };

    for (name, attr) in &schema.attributes {
        validate_attribute(attr, obj.get(name), name, &mut diagnostics);
    }
    diagnostics
}

/// Validate a JSON value against a schema, returning Ok if valid or Err with diagnostics.
///
/// This is a convenience wrapper around [`validate`] that returns a Result.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Check if a JSON value is valid against a schema.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    // Skip computed-only attributes
    if attr.flags.computed && !attr.flags.optional && !attr.flags.required {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
        },
        Some(v) => validate_attribute_type(&attr.attr_type, v, path, diagnostics),
    }
}

fn validate_attribute_type(
    attr_type: &AttributeType,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match attr_type {
        AttributeType::String => {
            if !value.is_string() {
                diagnostics.push(type_error(path, "string", value));
            }
        },
        AttributeType::Int64 => {
            if !is_int64(value) {
                diagnostics.push(type_error(path, "int64", value));
            }
        },
        AttributeType::Bool => {
            if !value.is_boolean() {
                diagnostics.push(type_error(path, "bool", value));
            }
        },
        AttributeType::List(element_type) => {
            if let Some(arr) = value.as_array() {
                for (i, elem) in arr.iter().enumerate() {
                    let elem_path = format!("{}.{}", path, i);
                    validate_attribute_type(element_type, elem, &elem_path, diagnostics);
                }
            } else {
                diagnostics.push(type_error(path, "list", value));
            }
        },
        AttributeType::Map(value_type) => {
            if let Some(obj) = value.as_object() {
                for (key, val) in obj {
                    let key_path = format!("{}.{}", path, key);
                    validate_attribute_type(value_type, val, &key_path, diagnostics);
                }
            } else {
                diagnostics.push(type_error(path, "map", value));
            }
        },
        AttributeType::Dynamic => {},
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_int64(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            if n.as_i64().is_some() {
                true
            } else if let Some(f) = n.as_f64() {
                // Integral floats such as 30.0 are accepted
                f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64
            } else {
                false
            }
        },
        _ => false,
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic {
        severity: DiagnosticSeverity::Error,
        summary: format!("Invalid type for attribute '{}'", path),
        detail: Some(format!(
            "Expected {}, got {}",
            expected,
            value_type_name(got)
        )),
        attribute: Some(path.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, AttributeFlags, Schema};
    use serde_json::json;

    fn rule_schema() -> Schema {
        Schema::v0()
            .with_attribute("name", Attribute::required_string())
            .with_attribute("frequency", Attribute::optional_computed_int64())
            .with_attribute(
                "conditions",
                Attribute::new(
                    AttributeType::list(AttributeType::map(AttributeType::Dynamic)),
                    AttributeFlags::required(),
                ),
            )
            .with_attribute("internal_id", Attribute::computed_string())
    }

    #[test]
    fn test_validate_required_string() {
        let schema = Schema::v0().with_attribute("name", Attribute::required_string());

        assert!(validate(&schema, &json!({"name": "backend"})).is_empty());

        let diagnostics = validate(&schema, &json!({}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("name".to_string()));

        let diagnostics = validate(&schema, &json!({"name": null}));
        assert_eq!(diagnostics.len(), 1);

        let diagnostics = validate(&schema, &json!({"name": 123}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Invalid type"));
    }

    #[test]
    fn test_validate_int64_accepts_integral_float() {
        let schema = rule_schema();
        let base = json!({"name": "r", "conditions": []});

        let mut value = base.clone();
        value["frequency"] = json!(30.0);
        assert!(is_valid(&schema, &value));

        let mut value = base;
        value["frequency"] = json!(1.5);
        let diagnostics = validate(&schema, &value);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].detail,
            Some("Expected int64, got number".to_string())
        );
    }

    #[test]
    fn test_validate_list_of_dynamic_maps() {
        let schema = rule_schema();

        let value = json!({
            "name": "r",
            "conditions": [
                {"id": "sentry.rules.conditions.event_frequency.EventFrequencyCondition", "value": 100},
                {"id": "x", "value": "100", "nested": {"anything": [1, true]}}
            ]
        });
        assert!(validate(&schema, &value).is_empty());

        let value = json!({"name": "r", "conditions": [{"id": "ok"}, "not a map"]});
        let diagnostics = validate(&schema, &value);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute, Some("conditions.1".to_string()));

        let value = json!({"name": "r", "conditions": {"id": "x"}});
        let diagnostics = validate(&schema, &value);
        assert_eq!(diagnostics[0].attribute, Some("conditions".to_string()));
    }

    #[test]
    fn test_computed_attributes_skipped() {
        let schema = rule_schema();
        let value = json!({"name": "r", "conditions": [], "internal_id": 42});
        assert!(validate(&schema, &value).is_empty());
    }

    #[test]
    fn test_unknown_attributes_ignored() {
        let schema = rule_schema();
        let value = json!({"name": "r", "conditions": [], "owner": "team:1"});
        assert!(is_valid(&schema, &value));
    }

    #[test]
    fn test_validate_non_object() {
        let schema = rule_schema();
        let diagnostics = validate(&schema, &json!("rule"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Expected object");
        assert!(diagnostics[0].attribute.is_none());

        assert!(validate(&schema, &Value::Null).is_empty());
    }

    #[test]
    fn test_validate_result_collects_all() {
        let schema = rule_schema();
        let err = validate_result(&schema, &json!({"frequency": "often"})).unwrap_err();

        let mut paths: Vec<_> = err.iter().filter_map(|d| d.attribute.clone()).collect();
        paths.sort();
        assert_eq!(paths, vec!["conditions", "frequency", "name"]);
    }

    #[test]
    fn test_map_of_strings() {
        let schema = Schema::v0().with_attribute(
            "config",
            Attribute::new(
                AttributeType::map(AttributeType::String),
                AttributeFlags::optional(),
            ),
        );

        assert!(is_valid(&schema, &json!({"config": {"urls": "https://example.com"}})));
        let diagnostics = validate(&schema, &json!({"config": {"urls": ["a"]}}));
        assert_eq!(diagnostics[0].attribute, Some("config.urls".to_string()));
    }
}
