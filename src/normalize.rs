//! Conversion between loosely-typed configuration and typed API parameters.
//!
//! Configuration arrives as `serde_json::Value` trees whose leaves may carry
//! any scalar type (a frequency written as `"30"`, a workspace id written as
//! `12`). Decoding goes through [`FieldReader`], which knows every recognized
//! key and its expected scalar type and coerces across compatible
//! representations:
//!
//! | target  | accepted                                                        |
//! |---------|-----------------------------------------------------------------|
//! | string  | string, number (canonical text), bool                           |
//! | integer | integral number, string holding an integer, bool (0/1)          |
//! | bool    | bool, number (non-zero is true), `true/false/t/f/1/0`, `""`     |
//!
//! `null` is treated as absent and unknown keys are ignored. Every rejected
//! field is reported; nothing is silently zeroed.
//!
//! The reverse direction, [`from_remote`], rewrites numeric leaves of remote
//! rule components as canonical strings so a later read compares equal to the
//! textual configuration.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::models::{Action, Condition, Filter, PluginConfigEntry, RuleParams};

/// Condition-combination mode used when none is configured.
pub const DEFAULT_ACTION_MATCH: &str = "any";
/// Filter-combination mode used when none is configured.
pub const DEFAULT_FILTER_MATCH: &str = "any";
/// Minutes between rule firings used when none (or zero) is configured.
pub const DEFAULT_FREQUENCY: i64 = 30;

/// Scalar type a recognized field decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// Text.
    String,
    /// 64-bit signed integer.
    Int,
    /// Boolean.
    Bool,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarKind::String => "string",
            ScalarKind::Int => "integer",
            ScalarKind::Bool => "bool",
        })
    }
}

/// A field whose value could not be coerced into its expected type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field '{field}' expects {expected}, got {found}")]
pub struct FieldError {
    /// Field name.
    pub field: String,
    /// Type the field decodes into.
    pub expected: ScalarKind,
    /// Description of the rejected value.
    pub found: String,
}

/// Why a single configuration entry was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryFailure {
    /// The entry is not a key-value map.
    NotAnObject {
        /// JSON type of the entry.
        found: &'static str,
    },
    /// One or more fields were rejected.
    Fields(Vec<FieldError>),
}

/// A rejected entry of a configuration list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct EntryError {
    /// Attribute holding the list (`conditions`, `actions`, ...).
    pub component: &'static str,
    /// Position of the entry in the list.
    pub index: usize,
    /// What was wrong with it.
    pub failure: EntryFailure,
}

impl EntryError {
    /// Attribute path of the entry, e.g. `conditions.2`.
    pub fn attribute_path(&self) -> String {
        format!("{}.{}", self.component, self.index)
    }
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.attribute_path())?;
        match &self.failure {
            EntryFailure::NotAnObject { found } => write!(f, "expected a map, got {}", found),
            EntryFailure::Fields(fields) => {
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{}", field)?;
                }
                Ok(())
            },
        }
    }
}

/// All entries rejected while decoding a configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub struct DecodeError {
    /// Rejected entries, in input order.
    pub entries: Vec<EntryError>,
}

impl DecodeError {
    /// Whether nothing was rejected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append the entries of `other`.
    pub fn merge(&mut self, other: DecodeError) {
        self.entries.extend(other.entries);
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

/// Reads recognized fields out of one configuration map, recording every
/// field it has to reject.
#[derive(Debug)]
pub struct FieldReader<'a> {
    map: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> FieldReader<'a> {
    /// Create a reader over `map`.
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self {
            map,
            errors: Vec::new(),
        }
    }

    /// Read `key` as a string.
    pub fn string(&mut self, key: &str) -> Option<String> {
        self.read(key, ScalarKind::String, coerce_string)
    }

    /// Read `key` as an integer.
    pub fn int(&mut self, key: &str) -> Option<i64> {
        self.read(key, ScalarKind::Int, coerce_int)
    }

    /// Read `key` as a bool.
    pub fn bool(&mut self, key: &str) -> Option<bool> {
        self.read(key, ScalarKind::Bool, coerce_bool)
    }

    /// Return `value` if no field was rejected.
    pub fn finish<T>(self, value: T) -> Result<T, Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }

    fn read<T>(
        &mut self,
        key: &str,
        expected: ScalarKind,
        coerce: fn(&Value) -> Coerced<T>,
    ) -> Option<T> {
        let value = self.map.get(key)?;
        match coerce(value) {
            Coerced::Value(v) => Some(v),
            Coerced::Absent => None,
            Coerced::Rejected => {
                self.errors.push(FieldError {
                    field: key.to_string(),
                    expected,
                    found: describe(value),
                });
                None
            },
        }
    }
}

enum Coerced<T> {
    Value(T),
    Absent,
    Rejected,
}

fn coerce_string(value: &Value) -> Coerced<String> {
    match value {
        Value::Null => Coerced::Absent,
        Value::String(s) => Coerced::Value(s.clone()),
        Value::Number(n) => Coerced::Value(canonical_number(n)),
        Value::Bool(b) => Coerced::Value(b.to_string()),
        Value::Array(_) | Value::Object(_) => Coerced::Rejected,
    }
}

fn coerce_int(value: &Value) -> Coerced<i64> {
    match value {
        Value::Null => Coerced::Absent,
        Value::Number(n) => number_to_int(n).map_or(Coerced::Rejected, Coerced::Value),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Coerced::Absent;
            }
            if let Ok(i) = s.parse::<i64>() {
                return Coerced::Value(i);
            }
            s.parse::<f64>()
                .ok()
                .and_then(float_to_int)
                .map_or(Coerced::Rejected, Coerced::Value)
        },
        Value::Bool(b) => Coerced::Value(i64::from(*b)),
        Value::Array(_) | Value::Object(_) => Coerced::Rejected,
    }
}

fn coerce_bool(value: &Value) -> Coerced<bool> {
    match value {
        Value::Null => Coerced::Absent,
        Value::Bool(b) => Coerced::Value(*b),
        Value::Number(n) => Coerced::Value(n.as_f64().map_or(false, |f| f != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" | "0" | "f" | "false" => Coerced::Value(false),
            "1" | "t" | "true" => Coerced::Value(true),
            _ => Coerced::Rejected,
        },
        Value::Array(_) | Value::Object(_) => Coerced::Rejected,
    }
}

fn number_to_int(n: &Number) -> Option<i64> {
    n.as_i64().or_else(|| n.as_f64().and_then(float_to_int))
}

fn float_to_int(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("bool {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Array(_) => "list".to_string(),
        Value::Object(_) => "map".to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// Canonical text of a JSON number: integers as digits, other values in
/// plain decimal notation (`30.0` → `30`, `0.5` → `0.5`, never `3e1`).
pub fn canonical_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        // f64's Display never uses exponent notation and drops a zero fraction.
        n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
    }
}

/// A typed rule component decodable from a configuration map.
pub trait RuleComponent: Sized {
    /// Attribute holding the list of components.
    const ATTRIBUTE: &'static str;

    /// Read the recognized fields of one entry.
    fn read(reader: &mut FieldReader<'_>) -> Self;
}

impl RuleComponent for Condition {
    const ATTRIBUTE: &'static str = "conditions";

    fn read(r: &mut FieldReader<'_>) -> Self {
        Self {
            id: r.string("id"),
            name: r.string("name"),
            value: r.string("value"),
            interval: r.string("interval"),
            comparison_type: r.string("comparison_type"),
            comparison_interval: r.string("comparison_interval"),
            attribute: r.string("attribute"),
            key: r.string("key"),
            match_type: r.string("match"),
            level: r.string("level"),
        }
    }
}

impl RuleComponent for Action {
    const ATTRIBUTE: &'static str = "actions";

    fn read(r: &mut FieldReader<'_>) -> Self {
        Self {
            id: r.string("id"),
            name: r.string("name"),
            service: r.string("service"),
            workspace: r.int("workspace"),
            channel: r.string("channel"),
            channel_id: r.string("channel_id"),
            tags: r.string("tags"),
            target_type: r.string("targetType"),
            target_identifier: r.string("targetIdentifier"),
            fallthrough_type: r.string("fallthroughType"),
        }
    }
}

impl RuleComponent for Filter {
    const ATTRIBUTE: &'static str = "filters";

    fn read(r: &mut FieldReader<'_>) -> Self {
        Self {
            id: r.string("id"),
            name: r.string("name"),
            value: r.string("value"),
            comparison_type: r.string("comparison_type"),
            time: r.string("time"),
            attribute: r.string("attribute"),
            key: r.string("key"),
            match_type: r.string("match"),
            level: r.string("level"),
            target_type: r.string("targetType"),
            target_identifier: r.string("targetIdentifier"),
        }
    }
}

/// Decode configuration entries into typed components, preserving order.
///
/// Every malformed entry is reported in the returned [`DecodeError`].
pub fn to_params<T: RuleComponent>(entries: &[Value]) -> Result<Vec<T>, DecodeError> {
    let mut decoded = Vec::with_capacity(entries.len());
    let mut error = DecodeError::default();

    for (index, entry) in entries.iter().enumerate() {
        let failure = match entry {
            Value::Object(map) => {
                let mut reader = FieldReader::new(map);
                let component = T::read(&mut reader);
                match reader.finish(component) {
                    Ok(component) => {
                        decoded.push(component);
                        continue;
                    },
                    Err(fields) => EntryFailure::Fields(fields),
                }
            },
            other => EntryFailure::NotAnObject {
                found: json_type_name(other),
            },
        };
        error.entries.push(EntryError {
            component: T::ATTRIBUTE,
            index,
            failure,
        });
    }

    if error.is_empty() {
        Ok(decoded)
    } else {
        Err(error)
    }
}

/// Rewrite every top-level numeric leaf of each component as its canonical string.
///
/// Strings, bools, nulls and nested values are kept as they are.
pub fn from_remote(mut components: Vec<Map<String, Value>>) -> Vec<Map<String, Value>> {
    for component in &mut components {
        for value in component.values_mut() {
            if let Value::Number(n) = value {
                *value = Value::String(canonical_number(n));
            }
        }
    }
    components
}

/// Project the remote plugin options onto the keys tracked in configuration.
///
/// The result holds exactly the tracked keys. String values are copied from
/// the remote listing; absent or non-string values become `""`. Remote keys
/// that are not tracked are dropped.
pub fn project_plugin_config<'a, I>(remote: &[PluginConfigEntry], tracked: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let remote: BTreeMap<&str, &str> = remote
        .iter()
        .filter_map(|entry| entry.value.as_str().map(|v| (entry.name.as_str(), v)))
        .collect();

    tracked
        .into_iter()
        .map(|key| {
            let value = remote.get(key).copied().unwrap_or_default();
            (key.to_string(), value.to_string())
        })
        .collect()
}

/// Decode a plugin configuration map into string options.
pub fn plugin_config_params(config: &Map<String, Value>) -> Result<BTreeMap<String, String>, DecodeError> {
    let mut reader = FieldReader::new(config);
    let params: BTreeMap<String, String> = config
        .keys()
        .filter_map(|key| reader.string(key).map(|value| (key.clone(), value)))
        .collect();

    reader.finish(params).map_err(|fields| DecodeError {
        entries: vec![EntryError {
            component: "config",
            index: 0,
            failure: EntryFailure::Fields(fields),
        }],
    })
}

/// Alert rule settings as read from configuration.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    /// Rule name.
    pub name: &'a str,
    /// Environment; empty means all environments.
    pub environment: &'a str,
    /// Condition-combination mode; empty means [`DEFAULT_ACTION_MATCH`].
    pub action_match: &'a str,
    /// Filter-combination mode; empty means [`DEFAULT_FILTER_MATCH`].
    pub filter_match: &'a str,
    /// Minutes between firings; zero means [`DEFAULT_FREQUENCY`].
    pub frequency: i64,
    /// Raw condition entries.
    pub conditions: &'a [Value],
    /// Raw action entries.
    pub actions: &'a [Value],
    /// Raw filter entries.
    pub filters: &'a [Value],
}

/// Build the parameters for a rule create or update, applying defaults.
///
/// Conditions, actions and filters are all decoded before failing, so the
/// error lists every malformed entry at once.
pub fn rule_params(input: &RuleInput<'_>) -> Result<RuleParams, DecodeError> {
    let conditions = to_params::<Condition>(input.conditions);
    let actions = to_params::<Action>(input.actions);
    let filters = to_params::<Filter>(input.filters);

    let (conditions, actions, filters) = match (conditions, actions, filters) {
        (Ok(c), Ok(a), Ok(f)) => (c, a, f),
        (c, a, f) => {
            let mut error = DecodeError::default();
            for result in [c.err(), a.err(), f.err()].into_iter().flatten() {
                error.merge(result);
            }
            return Err(error);
        },
    };

    Ok(RuleParams {
        name: input.name.to_string(),
        action_match: non_empty_or(input.action_match, DEFAULT_ACTION_MATCH),
        filter_match: non_empty_or(input.filter_match, DEFAULT_FILTER_MATCH),
        frequency: if input.frequency == 0 {
            DEFAULT_FREQUENCY
        } else {
            input.frequency
        },
        environment: (!input.environment.is_empty()).then(|| input.environment.to_string()),
        conditions,
        actions,
        filters,
    })
}

fn non_empty_or(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    fn empty_rule<'a>() -> RuleInput<'a> {
        RuleInput {
            name: "High volume",
            environment: "",
            action_match: "",
            filter_match: "",
            frequency: 0,
            conditions: &[],
            actions: &[],
            filters: &[],
        }
    }

    #[test]
    fn test_rule_defaults_applied() {
        let params = rule_params(&empty_rule()).unwrap();
        assert_eq!(params.action_match, "any");
        assert_eq!(params.filter_match, "any");
        assert_eq!(params.frequency, 30);
        assert_eq!(params.environment, None);
    }

    #[test]
    fn test_rule_explicit_values_kept() {
        let input = RuleInput {
            action_match: "all",
            filter_match: "none",
            frequency: 5,
            environment: "production",
            ..empty_rule()
        };
        let params = rule_params(&input).unwrap();
        assert_eq!(params.action_match, "all");
        assert_eq!(params.filter_match, "none");
        assert_eq!(params.frequency, 5);
        assert_eq!(params.environment.as_deref(), Some("production"));
    }

    #[test]
    fn test_to_params_preserves_order_and_length() {
        let entries = vec![
            json!({"id": "first", "value": "10"}),
            json!({"id": "second", "interval": "1h"}),
            json!({"id": "third"}),
        ];
        let conditions = to_params::<Condition>(&entries).unwrap();

        assert_eq!(conditions.len(), 3);
        assert_eq!(conditions[0].id.as_deref(), Some("first"));
        assert_eq!(conditions[0].value.as_deref(), Some("10"));
        assert_eq!(conditions[1].interval.as_deref(), Some("1h"));
        assert_eq!(conditions[2].id.as_deref(), Some("third"));
    }

    #[test]
    fn test_to_params_coerces_scalars() {
        let entries = vec![json!({
            "id": "sentry.integrations.slack.notify_action.SlackNotifyServiceAction",
            "workspace": "30",
            "channel": "#alerts",
            "channel_id": 12345,
            "tags": true,
        })];
        let actions = to_params::<Action>(&entries).unwrap();

        assert_eq!(actions[0].workspace, Some(30));
        assert_eq!(actions[0].channel_id.as_deref(), Some("12345"));
        assert_eq!(actions[0].tags.as_deref(), Some("true"));
    }

    #[test]
    fn test_to_params_ignores_unknown_keys_and_is_case_sensitive() {
        let entries = vec![json!({"id": "x", "Interval": "1h", "bogus": [1, 2]})];
        let conditions = to_params::<Condition>(&entries).unwrap();

        assert_eq!(conditions[0].id.as_deref(), Some("x"));
        assert_eq!(conditions[0].interval, None);
    }

    #[test]
    fn test_to_params_null_is_absent() {
        let entries = vec![json!({"id": "x", "targetType": null})];
        let actions = to_params::<Action>(&entries).unwrap();
        assert_eq!(actions[0].target_type, None);
    }

    #[test]
    fn test_to_params_reports_every_rejected_field() {
        let entries = vec![
            json!({"id": "ok"}),
            json!({"workspace": "general", "channel": {"name": "x"}}),
            json!("not a map"),
        ];
        let err = to_params::<Action>(&entries).unwrap_err();

        assert_eq!(err.entries.len(), 2);
        assert_eq!(err.entries[0].index, 1);
        assert_eq!(err.entries[0].component, "actions");
        match &err.entries[0].failure {
            EntryFailure::Fields(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert!(names.contains(&"workspace"));
                assert!(names.contains(&"channel"));
            },
            other => panic!("unexpected failure {:?}", other),
        }
        assert_eq!(
            err.entries[1].failure,
            EntryFailure::NotAnObject { found: "string" }
        );
        assert_eq!(err.entries[1].attribute_path(), "actions.2");
    }

    #[test]
    fn test_decode_error_display() {
        let entries = vec![json!({"workspace": "general"})];
        let err = to_params::<Action>(&entries).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"actions.0: field 'workspace' expects integer, got string "general""#
        );
    }

    #[test]
    fn test_rule_params_collects_errors_across_components() {
        let conditions = vec![json!(42)];
        let actions = vec![json!({"workspace": [1]})];
        let filters = vec![json!({"id": "fine"})];
        let input = RuleInput {
            conditions: &conditions,
            actions: &actions,
            filters: &filters,
            ..empty_rule()
        };

        let err = rule_params(&input).unwrap_err();
        let paths: Vec<_> = err.entries.iter().map(|e| e.attribute_path()).collect();
        assert_eq!(paths, vec!["conditions.0", "actions.0"]);
    }

    #[test]
    fn test_field_reader_int_coercions() {
        let map = object(json!({
            "a": 30, "b": "30", "c": 30.0, "d": " 7 ", "e": true,
            "f": 1.5, "g": "abc", "h": "", "i": "12.0"
        }));
        let mut r = FieldReader::new(&map);

        assert_eq!(r.int("a"), Some(30));
        assert_eq!(r.int("b"), Some(30));
        assert_eq!(r.int("c"), Some(30));
        assert_eq!(r.int("d"), Some(7));
        assert_eq!(r.int("e"), Some(1));
        assert_eq!(r.int("f"), None);
        assert_eq!(r.int("g"), None);
        assert_eq!(r.int("h"), None);
        assert_eq!(r.int("i"), Some(12));
        assert_eq!(r.int("missing"), None);

        let errors = r.finish(()).unwrap_err();
        let rejected: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(rejected, vec!["f", "g"]);
    }

    #[test]
    fn test_field_reader_bool_coercions() {
        let map = object(json!({
            "a": true, "b": "TRUE", "c": "f", "d": 0, "e": 2, "f": "", "g": "maybe"
        }));
        let mut r = FieldReader::new(&map);

        assert_eq!(r.bool("a"), Some(true));
        assert_eq!(r.bool("b"), Some(true));
        assert_eq!(r.bool("c"), Some(false));
        assert_eq!(r.bool("d"), Some(false));
        assert_eq!(r.bool("e"), Some(true));
        assert_eq!(r.bool("f"), Some(false));
        assert_eq!(r.bool("g"), None);

        let errors = r.finish(()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].expected, ScalarKind::Bool);
    }

    #[test]
    fn test_field_reader_string_coercions() {
        let map = object(json!({"a": "x", "b": 30, "c": 30.0, "d": false, "e": [1]}));
        let mut r = FieldReader::new(&map);

        assert_eq!(r.string("a").as_deref(), Some("x"));
        assert_eq!(r.string("b").as_deref(), Some("30"));
        assert_eq!(r.string("c").as_deref(), Some("30"));
        assert_eq!(r.string("d").as_deref(), Some("false"));
        assert_eq!(r.string("e"), None);
        assert!(r.finish(()).is_err());
    }

    #[test]
    fn test_canonical_number() {
        let n = |v: Value| match v {
            Value::Number(n) => canonical_number(&n),
            other => panic!("not a number: {}", other),
        };
        assert_eq!(n(json!(30.0)), "30");
        assert_eq!(n(json!(30)), "30");
        assert_eq!(n(json!(-4)), "-4");
        assert_eq!(n(json!(0.5)), "0.5");
        assert_eq!(n(json!(1e21)), "1000000000000000000000");
        assert_eq!(n(json!(u64::MAX)), u64::MAX.to_string());
    }

    #[test]
    fn test_from_remote_coerces_numeric_leaves() {
        let remote = vec![
            object(json!({"id": "freq", "value": 30.0, "interval": "1h"})),
            object(json!({"id": "age", "value": 7, "enabled": true, "extra": {"n": 1.0}})),
        ];
        let normalized = from_remote(remote);

        assert_eq!(normalized[0]["value"], json!("30"));
        assert_eq!(normalized[0]["interval"], json!("1h"));
        assert_eq!(normalized[1]["value"], json!("7"));
        assert_eq!(normalized[1]["enabled"], json!(true));
        assert_eq!(normalized[1]["extra"], json!({"n": 1.0}));
    }

    #[test]
    fn test_plugin_config_projection() {
        let remote = vec![
            PluginConfigEntry {
                name: "a".to_string(),
                value: json!("x"),
            },
            PluginConfigEntry {
                name: "b".to_string(),
                value: json!(5),
            },
            PluginConfigEntry {
                name: "c".to_string(),
                value: json!("y"),
            },
        ];

        let projected = project_plugin_config(&remote, ["a", "b"]);

        let expected: BTreeMap<String, String> = [
            ("a".to_string(), "x".to_string()),
            ("b".to_string(), String::new()),
        ]
        .into_iter()
        .collect();
        assert_eq!(projected, expected);
    }

    #[test]
    fn test_plugin_config_projection_missing_remote_key() {
        let projected = project_plugin_config(&[], ["urls"]);
        assert_eq!(projected.get("urls").map(String::as_str), Some(""));
    }

    #[test]
    fn test_plugin_config_params() {
        let config = object(json!({"urls": "https://example.com/hook", "timeout": 5, "skip": null}));
        let params = plugin_config_params(&config).unwrap();

        assert_eq!(params["urls"], "https://example.com/hook");
        assert_eq!(params["timeout"], "5");
        assert!(!params.contains_key("skip"));

        let config = object(json!({"urls": ["a", "b"]}));
        let err = plugin_config_params(&config).unwrap_err();
        assert_eq!(err.entries[0].component, "config");
    }
}
