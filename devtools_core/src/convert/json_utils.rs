// JSON/TOML/YAML value bridges shared by the format converters.
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Value};

use crate::error::{Result, ToolError};

/// Parses JSON, treating blank input as an error rather than EOF noise.
///
/// # Example
/// ```
/// use devtools_core::convert::json_utils::parse_json;
/// let value = parse_json("{\"id\":1}")?;
/// assert_eq!(value["id"], 1);
/// # Ok::<(), devtools_core::error::ToolError>(())
/// ```
pub fn parse_json(input: &str) -> Result<Value> {
    if input.trim().is_empty() {
        return Err(ToolError::EmptyInput("JSON"));
    }
    Ok(serde_json::from_str(input)?)
}

/// Serializes with `indent` spaces per level; an indent of 0 minifies.
///
/// # Example
/// ```
/// use serde_json::json;
/// use devtools_core::convert::json_utils::encode_json;
/// assert_eq!(encode_json(&json!({"a":1}), 0)?, "{\"a\":1}");
/// assert_eq!(encode_json(&json!({"a":1}), 4)?, "{\n    \"a\": 1\n}");
/// # Ok::<(), devtools_core::error::ToolError>(())
/// ```
pub fn encode_json(value: &Value, indent: usize) -> Result<String> {
    if indent == 0 {
        return Ok(serde_json::to_string(value)?);
    }
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|err| ToolError::invalid("JSON", err.to_string()))
}

/// Returns a copy of `value` with every object's keys sorted.
pub fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let sorted: Map<String, Value> = keys
                .into_iter()
                .map(|key| (key.clone(), sort_keys(&map[key])))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

pub fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(num) => {
            if let Some(i) = num.as_i64() {
                Value::Number(Number::from(i))
            } else if let Some(u) = num.as_u64() {
                Value::Number(Number::from(u))
            } else {
                num.as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Value::Array(seq.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let obj = map
                .into_iter()
                .map(|(k, v)| (yaml_key(k), yaml_to_json(v)))
                .collect();
            Value::Object(obj)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".into(),
        other => serde_yaml::to_string(&other)
            .unwrap_or_default()
            .trim()
            .to_string(),
    }
}

pub fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(Number::from(i)),
        toml::Value::Float(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => {
            Value::Object(table.into_iter().map(|(k, v)| (k, toml_to_json(v))).collect())
        }
    }
}

/// TOML has no null, so nulls inside tables are dropped and a null root is
/// rejected.
pub fn json_to_toml(value: &Value) -> Result<toml::Value> {
    match value {
        Value::Null => Err(ToolError::invalid("TOML", "null has no TOML representation")),
        Value::Bool(b) => Ok(toml::Value::Boolean(*b)),
        Value::Number(num) => {
            if let Some(i) = num.as_i64() {
                Ok(toml::Value::Integer(i))
            } else if let Some(f) = num.as_f64() {
                Ok(toml::Value::Float(f))
            } else {
                Err(ToolError::invalid("TOML", format!("number {num} is out of range")))
            }
        }
        Value::String(s) => Ok(toml::Value::String(s.clone())),
        Value::Array(arr) => {
            let items = arr
                .iter()
                .filter(|item| !item.is_null())
                .map(json_to_toml)
                .collect::<Result<Vec<_>>>()?;
            Ok(toml::Value::Array(items))
        }
        Value::Object(map) => {
            let mut table = toml::value::Table::new();
            for (k, v) in map.iter().filter(|(_, v)| !v.is_null()) {
                table.insert(k.clone(), json_to_toml(v)?);
            }
            Ok(toml::Value::Table(table))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sort_keys_recurses_into_arrays() {
        let value = json!({"b": [{"z": 1, "a": 2}], "a": null});
        let sorted = sort_keys(&value);
        assert_eq!(
            serde_json::to_string(&sorted).unwrap(),
            r#"{"a":null,"b":[{"a":2,"z":1}]}"#
        );
    }

    #[test]
    fn toml_drops_nulls() {
        let toml = json_to_toml(&json!({"a": 1, "b": null})).unwrap();
        assert_eq!(toml::to_string(&toml).unwrap(), "a = 1\n");
        assert!(json_to_toml(&Value::Null).is_err());
    }

    #[test]
    fn blank_json_is_reported_as_empty() {
        let err = parse_json("  ").unwrap_err();
        assert_eq!(err.to_string(), "JSON is empty");
    }
}
