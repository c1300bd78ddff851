//! Structured text converters: JSON, YAML, TOML and XML.
//!
//! Every conversion goes through `serde_json::Value`, so the four formats
//! share one error path and one notion of equality.
//!
//! ```rust
//! use devtools_core::convert::formats::convert_formats;
//!
//! let yaml = convert_formats("JSON", "YAML", r#"{"name":"Ada"}"#)?;
//! assert_eq!(yaml.trim(), "name: Ada");
//! # Ok::<(), devtools_core::error::ToolError>(())
//! ```
use serde::Deserialize;
use serde_json::Value;

use crate::convert::json_utils::{
    encode_json, json_to_toml, parse_json, sort_keys, toml_to_json, yaml_to_json,
};
use crate::convert::xml;
use crate::error::{Result, ToolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Toml,
    Xml,
}

impl Format {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "JSON" => Ok(Self::Json),
            "YAML" | "YML" => Ok(Self::Yaml),
            "TOML" => Ok(Self::Toml),
            "XML" => Ok(Self::Xml),
            _ => Err(ToolError::unsupported("format", name.trim())),
        }
    }

    fn read(self, input: &str) -> Result<Value> {
        if input.trim().is_empty() {
            return Err(ToolError::EmptyInput("input"));
        }
        match self {
            Self::Json => parse_json(input),
            Self::Yaml => Ok(yaml_to_json(serde_yaml::from_str(input)?)),
            Self::Toml => Ok(toml_to_json(input.parse::<toml::Value>()?)),
            Self::Xml => xml::xml_to_json(input),
        }
    }

    fn write(self, value: &Value, minify: bool) -> Result<String> {
        match self {
            Self::Json => encode_json(value, if minify { 0 } else { 2 }),
            Self::Yaml => Ok(serde_yaml::to_string(value)?),
            Self::Toml => Ok(toml::to_string(&json_to_toml(value)?)?),
            Self::Xml => Ok(xml::json_to_xml(value)),
        }
    }
}

/// Converts `input` from one format to another. Converting a format to itself
/// returns the input untouched.
pub fn convert_formats(from: &str, to: &str, input: &str) -> Result<String> {
    let source = Format::parse(from)?;
    let target = Format::parse(to)?;
    if source == target {
        return Ok(input.to_string());
    }
    log::debug!("converting {} bytes from {source:?} to {target:?}", input.len());
    let value = source.read(input)?;
    target.write(&value, false)
}

/// Re-emits a document in its own format with normalized spacing.
pub fn format_content(format: &str, input: &str, minify: bool) -> Result<String> {
    let format = Format::parse(format)?;
    let value = format.read(input)?;
    format.write(&value, minify)
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsonFormatOptions {
    /// Spaces per nesting level; 0 minifies.
    pub indent: usize,
    pub sort_keys: bool,
}

impl Default for JsonFormatOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            sort_keys: false,
        }
    }
}

pub fn format_json(input: &str, options: JsonFormatOptions) -> Result<String> {
    let value = parse_json(input)?;
    let value = if options.sort_keys {
        sort_keys(&value)
    } else {
        value
    };
    encode_json(&value, options.indent.min(8))
}

pub fn minify_json(input: &str) -> Result<String> {
    encode_json(&parse_json(input)?, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_yaml_toml_chain_preserves_data() {
        let json = r#"{"name":"Ada","langs":["en","fr"],"age":36}"#;
        let toml = convert_formats("JSON", "TOML", json).unwrap();
        assert!(toml.contains("name = \"Ada\""));
        let yaml = convert_formats("TOML", "YAML", &toml).unwrap();
        assert!(yaml.contains("- en"));
        let back = convert_formats("yaml", "json", &yaml).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&back).unwrap(),
            serde_json::from_str::<Value>(json).unwrap()
        );
    }

    #[test]
    fn xml_conversion_uses_root_element() {
        let json = convert_formats("XML", "JSON", "<user><name>Ada</name></user>").unwrap();
        assert_eq!(json, "{\n  \"user\": {\n    \"name\": \"Ada\"\n  }\n}");
    }

    #[test]
    fn same_format_is_identity_and_unknown_is_rejected() {
        assert_eq!(convert_formats("JSON", "json", "{ }").unwrap(), "{ }");
        let err = convert_formats("CSV", "JSON", "a,b").unwrap_err();
        assert_eq!(err.to_string(), "unsupported format: CSV");
        assert!(convert_formats("YAML", "JSON", "").is_err());
    }

    #[test]
    fn format_json_honours_indent_and_sorting() {
        let options = JsonFormatOptions {
            indent: 4,
            sort_keys: true,
        };
        assert_eq!(
            format_json(r#"{"b":1,"a":[1]}"#, options).unwrap(),
            "{\n    \"a\": [\n        1\n    ],\n    \"b\": 1\n}"
        );
        assert_eq!(minify_json("{ \"a\" : [ 1 , 2 ] }").unwrap(), r#"{"a":[1,2]}"#);
        assert!(format_json("{", JsonFormatOptions::default()).is_err());
    }

    #[test]
    fn format_content_normalizes_yaml() {
        let out = format_content("YAML", "a:   1\nb:\n    - x", false).unwrap();
        assert_eq!(out, "a: 1\nb:\n- x\n");
    }
}
