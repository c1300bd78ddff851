//! Error type shared by every tool.
//!
//! Tools never recover from these: the wasm bindings turn them into a plain
//! message that the page renders next to the offending input.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    /// A required input was blank.
    #[error("{0} is empty")]
    EmptyInput(&'static str),

    /// Input was present but could not be interpreted.
    #[error("invalid {what}: {detail}")]
    Invalid { what: &'static str, detail: String },

    /// A mode, format or algorithm name the tool does not know.
    #[error("unsupported {what}: {value}")]
    Unsupported { what: &'static str, value: String },

    #[error("{0}")]
    OutOfRange(String),

    #[error("random source unavailable: {0}")]
    Random(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl ToolError {
    pub fn invalid(what: &'static str, detail: impl Into<String>) -> Self {
        Self::Invalid {
            what,
            detail: detail.into(),
        }
    }

    pub fn unsupported(what: &'static str, value: impl Into<String>) -> Self {
        Self::Unsupported {
            what,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        assert_eq!(ToolError::EmptyInput("token").to_string(), "token is empty");
        assert_eq!(
            ToolError::invalid("IPv4 address", "300.1.1.1").to_string(),
            "invalid IPv4 address: 300.1.1.1"
        );
        assert_eq!(
            ToolError::unsupported("algorithm", "HS1024").to_string(),
            "unsupported algorithm: HS1024"
        );
    }

    #[test]
    fn json_errors_convert_transparently() {
        let err: ToolError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, ToolError::Json(_)));
        assert!(err.to_string().contains("EOF"));
    }
}
