// JSON records -> CSV export.
use serde_json::Value;

use crate::convert::json_utils::parse_json;
use crate::error::{Result, ToolError};

/// Converts an array of objects (or a single object) into CSV. The header is
/// the union of keys in first-seen order; nested values are written as JSON.
pub fn json_to_csv(input: &str) -> Result<String> {
    let value = parse_json(input)?;
    let rows = match &value {
        Value::Array(items) => items.iter().collect::<Vec<_>>(),
        Value::Object(_) => vec![&value],
        _ => return Err(ToolError::invalid("JSON", "expected an array of objects")),
    };
    let mut header: Vec<String> = Vec::new();
    for row in &rows {
        let Value::Object(map) = row else {
            return Err(ToolError::invalid("JSON", "every array item must be an object"));
        };
        for key in map.keys() {
            if !header.contains(key) {
                header.push(key.clone());
            }
        }
    }

    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(&header)?;
    for row in &rows {
        let record: Vec<String> = header.iter().map(|key| cell_text(row.get(key))).collect();
        writer.write_record(&record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ToolError::invalid("CSV", err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| ToolError::invalid("CSV", err.to_string()))
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
