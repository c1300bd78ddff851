// JSON <-> XML bridge.
//
// Attributes map to `@name` keys and mixed text to `#text`, so a document
// survives a trip through JSON and back. Repeated sibling tags become arrays.
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::{Result, ToolError};

const ATTR_PREFIX: char = '@';
const TEXT_KEY: &str = "#text";

/// Renders JSON as an XML document. A single-key object names the root
/// element; anything else is wrapped in `<root>`.
pub fn json_to_xml(value: &Value) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    match value {
        Value::Object(map) if map.len() == 1 && !map.values().any(Value::is_array) => {
            for (name, child) in map {
                write_element(&mut out, name, child, 0);
            }
        }
        other => write_element(&mut out, "root", other, 0),
    }
    out
}

fn write_element(buf: &mut String, name: &str, value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Array(items) => {
            for item in items {
                write_element(buf, name, item, depth);
            }
        }
        Value::Object(map) => {
            buf.push_str(&indent);
            buf.push('<');
            buf.push_str(name);
            for (key, attr) in map.iter().filter(|(k, _)| k.starts_with(ATTR_PREFIX)) {
                buf.push_str(&format!(" {}=\"{}\"", &key[1..], escape(&scalar_text(attr))));
            }
            let children: Vec<(&String, &Value)> = map
                .iter()
                .filter(|(k, _)| !k.starts_with(ATTR_PREFIX) && k.as_str() != TEXT_KEY)
                .collect();
            let text = map.get(TEXT_KEY).map(scalar_text);
            if children.is_empty() {
                match text {
                    Some(text) => buf.push_str(&format!(">{}</{name}>\n", escape(&text))),
                    None => buf.push_str("/>\n"),
                }
                return;
            }
            buf.push_str(">\n");
            if let Some(text) = text {
                buf.push_str(&format!("{indent}  {}\n", escape(&text)));
            }
            for (key, child) in children {
                write_element(buf, key, child, depth + 1);
            }
            buf.push_str(&format!("{indent}</{name}>\n"));
        }
        scalar => {
            buf.push_str(&format!("{indent}<{name}>{}</{name}>\n", escape(&scalar_text(scalar))));
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[derive(Debug, Default)]
struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn open(tag: &BytesStart<'_>) -> Result<Self> {
        let mut node = Node {
            name: String::from_utf8_lossy(tag.name().as_ref()).into_owned(),
            ..Node::default()
        };
        for attr in tag.attributes() {
            let attr = attr.map_err(|err| ToolError::invalid("XML attribute", err.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            node.attributes.push((key, value));
        }
        Ok(node)
    }

    fn into_value(self) -> Value {
        let text = self.text.trim().to_string();
        if self.children.is_empty() && self.attributes.is_empty() {
            return Value::String(text);
        }
        let mut obj = Map::new();
        for (key, value) in self.attributes {
            obj.insert(format!("{ATTR_PREFIX}{key}"), Value::String(value));
        }
        if !text.is_empty() {
            obj.insert(TEXT_KEY.into(), Value::String(text));
        }
        for child in self.children {
            let name = child.name.clone();
            let value = child.into_value();
            match obj.get_mut(&name) {
                None => {
                    obj.insert(name, value);
                }
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
            }
        }
        Value::Object(obj)
    }
}

/// Parses an XML document into JSON keyed by the root element name.
pub fn xml_to_json(input: &str) -> Result<Value> {
    if input.trim().is_empty() {
        return Err(ToolError::EmptyInput("XML"));
    }
    let mut reader = Reader::from_str(input);
    reader.trim_text(true);
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;
    loop {
        match reader.read_event()? {
            Event::Start(tag) => stack.push(Node::open(&tag)?),
            Event::Empty(tag) => {
                let node = Node::open(&tag)?;
                attach(&mut stack, &mut root, node);
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| ToolError::invalid("XML", "unbalanced closing tag"))?;
                attach(&mut stack, &mut root, node);
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    if !stack.is_empty() {
        return Err(ToolError::invalid("XML", "document ended before all tags were closed"));
    }
    let root = root.ok_or_else(|| ToolError::invalid("XML", "no root element"))?;
    let mut obj = Map::new();
    let name = root.name.clone();
    obj.insert(name, root.into_value());
    Ok(Value::Object(obj))
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => *root = Some(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn repeated_tags_become_arrays() {
        let value = xml_to_json("<list><item>a</item><item>b</item><item>c</item></list>").unwrap();
        assert_eq!(value, json!({"list": {"item": ["a", "b", "c"]}}));
    }

    #[test]
    fn attributes_and_text_round_trip() {
        let source = r#"<book id="7" lang="en">Dune &amp; more</book>"#;
        let value = xml_to_json(source).unwrap();
        assert_eq!(
            value,
            json!({"book": {"@id": "7", "@lang": "en", "#text": "Dune & more"}})
        );
        let xml = json_to_xml(&value);
        assert!(xml.contains(r#"<book id="7" lang="en">Dune &amp; more</book>"#), "{xml}");
        assert_eq!(xml_to_json(&xml).unwrap(), value);
    }

    #[test]
    fn non_object_roots_are_wrapped() {
        let xml = json_to_xml(&json!({"a": 1, "b": [true, false]}));
        assert!(xml.contains("<root>"));
        assert!(xml.contains("  <b>true</b>\n  <b>false</b>"));
    }

    #[test]
    fn unbalanced_documents_fail() {
        assert!(xml_to_json("<a><b></a>").is_err());
        assert!(xml_to_json("<a>").is_err());
        assert!(xml_to_json("").is_err());
    }
}
