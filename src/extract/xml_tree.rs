//! XML Inventory Extraction
//!
//! Handles the legacy cgi vendors that return their camera inventory as XML.
//! The document is converted to an equivalent JSON tree with a structural
//! (not semantic) mapping, then a fixed element path is descended to reach
//! the per-camera items.
//!
//! Conversion rules:
//! - an element becomes an object keyed by child element name
//! - repeated child names become an array, in document order
//! - attributes become "@name" keys
//! - a text-only element becomes a plain string
//! - text next to attributes or children lands under "#text"

use serde_json::{Map, Value};

use crate::record::RawCameraRecord;
use crate::{Error, Result};

/// Extract camera records from an XML inventory payload.
///
/// `path` is the element path from the document root down to the item list
/// (for Naiz: `["list", "item"]`). A single item element is accepted as a
/// one-element list. An empty list element yields no records.
pub fn extract_records(payload: &str, path: &[&str]) -> Result<Vec<RawCameraRecord>> {
    let document = xml_to_json(payload)?;

    let mut node = &document;
    for key in path {
        match node {
            Value::Object(object) => {
                node = object.get(*key).ok_or_else(|| {
                    Error::Parse(format!("XML inventory has no <{}> element", key))
                })?;
            }
            // An empty element converts to "" and means an empty inventory
            Value::String(text) if text.is_empty() => return Ok(Vec::new()),
            _ => {
                return Err(Error::Parse(format!(
                    "unexpected shape at <{}> in XML inventory",
                    key
                )))
            }
        }
    }

    let mut records = Vec::new();
    match node {
        Value::Array(items) => {
            for item in items {
                match item.as_object() {
                    Some(object) => records.push(RawCameraRecord::from_json_object(object)),
                    None => tracing::warn!("Skipping non-object XML inventory item"),
                }
            }
        }
        Value::Object(object) => records.push(RawCameraRecord::from_json_object(object)),
        Value::String(text) => {
            if !text.trim().is_empty() {
                tracing::warn!("Skipping text-only XML inventory item");
            }
        }
        _ => {
            return Err(Error::Parse(
                "XML inventory items have unexpected shape".to_string(),
            ))
        }
    }

    Ok(records)
}

/// Convert an XML document to its structural JSON equivalent.
///
/// The result is an object with one key, the root element name. Fails only
/// when the document itself is unreadable (unclosed or mismatched tags,
/// missing root).
pub fn xml_to_json(xml: &str) -> Result<Value> {
    let mut parser = XmlParser::new(xml);
    parser.skip_misc();
    if parser.finished() {
        return Err(Error::Parse("XML document has no root element".to_string()));
    }

    let (name, value) = parser.parse_element().map_err(Error::Parse)?;

    let mut root = Map::new();
    root.insert(name, value);
    Ok(Value::Object(root))
}

struct XmlParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> XmlParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.trim_start_matches('\u{feff}'),
            pos: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn finished(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn advance(&mut self, bytes: usize) {
        self.pos += bytes;
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    /// Skip the XML declaration, comments and DOCTYPE before the root element
    fn skip_misc(&mut self) {
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("<?") {
                match rest.find("?>") {
                    Some(end) => self.advance(end + 2),
                    None => {
                        self.pos = self.input.len();
                        return;
                    }
                }
            } else if rest.starts_with("<!--") {
                match rest.find("-->") {
                    Some(end) => self.advance(end + 3),
                    None => {
                        self.pos = self.input.len();
                        return;
                    }
                }
            } else if rest.starts_with("<!DOCTYPE") || rest.starts_with("<!doctype") {
                match rest.find('>') {
                    Some(end) => self.advance(end + 1),
                    None => {
                        self.pos = self.input.len();
                        return;
                    }
                }
            } else {
                return;
            }
        }
    }

    /// Parse one element (cursor on '<') and return (name, converted value)
    fn parse_element(&mut self) -> std::result::Result<(String, Value), String> {
        if !self.rest().starts_with('<') {
            return Err("expected element start".to_string());
        }
        self.advance(1);
        let name = self.parse_name()?;

        let mut attributes: Vec<(String, String)> = Vec::new();
        let self_closing = loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.starts_with("/>") {
                self.advance(2);
                break true;
            }
            if rest.starts_with('>') {
                self.advance(1);
                break false;
            }
            if rest.is_empty() {
                return Err(format!("unterminated <{}> tag", name));
            }

            let attr_name = self.parse_name()?;
            self.skip_whitespace();
            if !self.rest().starts_with('=') {
                return Err(format!("attribute \"{}\" is missing a value", attr_name));
            }
            self.advance(1);
            self.skip_whitespace();
            let quote = match self.rest().chars().next() {
                Some(c @ ('"' | '\'')) => c,
                _ => return Err(format!("attribute \"{}\" has no quoted value", attr_name)),
            };
            self.advance(1);
            let value_end = self
                .rest()
                .find(quote)
                .ok_or_else(|| format!("unterminated attribute value in <{}>", name))?;
            let raw_value = &self.rest()[..value_end];
            attributes.push((attr_name, decode_entities(raw_value)));
            self.advance(value_end + 1);
        };

        if self_closing {
            return Ok((name, element_value(attributes, Vec::new(), String::new())));
        }

        let mut children: Vec<(String, Value)> = Vec::new();
        let mut text = String::new();
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Err(format!("missing closing tag for <{}>", name));
            }
            if rest.starts_with("<!--") {
                let end = rest
                    .find("-->")
                    .ok_or_else(|| "unterminated comment".to_string())?;
                self.advance(end + 3);
                continue;
            }
            if rest.starts_with("<![CDATA[") {
                let inner = &rest["<![CDATA[".len()..];
                let end = inner
                    .find("]]>")
                    .ok_or_else(|| "unterminated CDATA section".to_string())?;
                text.push_str(&inner[..end]);
                self.advance("<![CDATA[".len() + end + 3);
                continue;
            }
            if rest.starts_with("</") {
                self.advance(2);
                let closing = self.parse_name()?;
                if closing != name {
                    return Err(format!(
                        "mismatched closing tag </{}> inside <{}>",
                        closing, name
                    ));
                }
                self.skip_whitespace();
                if !self.rest().starts_with('>') {
                    return Err(format!("malformed closing tag </{}>", closing));
                }
                self.advance(1);
                break;
            }
            if rest.starts_with('<') {
                let child = self.parse_element()?;
                children.push(child);
                continue;
            }

            let run_end = rest.find('<').unwrap_or(rest.len());
            text.push_str(&decode_entities(&rest[..run_end]));
            self.advance(run_end);
        }

        Ok((name, element_value(attributes, children, text)))
    }

    fn parse_name(&mut self) -> std::result::Result<String, String> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '>' || c == '/' || c == '=')
            .unwrap_or(rest.len());
        if end == 0 {
            return Err("empty XML name".to_string());
        }
        let name = rest[..end].to_string();
        self.advance(end);
        Ok(name)
    }
}

/// Assemble the JSON value for one parsed element
fn element_value(
    attributes: Vec<(String, String)>,
    children: Vec<(String, Value)>,
    text: String,
) -> Value {
    let text = text.trim().to_string();

    if attributes.is_empty() && children.is_empty() {
        return Value::String(text);
    }

    let mut object = Map::new();
    for (attr_name, attr_value) in attributes {
        object.insert(format!("@{}", attr_name), Value::String(attr_value));
    }
    for (child_name, child_value) in children {
        merge_child(&mut object, child_name, child_value);
    }
    if !text.is_empty() {
        object.insert("#text".to_string(), Value::String(text));
    }

    Value::Object(object)
}

/// Insert a child, promoting repeated names to an array
fn merge_child(object: &mut Map<String, Value>, name: String, value: Value) {
    match object.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            object.insert(name, value);
        }
    }
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match rest.find(';') {
            Some(end) => {
                let entity = &rest[1..end];
                let decoded = match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    _ => entity
                        .strip_prefix("#x")
                        .or_else(|| entity.strip_prefix("#X"))
                        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                        .or_else(|| {
                            entity.strip_prefix('#').and_then(|dec| dec.parse::<u32>().ok())
                        })
                        .and_then(char::from_u32),
                };
                match decoded {
                    Some(c) => {
                        out.push(c);
                        rest = &rest[end + 1..];
                    }
                    None => {
                        out.push('&');
                        rest = &rest[1..];
                    }
                }
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
