//! XML ⇄ value mapping.
//!
//! An element becomes an object; attributes live under [`ATTRIBUTES_KEY`],
//! text content under [`TEXT_KEY`]. An element without attributes or child
//! elements collapses to its (coerced) text.
//!
//! Siblings: a tag that occurs more than once among its siblings is an array,
//! a tag that occurs once is a single value. A one-element array therefore
//! comes back as a plain value after a round trip.

use indexmap::IndexMap;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;

use crate::error::{EmitError, ParseError, Position};
use crate::format::Format;
use crate::value::{Map, Value, coerce_text};

pub const TEXT_KEY: &str = "#text";
pub const ATTRIBUTES_KEY: &str = "@attributes";

// ------------------------------- Parse ------------------------------------ //

#[derive(Default)]
struct Frame {
    name: String,
    attrs: Map,
    children: Vec<(String, Value)>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>, text: &str, offset: usize) -> Result<Self, ParseError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attrs = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| fail(text, offset, e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| fail(text, offset, e.to_string()))?;
            attrs.insert(key, Value::String(value.into_owned()));
        }
        Ok(Self { name, attrs, ..Self::default() })
    }

    fn close(self) -> Value {
        let text = self.text.trim();
        if self.attrs.is_empty() && self.children.is_empty() {
            return if text.is_empty() { Value::String(String::new()) } else { coerce_text(text) };
        }
        let mut out = Map::new();
        if !self.attrs.is_empty() {
            out.insert(ATTRIBUTES_KEY.to_string(), Value::Object(self.attrs));
        }
        if !text.is_empty() {
            out.insert(TEXT_KEY.to_string(), coerce_text(text));
        }
        out.extend(group_siblings(self.children));
        Value::Object(out)
    }
}

// once → value, more than once → array, in first-seen order
fn group_siblings(children: Vec<(String, Value)>) -> Map {
    let mut groups: IndexMap<String, Vec<Value>> = IndexMap::new();
    for (name, value) in children {
        groups.entry(name).or_default().push(value);
    }
    groups
        .into_iter()
        .map(|(name, mut values)| {
            let value = if values.len() == 1 { values.remove(0) } else { Value::Array(values) };
            (name, value)
        })
        .collect()
}

fn fail(text: &str, offset: usize, message: impl Into<String>) -> ParseError {
    ParseError::new(Format::Xml, message).at(Position::from_offset(text, offset))
}

/// Parse a document (or a fragment with several top-level elements) into an
/// object keyed by the top-level element names.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = vec![Frame::default()];
    loop {
        let offset = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| fail(text, reader.buffer_position() as usize, e.to_string()))?;
        match event {
            Event::Start(start) => stack.push(Frame::open(&start, text, offset)?),
            Event::Empty(start) => {
                let frame = Frame::open(&start, text, offset)?;
                let name = frame.name.clone();
                let value = frame.close();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push((name, value));
                }
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                if stack.len() < 2 {
                    return Err(fail(text, offset, format!("closing tag </{name}> without an opening tag")));
                }
                let Some(frame) = stack.pop() else { break };
                if frame.name != name {
                    return Err(fail(text, offset, format!("expected </{}>, found </{name}>", frame.name)));
                }
                let value = frame.close();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push((name, value));
                }
            }
            Event::Text(t) => {
                let chunk = t.unescape().map_err(|e| fail(text, offset, e.to_string()))?;
                push_text(&mut stack, &chunk, text, offset)?;
            }
            Event::CData(c) => {
                let chunk = String::from_utf8_lossy(&c.into_inner()).into_owned();
                push_text(&mut stack, &chunk, text, offset)?;
            }
            Event::Eof => break,
            // declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    if stack.len() > 1 {
        let open = stack.last().map(|f| f.name.clone()).unwrap_or_default();
        return Err(fail(text, text.len(), format!("unterminated element <{open}>")));
    }
    let root = stack.pop().unwrap_or_default();
    if root.children.is_empty() {
        return Err(ParseError::new(Format::Xml, "document has no root element"));
    }
    Ok(Value::Object(group_siblings(root.children)))
}

fn push_text(stack: &mut [Frame], chunk: &str, text: &str, offset: usize) -> Result<(), ParseError> {
    match stack {
        [_root] => Err(fail(text, offset, "text outside of the root element")),
        [.., frame] => {
            frame.text.push_str(chunk);
            Ok(())
        }
        [] => Ok(()),
    }
}

// ------------------------------- Emit ------------------------------------- //

type XmlWriter = Writer<Vec<u8>>;

/// The root must be an object; its keys become the top-level elements.
pub fn serialize(value: &Value) -> Result<String, EmitError> {
    let Value::Object(root) = value else {
        return Err(EmitError::format(
            Format::Xml,
            format!("an object is required at the root, found {}", value.kind()),
        ));
    };
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    for (name, child) in root {
        if name == TEXT_KEY || name == ATTRIBUTES_KEY {
            return Err(EmitError::format(Format::Xml, format!("`{name}` is not allowed at the root")));
        }
        write_element(&mut writer, name, child)?;
    }
    let bytes = writer.into_inner();
    // `{}` or only empty arrays: there is no root element to write
    if bytes.is_empty() {
        return Err(EmitError::format(Format::Xml, "a document needs at least one element"));
    }
    String::from_utf8(bytes).map_err(|e| EmitError::format(Format::Xml, e.to_string()))
}

fn write_element(w: &mut XmlWriter, name: &str, value: &Value) -> Result<(), EmitError> {
    if !is_xml_name(name) {
        return Err(EmitError::format(Format::Xml, format!("`{name}` is not a valid element name")));
    }
    match value {
        Value::Null => emit(w, Event::Empty(BytesStart::new(name))),
        Value::Array(items) => {
            for item in items {
                if matches!(item, Value::Array(_)) {
                    return Err(EmitError::format(
                        Format::Xml,
                        format!("nested arrays under <{name}> have no XML representation"),
                    ));
                }
                write_element(w, name, item)?;
            }
            Ok(())
        }
        Value::Object(m) => {
            let mut start = BytesStart::new(name);
            if let Some(attrs) = m.get(ATTRIBUTES_KEY) {
                let Value::Object(attrs) = attrs else {
                    return Err(EmitError::format(Format::Xml, format!("{ATTRIBUTES_KEY} of <{name}> must be an object")));
                };
                for (k, v) in attrs {
                    let text = v.scalar_text().ok_or_else(|| {
                        EmitError::format(Format::Xml, format!("attribute `{k}` of <{name}> must be a scalar"))
                    })?;
                    if !is_xml_name(k) {
                        return Err(EmitError::format(Format::Xml, format!("`{k}` is not a valid attribute name")));
                    }
                    start.push_attribute((k.as_str(), text.as_str()));
                }
            }
            let body = m.iter().filter(|(k, _)| k.as_str() != ATTRIBUTES_KEY).collect::<Vec<_>>();
            if body.is_empty() {
                return emit(w, Event::Empty(start));
            }
            emit(w, Event::Start(start))?;
            for (k, v) in body {
                if k == TEXT_KEY {
                    let text = v.scalar_text().ok_or_else(|| {
                        EmitError::format(Format::Xml, format!("{TEXT_KEY} of <{name}> must be a scalar"))
                    })?;
                    emit(w, Event::Text(BytesText::new(&text)))?;
                } else {
                    write_element(w, k, v)?;
                }
            }
            emit(w, Event::End(BytesEnd::new(name)))
        }
        scalar => {
            let text = scalar.scalar_text().unwrap_or_default();
            emit(w, Event::Start(BytesStart::new(name)))?;
            emit(w, Event::Text(BytesText::new(&text)))?;
            emit(w, Event::End(BytesEnd::new(name)))
        }
    }
}

fn emit(w: &mut XmlWriter, event: Event<'_>) -> Result<(), EmitError> {
    w.write_event(event).map_err(|e| EmitError::format(Format::Xml, e.to_string()))
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(j: serde_json::Value) -> Value {
        Value::from(j)
    }

    #[test]
    fn single_element_array_collapses_on_round_trip() {
        let out = serialize(&v(json!({"item": [1]}))).unwrap();
        assert_eq!(out, "<item>1</item>");
        assert_eq!(parse(&out).unwrap(), v(json!({"item": 1})));
    }

    #[test]
    fn repeated_siblings_become_arrays() {
        let src = "<catalog><book>A</book><book>B</book><owner>me</owner></catalog>";
        assert_eq!(
            parse(src).unwrap(),
            v(json!({"catalog": {"book": ["A", "B"], "owner": "me"}}))
        );
    }

    #[test]
    fn attributes_and_text_use_reserved_keys() {
        let src = r#"<?xml version="1.0"?><price currency="EUR" note="a &amp; b">12.5</price>"#;
        assert_eq!(
            parse(src).unwrap(),
            v(json!({"price": {"@attributes": {"currency": "EUR", "note": "a & b"}, "#text": 12.5}}))
        );
        let back = serialize(&parse(src).unwrap()).unwrap();
        assert_eq!(back, r#"<price currency="EUR" note="a &amp; b">12.5</price>"#);
    }

    #[test]
    fn nested_objects_become_child_elements() {
        let value = v(json!({"user": {"name": "Ada", "langs": ["en", "fr"], "address": {"city": "Paris"}, "nick": null}}));
        let out = serialize(&value).unwrap();
        assert_eq!(
            out,
            "<user>\n  <name>Ada</name>\n  <langs>en</langs>\n  <langs>fr</langs>\n  <address>\n    <city>Paris</city>\n  </address>\n  <nick/>\n</user>"
        );
        // null reads back as an empty string
        assert_eq!(
            parse(&out).unwrap(),
            v(json!({"user": {"name": "Ada", "langs": ["en", "fr"], "address": {"city": "Paris"}, "nick": ""}}))
        );
    }

    #[test]
    fn unterminated_and_mismatched_tags_fail() {
        let err = parse("<a>\n  <b>text</b>\n").unwrap_err();
        assert_eq!(err.format, Format::Xml);
        assert!(err.position.is_some());

        let err = parse("<a><b></a>").unwrap_err();
        assert_eq!(err.format, Format::Xml);
    }

    #[test]
    fn root_must_be_an_object() {
        assert!(matches!(serialize(&v(json!([1, 2]))), Err(EmitError::Format { format: Format::Xml, .. })));
        assert!(serialize(&v(json!({"a": [[1]]}))).is_err());
        assert!(serialize(&v(json!({"bad name": 1}))).is_err());
    }

    #[test]
    fn empty_documents_are_rejected() {
        let expected = EmitError::format(Format::Xml, "a document needs at least one element");
        assert_eq!(serialize(&v(json!({}))).unwrap_err(), expected);
        assert_eq!(serialize(&v(json!({"a": []}))).unwrap_err(), expected);
        assert_eq!(parse(&serialize(&v(json!({"a": [], "b": 1}))).unwrap()).unwrap(), v(json!({"b": 1})));
    }
}
