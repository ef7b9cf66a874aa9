// ABOUTME: Minimal XML element tree built from quick-xml events.
// ABOUTME: Keeps qualified names verbatim so prefixed podcast tags are matched literally.

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::decode::decode_feed_bytes;
use crate::error::FeedError;

/// One XML element with its attributes, concatenated text, and child elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Qualified name as written, e.g. `itunes:image`.
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Text and CDATA content directly inside this element, untrimmed.
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns a non-blank attribute value, trimmed.
    pub fn attr_value(&self, name: &str) -> Option<String> {
        non_blank(self.attr(name)?)
    }

    /// Returns the first child with the given qualified name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Returns every child with the given qualified name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Returns the trimmed text content, or None if it is blank.
    pub fn text_value(&self) -> Option<String> {
        non_blank(&self.text)
    }

    /// Returns the trimmed text of the first child with the given name.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name)?.text_value()
    }

    /// Returns an attribute of the first child with the given name.
    pub fn child_attr(&self, name: &str, attr: &str) -> Option<String> {
        self.child(name)?.attr_value(attr)
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses XML bytes into the root element. Non-UTF-8 input is transcoded first.
pub fn parse_xml(data: &[u8]) -> Result<Element, FeedError> {
    let text = decode_feed_bytes(data);
    let mut reader = Reader::from_reader(text.as_bytes());
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => stack.push(start_element(e)),
            Ok(Event::Empty(ref e)) => attach(&mut stack, &mut root, start_element(e))?,
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| FeedError::parse("unbalanced closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(ref e)) => {
                if let Some(top) = stack.last_mut() {
                    let text = e.decode().map_err(FeedError::parse)?;
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::GeneralRef(ref e)) => {
                if let Some(top) = stack.last_mut() {
                    let name = e.decode().map_err(FeedError::parse)?;
                    if let Some(ch) = e.resolve_char_ref().map_err(FeedError::parse)? {
                        top.text.push(ch);
                    } else if let Some(resolved) = resolve_predefined_entity(&name) {
                        top.text.push_str(resolved);
                    } else {
                        // Undeclared entity (e.g. &nbsp;): keep it as written.
                        top.text.push('&');
                        top.text.push_str(&name);
                        top.text.push(';');
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(FeedError::parse(format!(
                    "{} at byte {}",
                    err,
                    reader.error_position()
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(FeedError::parse("unexpected end of document"));
    }
    root.ok_or_else(|| FeedError::parse("document has no root element"))
}

fn start_element(e: &BytesStart) -> Element {
    let mut element = Element::new(String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        element.attributes.push((key, value));
    }
    element
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), FeedError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(FeedError::parse("multiple root elements")),
    }
    Ok(())
}
