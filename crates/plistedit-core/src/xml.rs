use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Errors produced while building an element tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    /// The text is not well-formed XML.
    #[error("malformed XML at byte {position}: {message}")]
    Syntax {
        /// Byte offset near the problem.
        position: usize,
        /// Description from the XML reader.
        message: String,
    },
    /// The document contains no element at all.
    #[error("document has no root element")]
    NoRootElement,
    /// A second top-level element follows the root.
    #[error("document has more than one root element")]
    MultipleRoots,
    /// The input ended while an element was still open.
    #[error("element <{0}> is not closed")]
    Unclosed(String),
}

fn syntax(position: usize, err: impl fmt::Display) -> XmlError {
    XmlError::Syntax {
        position,
        message: err.to_string(),
    }
}

/// Content of an element: a nested element or a run of character data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Child element.
    Element(XmlElement),
    /// Unescaped text or CDATA.
    Text(String),
}

/// Element with its attributes and ordered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    nodes: Vec<XmlNode>,
}

impl XmlElement {
    fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            attributes,
            nodes: Vec::new(),
        }
    }

    /// Tag name as written, including any prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the attribute `name`, unescaped.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Mixed content in document order.
    pub fn nodes(&self) -> &[XmlNode] {
        &self.nodes
    }

    /// Child elements in document order, skipping text.
    pub fn children(&self) -> impl Iterator<Item = &XmlElement> {
        self.nodes.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// Number of child elements.
    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.nodes {
            match node {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(el) => el.collect_text(out),
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(XmlNode::Text(last)) = self.nodes.last_mut() {
            last.push_str(text);
        } else {
            self.nodes.push(XmlNode::Text(text.to_string()));
        }
    }
}

/// A parsed document: prolog, comments and processing instructions are
/// dropped, only the root element tree is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    /// The document element.
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Consumes the document, returning the document element.
    pub fn into_root(self) -> XmlElement {
        self.root
    }
}

/// Parses `text` into an element tree.
///
/// Literal line endings in character data are normalized to `\n` before
/// entity and character references are resolved, as XML requires.
pub fn parse_xml(text: &str) -> Result<XmlDocument, XmlError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let position = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|err| syntax(reader.buffer_position(), err))?;
        match event {
            Event::Start(start) => stack.push(open_element(&start, position)?),
            Event::Empty(start) => {
                let element = open_element(&start, position)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| syntax(position, "closing tag without an open element"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(raw) => {
                let raw = std::str::from_utf8(&raw).map_err(|err| syntax(position, err))?;
                match stack.last_mut() {
                    Some(parent) => {
                        let normalized = normalize_line_endings(raw);
                        let text = unescape(&normalized).map_err(|err| syntax(position, err))?;
                        parent.push_text(&text);
                    }
                    None if raw.trim().is_empty() => {}
                    None => return Err(syntax(position, "text outside the root element")),
                }
            }
            Event::CData(data) => {
                let data = data.into_inner();
                let raw = std::str::from_utf8(&data).map_err(|err| syntax(position, err))?;
                let parent = stack
                    .last_mut()
                    .ok_or_else(|| syntax(position, "CDATA outside the root element"))?;
                parent.push_text(&normalize_line_endings(raw));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name));
    }
    root.map(|root| XmlDocument { root })
        .ok_or(XmlError::NoRootElement)
}

fn open_element(start: &BytesStart<'_>, position: usize) -> Result<XmlElement, XmlError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|err| syntax(position, err))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| syntax(position, err))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement::new(name, attributes))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.nodes.push(XmlNode::Element(element));
            Ok(())
        }
        None if root.is_some() => Err(XmlError::MultipleRoots),
        None => {
            *root = Some(element);
            Ok(())
        }
    }
}

fn normalize_line_endings(raw: &str) -> Cow<'_, str> {
    if raw.contains('\r') {
        Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Escapes `s` for use as property-list element text.
///
/// Markup characters become entity references; line breaks (CRLF, LF or CR)
/// become `&#13;` and tabs become `&#9;`, since raw control characters are not
/// allowed inside property-list text.
pub fn escape_xml(s: &str) -> String {
    let escaped = escape(s);
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("&#13;");
            }
            '\n' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            other => out.push(other),
        }
    }
    out
}
