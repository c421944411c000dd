use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, TestLensError};

#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attribute parsed as an integer; missing or unparsable values become 0.
    pub fn int_attr(&self, name: &str) -> i64 {
        self.attr(name)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Text directly inside this element, excluding nested elements.
    pub fn text(&self) -> String {
        self.text_nodes().collect()
    }

    /// All text in this element's subtree, concatenated in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        append_text(self, &mut out);
        out
    }

    pub fn text_nodes(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|child| match child {
            Node::Text(text) => Some(text.as_str()),
            Node::Element(_) => None,
        })
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// This element plus every element below it, in document order.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_subtree(self, &mut out);
        out
    }
}

fn append_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(nested) => append_text(nested, out),
        }
    }
}

fn collect_subtree<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
    out.push(element);
    for child in element.child_elements() {
        collect_subtree(child, out);
    }
}

/// Parses an XML document into its root element. `file_name` identifies the
/// source in error reports.
pub fn parse_document(file_name: &str, xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => stack.push(element_from_start(e)),
            Ok(Event::Empty(ref e)) => {
                let element = element_from_start(e);
                attach(&mut stack, &mut root, element)
                    .map_err(|message| malformed(file_name, message))?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed(file_name, "unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)
                    .map_err(|message| malformed(file_name, message))?;
            }
            Ok(Event::Text(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = e.unescape().unwrap_or_default();
                    if !text.is_empty() {
                        parent.children.push(Node::Text(text.into_owned()));
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    parent.children.push(Node::Text(text));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(malformed(file_name, &format!("XML parsing error: {e}")));
            }
            Ok(_) => {}
        }
    }

    if !stack.is_empty() {
        return Err(malformed(file_name, "unclosed element"));
    }
    root.ok_or_else(|| malformed(file_name, "no root element"))
}

fn element_from_start(e: &BytesStart) -> Element {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = IndexMap::new();
    for attr in e.attributes().filter_map(std::result::Result::ok) {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().unwrap_or_default().into_owned();
        attributes.insert(key, value);
    }
    Element {
        name,
        attributes,
        children: Vec::new(),
    }
}

fn attach(
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
    element: Element,
) -> std::result::Result<(), &'static str> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err("multiple root elements");
    }
    *root = Some(element);
    Ok(())
}

fn malformed(file_name: &str, message: &str) -> TestLensError {
    TestLensError::MalformedArtifact {
        file: file_name.to_string(),
        message: message.to_string(),
    }
}
