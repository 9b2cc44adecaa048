// ABOUTME: Owned, mutable XML element tree backed by quick-xml
// ABOUTME: Parses package parts into Element trees and serializes them back to bytes

use crate::errors::{Result, SlideError};
use crate::oxml::ns::local_name;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// A node in the tree: either a child element or a run of character data.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its qualified name kept verbatim (`p:sp`, `a:t`).
///
/// Lookups by child name compare local names so that templates using
/// unusual prefixes still resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: &str, value: impl ToString) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Builder-style text content.
    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.to_string()));
        self
    }

    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attr_i64(&self, key: &str) -> Option<i64> {
        self.attr(key).and_then(|v| v.trim().parse().ok())
    }

    /// OOXML booleans are written as `1`/`0` or `true`/`false`.
    pub fn attr_bool(&self, key: &str) -> Option<bool> {
        match self.attr(key)? {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, key: &str) {
        self.attributes.retain(|(k, _)| k != key);
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|e| e.is(local))
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.is(local))
    }

    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |e| e.is(local))
    }

    /// Walks a path of local names, e.g. `["cSld", "spTree"]`.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        let mut current = self;
        for step in path {
            current = current.child(step)?;
        }
        Some(current)
    }

    pub fn find_mut(&mut self, path: &[&str]) -> Option<&mut Element> {
        let mut current = self;
        for step in path {
            current = current.child_mut(step)?;
        }
        Some(current)
    }

    /// Returns the first child with the given local name, appending
    /// `qualified` when none exists.
    pub fn get_or_create(&mut self, qualified: &str) -> &mut Element {
        let local = local_name(qualified).to_string();
        let pos = self
            .children
            .iter()
            .position(|n| matches!(n, Node::Element(e) if e.is(&local)));
        let index = match pos {
            Some(i) => i,
            None => {
                self.children.push(Node::Element(Element::new(qualified)));
                self.children.len() - 1
            }
        };
        match &mut self.children[index] {
            Node::Element(e) => e,
            Node::Text(_) => unreachable!("index points at an element"),
        }
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Inserts a child element before the `n`th child element.
    pub fn insert_element(&mut self, n: usize, child: Element) {
        let mut seen = 0;
        for (i, node) in self.children.iter().enumerate() {
            if let Node::Element(_) = node {
                if seen == n {
                    self.children.insert(i, Node::Element(child));
                    return;
                }
                seen += 1;
            }
        }
        self.children.push(Node::Element(child));
    }

    /// Inserts `child` directly after the last existing child named one of
    /// `after`, or first when none of them is present.
    pub fn insert_after(&mut self, after: &[&str], child: Element) {
        let pos = self
            .children
            .iter()
            .rposition(|n| matches!(n, Node::Element(e) if after.contains(&e.local_name())));
        match pos {
            Some(i) => self.children.insert(i + 1, Node::Element(child)),
            None => self.children.insert(0, Node::Element(child)),
        }
    }

    pub fn remove_children(&mut self, local: &str) {
        self.children
            .retain(|n| !matches!(n, Node::Element(e) if e.is(local)));
    }

    /// Removes child elements matching the predicate, returning how many went.
    pub fn remove_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&Element) -> bool,
    {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, Node::Element(e) if pred(e)));
        before - self.children.len()
    }

    /// All descendant elements (pre-order, excluding self) with a local name.
    pub fn descendants<'a>(&'a self, local: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        collect_descendants(self, local, &mut found);
        found
    }

    /// Concatenated character data of the whole subtree.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Replaces all content with a single text node.
    pub fn set_text(&mut self, text: &str) {
        self.children = vec![Node::Text(text.to_string())];
    }

    pub fn parse(bytes: &[u8]) -> Result<Element> {
        let mut reader = Reader::from_reader(bytes);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(element_from_start(&e)?),
                Event::Empty(e) => {
                    let el = element_from_start(&e)?;
                    attach(&mut stack, &mut root, el);
                }
                Event::End(_) => {
                    let el = stack
                        .pop()
                        .ok_or_else(|| SlideError::XmlError("unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, el);
                }
                Event::Text(t) => {
                    let text = t.unescape()?.into_owned();
                    push_text(&mut stack, text);
                }
                Event::CData(c) => {
                    let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    push_text(&mut stack, text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(SlideError::XmlError("unexpected end of document".to_string()));
        }
        root.ok_or_else(|| SlideError::XmlError("document has no root element".to_string()))
    }

    /// Serializes with an XML declaration, as package parts expect.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        write_element(&mut writer, self)?;
        Ok(writer.into_inner())
    }
}

fn element_from_start(e: &BytesStart) -> Result<Element> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut el = Element::new(&name);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| SlideError::XmlError(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        el.attributes.push((key, value));
    }
    Ok(el)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(el)),
        None => *root = Some(el),
    }
}

fn push_text(stack: &mut [Element], text: String) {
    if let Some(parent) = stack.last_mut() {
        // Formatting whitespace between elements is noise, except in runs.
        if text.trim().is_empty() && !parent.is("t") {
            return;
        }
        parent.children.push(Node::Text(text));
    }
}

fn collect_descendants<'a>(el: &'a Element, local: &str, found: &mut Vec<&'a Element>) {
    for child in el.elements() {
        if child.is(local) {
            found.push(child);
        }
        collect_descendants(child, local, found);
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for node in &el.children {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
        }
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &Element) -> Result<()> {
    let mut start = BytesStart::new(el.name.as_str());
    for (k, v) in &el.attributes {
        start.push_attribute((k.as_str(), v.as_str()));
    }

    if el.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for node in &el.children {
        match node {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize_keeps_structure() {
        let src = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:p="urn:p" xmlns:a="urn:a">
  <p:cSld name="Demo">
    <a:t> </a:t>
    <a:t>Fish &amp; Chips</a:t>
  </p:cSld>
</p:sld>"#;
        let root = Element::parse(src).unwrap();
        assert_eq!(root.local_name(), "sld");
        let csld = root.child("cSld").unwrap();
        assert_eq!(csld.attr("name"), Some("Demo"));
        let texts: Vec<String> = csld.children_named("t").map(|t| t.text()).collect();
        assert_eq!(texts, vec![" ".to_string(), "Fish & Chips".to_string()]);

        let bytes = root.to_bytes().unwrap();
        let again = Element::parse(&bytes).unwrap();
        assert_eq!(root, again);
        assert!(String::from_utf8(bytes).unwrap().contains("Fish &amp; Chips"));
    }

    #[test]
    fn test_get_or_create_and_insert_after() {
        let mut el = Element::new("a:rPr");
        el.get_or_create("a:latin").set_attr("typeface", "Arial");
        el.get_or_create("a:latin").set_attr("typeface", "Calibri");
        assert_eq!(el.children_named("latin").count(), 1);
        assert_eq!(el.child("latin").unwrap().attr("typeface"), Some("Calibri"));

        el.insert_after(&[], Element::new("a:solidFill"));
        assert_eq!(el.elements().next().unwrap().local_name(), "solidFill");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Element::parse(b"<a><b></a>").is_err());
        assert!(Element::parse(b"").is_err());
    }
}
