// this_file: crates/mailglyph-render/src/markup.rs

//! Minimal markup document: parse a fragment, read and write attributes,
//! prepend children, serialize. Used only inside the rendering pipeline.

use mailglyph_core::{MailGlyphError, Result};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt::Write;

/// Serialization flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Syntax {
    /// Childless elements self-close: `<path d=""/>`
    Xml,
    /// Childless elements are void: `<img src="">`
    Html,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub(crate) fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Replace an existing attribute in place or append a new one.
    pub(crate) fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(name, _)| name == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    pub(crate) fn prepend(&mut self, child: Element) {
        self.children.insert(0, Node::Element(child));
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|err| MailGlyphError::markup(err.to_string()))?;
            let value = attribute
                .unescape_value()
                .map_err(|err| MailGlyphError::markup(err.to_string()))?;
            element.attributes.push((
                String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
                value.into_owned(),
            ));
        }
        Ok(element)
    }

    fn write(&self, out: &mut String, syntax: Syntax) {
        let _ = write!(out, "<{}", self.name);
        for (key, value) in &self.attributes {
            let _ = write!(out, r#" {}="{}""#, key, escape(value.as_str()));
        }
        if self.children.is_empty() {
            out.push_str(match syntax {
                Syntax::Xml => "/>",
                Syntax::Html => ">",
            });
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(element) => element.write(out, syntax),
                Node::Text(text) => out.push_str(&escape(text.as_str())),
            }
        }
        let _ = write!(out, "</{}>", self.name);
    }
}

/// A parsed fragment with a single root element.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Document {
    root: Element,
}

impl Document {
    pub(crate) fn new(root: Element) -> Self {
        Self { root }
    }

    pub(crate) fn parse(markup: &str) -> Result<Self> {
        let mut reader = Reader::from_str(markup);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|err| MailGlyphError::markup(err.to_string()))?;
            match event {
                Event::Start(start) => stack.push(Element::from_start(&start)?),
                Event::Empty(start) => {
                    let element = Element::from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| MailGlyphError::markup("unbalanced closing tag"))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = text
                            .unescape()
                            .map_err(|err| MailGlyphError::markup(err.to_string()))?;
                        parent.children.push(Node::Text(text.into_owned()));
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        parent
                            .children
                            .push(Node::Text(String::from_utf8_lossy(&data).into_owned()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(MailGlyphError::markup("unclosed element"));
        }
        root.map(Self::new)
            .ok_or_else(|| MailGlyphError::markup("no root element"))
    }

    pub(crate) fn root(&self) -> &Element {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub(crate) fn serialize(&self, syntax: Syntax) -> String {
        let mut out = String::new();
        self.root.write(&mut out, syntax);
        out
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(MailGlyphError::markup("multiple root elements"));
    }
    *root = Some(element);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10.5" height="4"><path fill="red" d="M0,0 L1,1"/></svg>"#;

    #[test]
    fn parses_and_serializes_unchanged() {
        let doc = Document::parse(SVG).unwrap();
        assert_eq!(doc.root().name, "svg");
        assert_eq!(doc.root().attr("width"), Some("10.5"));
        assert_eq!(doc.serialize(Syntax::Xml), SVG);
    }

    #[test]
    fn set_attr_replaces_or_appends() {
        let mut doc = Document::parse(SVG).unwrap();
        doc.root_mut().set_attr("width", "11");
        doc.root_mut().set_attr("viewBox", "0 0 11 4");
        assert_eq!(
            doc.serialize(Syntax::Xml),
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="11" height="4" viewBox="0 0 11 4"><path fill="red" d="M0,0 L1,1"/></svg>"#
        );
    }

    #[test]
    fn prepend_places_child_first() {
        let mut doc = Document::parse(SVG).unwrap();
        let mut rect = Element::new("rect");
        rect.set_attr("fill", "blue");
        doc.root_mut().prepend(rect);
        let out = doc.serialize(Syntax::Xml);
        assert!(out.find("<rect").unwrap() < out.find("<path").unwrap());
        assert_eq!(doc.root().children.len(), 2);
    }

    #[test]
    fn html_syntax_emits_void_elements() {
        let mut img = Element::new("img");
        img.set_attr("alt", r#"a "quoted" <b>"#);
        let doc = Document::new(img);
        assert_eq!(
            doc.serialize(Syntax::Html),
            r#"<img alt="a &quot;quoted&quot; &lt;b&gt;">"#
        );
    }

    #[test]
    fn entities_round_trip() {
        let doc = Document::parse(r#"<text title="&amp;&lt;">a &amp; b</text>"#).unwrap();
        assert_eq!(doc.root().attr("title"), Some("&<"));
        assert_eq!(
            doc.serialize(Syntax::Xml),
            r#"<text title="&amp;&lt;">a &amp; b</text>"#
        );
    }

    #[test]
    fn rejects_broken_markup() {
        assert!(Document::parse("").is_err());
        assert!(Document::parse("<svg>").is_err());
        assert!(Document::parse("<a/><b/>").is_err());
    }
}
