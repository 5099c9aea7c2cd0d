//! Document tree produced by the tree builder and consumed by renderers.

use super::flags::FormatFlags;
use super::mode::EmbedMode;
use serde::Serialize;
use std::path::PathBuf;

/// A parsed document.
///
/// `root` is a synthetic `document` element that is never rendered itself;
/// its content is the top-level content of the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub root: Element,
    /// `@name` declarations. They scope their indented lines but produce no output.
    pub declarations: Vec<Element>,
    /// File the document was parsed from.
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            root: Element::new("document"),
            declarations: Vec::new(),
            path: None,
        }
    }

    /// Top-level elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.root.children()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// `name="value"`, or a bare `name` when `value` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A node in an element's content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Text { text: String },
    Element(Element),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text { text } => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub content: Vec<Node>,
    pub is_inline: bool,
    pub is_pi: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<EmbedMode>,
    #[serde(skip_serializing_if = "FormatFlags::is_empty")]
    pub format_options: FormatFlags,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            content: Vec::new(),
            is_inline: false,
            is_pi: false,
            mode: None,
            format_options: FormatFlags::empty(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.attributes
            .push(Attribute::new(name, value.map(str::to_string)));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Value of the first attribute called `name`.
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(|a| a.value.as_deref())
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.content.push(Node::text(text));
    }

    pub fn push_element(&mut self, element: Element) {
        self.content.push(Node::Element(element));
    }

    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.content.iter().filter_map(Node::as_element)
    }

    /// Empty, or a single text node without a newline.
    pub fn is_text_only(&self) -> bool {
        is_text_only(&self.content)
    }

    /// All text in document order, descending into child elements.
    pub fn flatten_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Whether every text below this element is free of newlines.
    pub fn can_span_one_line(&self) -> bool {
        can_span_one_line(&self.content)
    }
}

/// Empty, or a single text node without a newline.
pub fn is_text_only(content: &[Node]) -> bool {
    match content {
        [] => true,
        [Node::Text { text }] => !text.contains('\n'),
        _ => false,
    }
}

/// Whether every text in `content`, at any depth, is free of newlines.
pub fn can_span_one_line(content: &[Node]) -> bool {
    content.iter().all(|node| match node {
        Node::Text { text } => !text.contains('\n'),
        Node::Element(child) => child.can_span_one_line(),
    })
}

fn collect_text(element: &Element, out: &mut String) {
    for node in &element.content {
        match node {
            Node::Text { text } => out.push_str(text),
            Node::Element(child) => collect_text(child, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_only_requires_single_line_text() {
        let mut el = Element::new("p");
        assert!(el.is_text_only());
        el.push_text("hello");
        assert!(el.is_text_only());
        el.push_text("world");
        assert!(!el.is_text_only());

        let mut multi = Element::new("pre");
        multi.push_text("a\nb");
        assert!(!multi.is_text_only());
    }

    #[test]
    fn flatten_text_descends_into_children() {
        let mut inner = Element::new("b");
        inner.push_text("bold");
        let mut el = Element::new("p");
        el.push_text("a ");
        el.push_element(inner);
        el.push_text(" c");
        assert_eq!(el.flatten_text(), "a bold c");
        assert!(el.can_span_one_line());
    }
}
