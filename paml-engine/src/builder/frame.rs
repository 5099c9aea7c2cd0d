//! One entry of the builder's stack.

use crate::grammar::line::strip_indent;
use crate::model::{Element, FormatFlag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameKind {
    Element,
    /// `@name`: parsed, kept out of the output.
    Declaration,
    /// Element with an embed mode; deeper lines are its verbatim body.
    Embed,
}

/// All per-node parse state, pushed and popped as a unit.
#[derive(Debug)]
pub(crate) struct Frame {
    pub indent: usize,
    pub kind: FrameKind,
    pub element: Element,
    pub bem_prefix: Option<String>,
    /// Text followed the selector on the opening line.
    pub opened_with_content: bool,
    /// A later line added something to this frame.
    pub extended: bool,
    body: String,
    body_indent: Option<usize>,
}

impl Frame {
    pub fn new(indent: usize, kind: FrameKind, element: Element, bem_prefix: Option<String>) -> Self {
        Self {
            indent,
            kind,
            element,
            bem_prefix,
            opened_with_content: false,
            extended: false,
            body: String::new(),
            body_indent: None,
        }
    }

    pub fn is_embed(&self) -> bool {
        self.kind == FrameKind::Embed
    }

    /// Add a body line, minus the indentation of the first body line.
    pub fn append_body_line(&mut self, line: &str, indent: usize, tab_width: usize) {
        let base = *self.body_indent.get_or_insert(indent);
        self.body.push_str(strip_indent(line, base, tab_width));
        self.body.push('\n');
    }

    /// Text from the opening line, kept as the first body line.
    pub fn append_body_text(&mut self, text: &str) {
        self.body.push_str(text);
        self.body.push('\n');
    }

    /// Blank lines count once the body has started.
    pub fn append_blank_line(&mut self) {
        if !self.body.is_empty() {
            self.body.push('\n');
        }
    }

    /// Close the frame, producing the finished element.
    pub fn finish(mut self) -> (FrameKind, Element) {
        if self.kind == FrameKind::Embed {
            while self.body.ends_with("\n\n") {
                self.body.pop();
            }
            if !self.body.is_empty() {
                self.element.push_text(self.body);
            }
        } else if self.kind == FrameKind::Element && self.opened_with_content && !self.extended {
            self.element.format_options.insert(FormatFlag::SingleLine);
        }
        (self.kind, self.element)
    }
}
