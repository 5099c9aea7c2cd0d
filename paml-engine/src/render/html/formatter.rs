//! The flag-scoped markup writer.

use super::scope::FlagScopes;
use super::tables::Dialect;
use super::text::{escape_angle_brackets, normalize, quote_attribute, wrap};
use crate::context::Context;
use crate::error::Result;
use crate::model::{can_span_one_line, is_text_only, Document, Element, FormatFlag, FormatFlags, Node};
use std::borrow::Cow;
use std::path::Path;

/// Writes one document. Not reusable across documents.
pub(crate) struct Formatter<'a> {
    ctx: &'a Context,
    dialect: Dialect,
    path: Option<&'a Path>,
    out: String,
    depth: usize,
    scopes: FlagScopes,
}

impl<'a> Formatter<'a> {
    pub fn new(ctx: &'a Context, dialect: Dialect, path: Option<&'a Path>) -> Self {
        Self {
            ctx,
            dialect,
            path,
            out: String::new(),
            depth: 0,
            scopes: FlagScopes::new(),
        }
    }

    /// Render the document's top-level content.
    pub fn format_document(mut self, doc: &Document) -> Result<String> {
        self.write_content(&doc.root.content, true)?;
        let trimmed = self.out.trim_end().len();
        self.out.truncate(trimmed);
        Ok(self.out)
    }

    fn at_line_start(&self) -> bool {
        self.out.ends_with('\n')
    }

    fn ensure_new_line(&mut self) {
        if self.out.is_empty() || self.at_line_start() {
            return;
        }
        if !self.scopes.has(FormatFlag::Preserve) {
            let trimmed = self.out.trim_end_matches([' ', '\t']).len();
            self.out.truncate(trimmed);
        }
        self.out.push('\n');
    }

    fn indent_width(&self) -> usize {
        self.depth * self.ctx.formatter.indent_string.chars().count()
    }

    /// Column the next character lands on, counting the indentation a fresh
    /// line is about to receive.
    fn column(&self) -> usize {
        if self.out.is_empty() || self.at_line_start() {
            return self.indent_width();
        }
        let line_start = self.out.rfind('\n').map_or(0, |i| i + 1);
        self.out[line_start..].chars().count()
    }

    fn wraps_text(&self) -> bool {
        self.scopes.has(FormatFlag::Wrap)
            && !self.scopes.has(FormatFlag::SingleLine)
            && !self.scopes.has(FormatFlag::Preserve)
    }

    fn write_indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(&self.ctx.formatter.indent_string);
        }
    }

    /// Tags start with the indentation when they begin a line.
    fn write_tag(&mut self, tag: &str) {
        if self.at_line_start() {
            self.write_indent();
        }
        self.out.push_str(tag);
    }

    fn open_tag(element: &Element) -> String {
        let mut tag = format!("<{}", element.name);
        for attribute in &element.attributes {
            tag.push(' ');
            tag.push_str(&quote_attribute(&attribute.name, attribute.value.as_deref()));
        }
        tag.push('>');
        tag
    }

    fn write_element(&mut self, element: &Element) -> Result<()> {
        // Set by an ancestor: render on the current line.
        let flowing = element.is_inline || self.scopes.has(FormatFlag::SingleLine);

        let (content, processor_flags) = self.resolve_content(element)?;
        let mut flags = element
            .format_options
            .union(processor_flags)
            .union(self.dialect.tag_defaults(&element.name));

        if element.is_pi {
            return self.write_processing_instruction(element, &content, flowing);
        }

        if content.is_empty() {
            if !flowing {
                self.ensure_new_line();
            }
            let mut tag = Self::open_tag(element);
            if self.dialect.self_closes(&element.name) {
                tag.insert_str(tag.len() - 1, " /");
            }
            self.write_tag(&tag);
            return Ok(());
        }

        if element.is_inline {
            flags.insert(FormatFlag::SingleLine);
        }
        if flags.contains(FormatFlag::Inline) && can_span_one_line(&content) {
            flags.insert(FormatFlag::SingleLine);
        }
        self.scopes.push(flags);
        let result = self.write_element_body(element, &content, flowing);
        self.scopes.pop();
        result
    }

    fn write_element_body(&mut self, element: &Element, content: &[Node], flowing: bool) -> Result<()> {
        if !flowing {
            self.ensure_new_line();
        }
        self.write_tag(&Self::open_tag(element));
        let keep_trailing = element.mode.is_some();

        let one_line = self.scopes.has(FormatFlag::SingleLine) || is_text_only(content);
        if flowing || one_line {
            self.write_content(content, !element.is_inline && !keep_trailing)?;
        } else {
            let compact = self.scopes.has(FormatFlag::Compact);
            if !compact {
                self.depth += 1;
                self.out.push('\n');
            }
            self.write_content(content, !keep_trailing)?;
            if !compact {
                self.depth -= 1;
                self.ensure_new_line();
            }
        }

        self.write_tag(&format!("</{}>", element.name));
        Ok(())
    }

    fn write_processing_instruction(
        &mut self,
        element: &Element,
        content: &[Node],
        flowing: bool,
    ) -> Result<()> {
        if !flowing {
            self.ensure_new_line();
        }
        let text: String = content.iter().filter_map(Node::as_text).collect();
        let text = normalize(text.trim());
        let tag = if text.is_empty() {
            format!("<?{} ?>", element.name)
        } else {
            format!("<?{} {} ?>", element.name, text)
        };
        self.write_tag(&tag);
        Ok(())
    }

    /// Content to render and the flags a processor asked for. Embedded blocks
    /// are replaced by the processor's output; empty elements get their
    /// filler.
    fn resolve_content<'e>(&self, element: &'e Element) -> Result<(Cow<'e, [Node]>, FormatFlags)> {
        if element.content.is_empty() {
            let filled = match self.dialect.filler(&element.name) {
                Some(filler) => vec![Node::text(filler)],
                None => Vec::new(),
            };
            return Ok((Cow::Owned(filled), FormatFlags::empty()));
        }
        let Some(mode) = &element.mode else {
            return Ok((Cow::Borrowed(element.content.as_slice()), FormatFlags::empty()));
        };

        let source = element.flatten_text();
        let (mut text, flags) = match self.ctx.processors.process(mode, &source, self.path)? {
            Some(processed) => (processed.text, processed.flags),
            None => (source, FormatFlags::empty()),
        };
        if mode.modifiers.escape {
            text = escape_angle_brackets(&text);
        }
        Ok((Cow::Owned(vec![Node::text(text)]), flags))
    }

    /// Consecutive text nodes are written as one run. With `trim_last`, the
    /// final run loses its trailing whitespace unless it is all whitespace.
    fn write_content(&mut self, content: &[Node], trim_last: bool) -> Result<()> {
        let mut index = 0;
        while index < content.len() {
            match &content[index] {
                Node::Element(child) if child.is_inline && self.wraps_text() => {
                    self.write_wrapped_inline(child)?;
                    index += 1;
                }
                Node::Element(child) => {
                    self.write_element(child)?;
                    index += 1;
                }
                Node::Text { .. } => {
                    let mut run = String::new();
                    while let Some(text) = content.get(index).and_then(Node::as_text) {
                        run.push_str(text);
                        index += 1;
                    }
                    let is_last = index == content.len();
                    let text = if is_last && trim_last && !run.trim().is_empty() {
                        run.trim_end()
                    } else {
                        run.as_str()
                    };
                    self.write_text(text);
                }
            }
        }
        Ok(())
    }

    /// An inline element inside wrapped text is one word: when it overflows
    /// the line, it moves to the next one whole.
    fn write_wrapped_inline(&mut self, child: &Element) -> Result<()> {
        let start = self.out.len();
        let line_start = self.out.rfind('\n').map_or(0, |i| i + 1);
        self.write_element(child)?;
        if self.out[start..].contains('\n') || self.column() <= self.ctx.formatter.text_width {
            return Ok(());
        }
        if self.out[line_start..start].trim().is_empty() {
            return Ok(());
        }
        let span = self.out.split_off(start);
        let trimmed = self.out.trim_end_matches([' ', '\t']).len();
        self.out.truncate(trimmed);
        self.out.push('\n');
        self.write_indent();
        self.out.push_str(&span);
        Ok(())
    }

    fn write_text(&mut self, text: &str) {
        if self.scopes.has(FormatFlag::Preserve) {
            self.out.push_str(text);
            return;
        }
        let mut text = Cow::Borrowed(text);
        if self.scopes.has(FormatFlag::Normalize) {
            text = Cow::Owned(normalize(&text).into_owned());
        }
        if self.scopes.has(FormatFlag::Strip) {
            text = Cow::Owned(text.trim().to_string());
        }

        if self.scopes.has(FormatFlag::SingleLine) {
            if self.at_line_start() && !text.is_empty() {
                self.write_indent();
                self.out.push_str(text.trim_start());
            } else {
                self.out.push_str(&text);
            }
            return;
        }

        if self.scopes.has(FormatFlag::Wrap) {
            text = Cow::Owned(wrap(
                &text,
                self.ctx.formatter.text_width,
                self.column(),
                self.indent_width(),
            ));
        }
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                let trimmed = self.out.trim_end_matches([' ', '\t']).len();
                self.out.truncate(trimmed);
                self.out.push('\n');
            }
            if segment.is_empty() {
                continue;
            }
            if self.at_line_start() {
                self.write_indent();
            }
            self.out.push_str(segment);
        }
    }
}
