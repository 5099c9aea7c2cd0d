//! Builds a [`Document`] from PAML source lines.
//!
//! # The Algorithm
//!
//! Nesting is decided by indentation alone. The builder keeps one stack of
//! [`Frame`]s, each holding everything that lives as long as an open
//! element: its indentation, the element under construction, its BEM prefix
//! and, for embeds, the verbatim body collected so far.
//!
//! For every line:
//!
//! 1. **Blank lines** are skipped, unless an embed is open (its body keeps them).
//! 2. **Comments** (`#`) are skipped, unless they are embed body.
//! 3. **Processing instructions** (`<?xml ...?>`) are added as text.
//! 4. **Directives** (`%include`, `%name(args)`) expand into lines that are
//!    fed back through this same procedure at the directive's indentation.
//! 5. **Closing**: every frame whose indentation is `>=` the line's is
//!    finished and attached to its parent.
//! 6. If the top frame is an **embed**, the line is body text.
//! 7. **Declarations** (`@name`) open a frame that is never rendered.
//! 8. **Block elements** (`<selector` with no inline `>`) open a frame; text
//!    after the selector is the element's first content.
//! 9. Anything else is a **content line**: text with `<sel:text>` inline
//!    elements, added to the top frame.
//!
//! At the end of input every open frame is finished.
//!
//! Frames are attached to their parent when they are popped, so a parent's
//! content is always in source order: a child is complete before any later
//! sibling content can be added.

mod frame;

use crate::context::{Context, MissingInclude};
use crate::directives::include::{missing_marker, substitute};
use crate::directives::{IncludeDirective, MacroEnv};
use crate::error::{Location, PamlError, Result};
use crate::grammar::line::{
    is_blank, is_comment, is_processing_instruction, match_declaration, match_include,
    match_macro, measure_indent,
};
use crate::grammar::selector::scan;
use crate::grammar::Selector;
use crate::model::{Attribute, Document, Element};
use frame::{Frame, FrameKind};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Parse `source` into a document.
///
/// `path` is the file the source was read from; includes and library paths
/// are resolved relative to it.
pub fn build_document(source: &str, path: Option<&Path>, ctx: &Context) -> Result<Document> {
    let mut builder = TreeBuilder::new(ctx, path);
    builder.feed(source)?;
    Ok(builder.finish())
}

/// Line-at-a-time document builder.
pub struct TreeBuilder<'c> {
    ctx: &'c Context,
    document: Document,
    frames: Vec<Frame>,
    /// `+selector` attributes from an include, for the next element.
    pending_override: Option<Vec<Attribute>>,
    /// Files being parsed, outermost first.
    files: Vec<PathBuf>,
    include_depth: usize,
}

/// Lines coming from an included file.
struct Inclusion<'a> {
    indentation: &'a str,
    variables: &'a BTreeMap<String, String>,
}

impl<'c> TreeBuilder<'c> {
    pub fn new(ctx: &'c Context, path: Option<&Path>) -> Self {
        let mut document = Document::new();
        document.path = path.map(Path::to_path_buf);
        Self {
            ctx,
            document,
            frames: Vec::new(),
            pending_override: None,
            files: path.map(Path::to_path_buf).into_iter().collect(),
            include_depth: 0,
        }
    }

    /// Feed the whole source of the top-level document.
    pub fn feed(&mut self, source: &str) -> Result<()> {
        let path = self.files.first().cloned();
        self.feed_source(source, path.as_deref(), None)
    }

    /// Close every open frame and return the document.
    pub fn finish(mut self) -> Document {
        self.close_frames(0);
        self.document
    }

    fn feed_source(
        &mut self,
        source: &str,
        path: Option<&Path>,
        inclusion: Option<&Inclusion<'_>>,
    ) -> Result<()> {
        for (index, line) in source.lines().enumerate() {
            let location = Location::new(path.map(Path::to_path_buf), index + 1);
            match inclusion {
                Some(inclusion) => {
                    if is_processing_instruction(line) {
                        continue;
                    }
                    let line = format!(
                        "{}{}",
                        inclusion.indentation,
                        substitute(line, inclusion.variables)
                    );
                    self.feed_line(&line, &location)?;
                }
                None => self.feed_line(line, &location)?,
            }
        }
        Ok(())
    }

    /// Classify and apply one line.
    pub fn feed_line(&mut self, line: &str, location: &Location) -> Result<()> {
        let tab_width = self.ctx.parser.tab_width;

        if is_blank(line) {
            if let Some(top) = self.frames.last_mut().filter(|f| f.is_embed()) {
                top.append_blank_line();
            }
            return Ok(());
        }

        let (indent, rest) =
            measure_indent(line, tab_width, self.ctx.parser.indentation, location)?;
        let indentation = &line[..line.len() - rest.len()];
        let in_embed = self
            .frames
            .last()
            .is_some_and(|top| top.is_embed() && top.indent < indent);
        trace!(%location, indent, in_embed, text = rest, "line");

        if !in_embed {
            if is_comment(rest) {
                return Ok(());
            }
            if is_processing_instruction(rest) {
                self.current().push_text(format!("{}\n", rest.trim_end()));
                return Ok(());
            }
        }
        if let Some(argument) = match_include(rest) {
            return self.include(argument, indentation, indent, location);
        }
        if let Some((name, arguments)) = match_macro(rest) {
            return self.expand_macro(name, arguments, indentation, location);
        }

        self.close_frames(indent);
        if let Some(top) = self.frames.last_mut() {
            top.extended = true;
            if top.is_embed() {
                top.append_body_line(line, indent, tab_width);
                return Ok(());
            }
        }

        if let Some(name) = match_declaration(rest) {
            trace!(%location, name, "declaration");
            let element = Element::new(name);
            self.frames
                .push(Frame::new(indent, FrameKind::Declaration, element, None));
            return Ok(());
        }

        match self.block_selector(rest).map_err(|e| e.at(location))? {
            Some((selector, after)) => self.open_element(selector, after, indent, location),
            None => self.push_content_line(rest, location),
        }
    }

    /// The element or document receiving content.
    fn current(&mut self) -> &mut Element {
        match self.frames.last_mut() {
            Some(frame) => &mut frame.element,
            None => &mut self.document.root,
        }
    }

    fn close_frames(&mut self, indent: usize) {
        while self.frames.last().is_some_and(|top| top.indent >= indent) {
            self.finalize_top();
        }
    }

    fn finalize_top(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        match frame.finish() {
            (FrameKind::Declaration, element) => self.document.declarations.push(element),
            (_, element) => self.current().push_element(element),
        }
    }

    /// A selector opening a block element at the start of `rest`, with the
    /// text that follows it.
    fn block_selector<'l>(&self, rest: &'l str) -> Result<Option<(Selector, &'l str)>> {
        if let Some(source) = rest.strip_prefix('<') {
            let Some((selector, consumed)) = scan(source)? else {
                return Ok(None);
            };
            let after = &source[consumed..];
            if !selector.is_embed() && closes_inline(after) {
                return Ok(None);
            }
            return Ok(Some((selector, after)));
        }

        if self.ctx.parser.bare_selectors {
            if let Ok(Some((selector, consumed))) = scan(rest) {
                let after = &rest[consumed..];
                if selector.has_colon || after.trim().is_empty() {
                    return Ok(Some((selector, after)));
                }
            }
        }
        Ok(None)
    }

    fn open_element(
        &mut self,
        selector: Selector,
        after: &str,
        indent: usize,
        location: &Location,
    ) -> Result<()> {
        let kind = if selector.is_embed() {
            FrameKind::Embed
        } else {
            FrameKind::Element
        };
        trace!(%location, name = %selector.name, ?kind, "open element");
        let has_colon = selector.has_colon;
        let (element, bem_prefix) = self
            .start_element(selector, false)
            .map_err(|e| e.at(location))?;
        self.frames.push(Frame::new(indent, kind, element, bem_prefix));

        // Only `selector:` carries content on its own line.
        let text = after.trim_start();
        if !has_colon || text.is_empty() {
            return Ok(());
        }
        match kind {
            FrameKind::Embed => {
                if let Some(top) = self.frames.last_mut() {
                    top.append_body_text(text);
                }
                Ok(())
            }
            _ => {
                self.push_content_line(text, location)?;
                if let Some(top) = self.frames.last_mut() {
                    top.opened_with_content = true;
                }
                Ok(())
            }
        }
    }

    /// Text with inline `<sel:content>` elements. The line's newline becomes
    /// a trailing space.
    fn push_content_line(&mut self, text: &str, location: &Location) -> Result<()> {
        let mut offset = 0;
        while let Some((start, selector, end)) =
            next_inline_selector(text, offset).map_err(|e| e.at(location))?
        {
            let Some(close) = text[end..].find('>') else {
                return Err(PamlError::grammar(
                    format!("unclosed inline tag in '{}'", text.trim()),
                    location.clone(),
                ));
            };
            if start > offset {
                self.current().push_text(&text[offset..start]);
            }
            let (mut element, _) = self
                .start_element(selector, true)
                .map_err(|e| e.at(location))?;
            let inner = &text[end..end + close];
            if !inner.is_empty() {
                element.push_text(inner);
            }
            self.current().push_element(element);
            offset = end + close + 1;
        }
        self.current().push_text(format!("{} ", &text[offset..]));
        Ok(())
    }

    /// Create the element for `selector`, applying the pending include
    /// override and BEM class expansion. Returns the BEM prefix it declares.
    fn start_element(
        &mut self,
        selector: Selector,
        is_inline: bool,
    ) -> Result<(Element, Option<String>)> {
        let Selector {
            name,
            attributes,
            hints,
            embed,
            is_pi,
            ..
        } = selector;
        let mut attributes = match self.pending_override.take() {
            Some(overrides) => merge_override(overrides, attributes),
            None => attributes,
        };
        let bem_prefix = self.expand_bem(&mut attributes)?;

        let mut element = Element::new(name);
        element.attributes = attributes;
        element.is_inline = is_inline;
        element.is_pi = is_pi;
        element.mode = embed;
        element.format_options = hints;
        Ok((element, bem_prefix))
    }

    /// Drop `block-` prefix tokens from `class`, returning the prefix, and
    /// qualify `-item` tokens with the enclosing prefixes.
    fn expand_bem(&self, attributes: &mut Vec<Attribute>) -> Result<Option<String>> {
        let mut prefix: Option<String> = None;
        for attribute in attributes.iter_mut().filter(|a| a.name == "class") {
            let Some(value) = attribute.value.as_deref() else {
                continue;
            };
            let mut classes = Vec::new();
            for token in value.split_whitespace() {
                if let Some(declared) = token.strip_suffix('-') {
                    if let Some(existing) = prefix.replace(declared.to_string()) {
                        return Err(PamlError::grammar(
                            format!(
                                "more than one BEM prefix on one element ('{existing}-', '{token}')"
                            ),
                            Location::default(),
                        ));
                    }
                } else if token.starts_with('-') {
                    classes.push(self.qualify_bem(token));
                } else {
                    classes.push(token.to_string());
                }
            }
            attribute.value = Some(classes.join(" "));
        }
        attributes.retain(|a| !(a.name == "class" && a.value.as_deref() == Some("")));
        Ok(prefix)
    }

    fn qualify_bem(&self, token: &str) -> String {
        let mut name = token.to_string();
        for prefix in self.frames.iter().rev().filter_map(|f| f.bem_prefix.as_deref()) {
            name.insert_str(0, prefix);
            if !prefix.starts_with('-') {
                break;
            }
        }
        name
    }

    fn including_dir(&self) -> PathBuf {
        self.files
            .last()
            .and_then(|path| path.parent())
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    fn include(
        &mut self,
        argument: &str,
        indentation: &str,
        indent: usize,
        location: &Location,
    ) -> Result<()> {
        let directive = IncludeDirective::parse(argument).map_err(|e| e.at(location))?;
        self.close_frames(indent);
        if let Some(top) = self.frames.last_mut() {
            top.extended = true;
        }

        let dir = self.including_dir();
        let Some(path) = directive.resolve(&dir) else {
            let missing = dir.join(&directive.path);
            return match self.ctx.parser.missing_include {
                MissingInclude::Error => Err(PamlError::directive(
                    format!("included file not found: '{}'", missing.display()),
                    location.clone(),
                )),
                MissingInclude::Marker => {
                    warn!(%location, path = %missing.display(), "included file not found");
                    self.current().push_text(missing_marker(&missing));
                    Ok(())
                }
            };
        };

        if self.include_depth >= self.ctx.parser.max_include_depth {
            return Err(PamlError::directive(
                format!(
                    "includes nested deeper than {} levels at '{}'",
                    self.ctx.parser.max_include_depth,
                    path.display()
                ),
                location.clone(),
            ));
        }

        let source = fs::read_to_string(&path).map_err(|source| PamlError::Io {
            path: path.clone(),
            source,
        })?;
        let mut variables = self.ctx.variables.clone();
        variables.extend(directive.substitutions);
        debug!(%location, path = %path.display(), depth = self.include_depth + 1, "including file");

        self.pending_override = directive.override_attributes;
        let frames = self.frames.len();
        self.files.push(path.clone());
        self.include_depth += 1;
        let inclusion = Inclusion {
            indentation,
            variables: &variables,
        };
        let result = self.feed_source(&source, Some(&path), Some(&inclusion));
        self.files.pop();
        self.include_depth -= 1;
        result?;

        while self.frames.len() > frames {
            self.finalize_top();
        }
        self.pending_override = None;
        Ok(())
    }

    fn expand_macro(
        &mut self,
        name: &str,
        arguments: &str,
        indentation: &str,
        location: &Location,
    ) -> Result<()> {
        let document_dir = self.files.last().map(|_| self.including_dir());
        let library_root = self
            .ctx
            .library_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let env = MacroEnv {
            document_dir: document_dir.as_deref(),
            library_root: &library_root,
        };
        let lines = self.ctx.macros.expand(name, arguments, &env, location)?;
        debug!(%location, name, lines = lines.len(), "expanded macro");
        for line in lines {
            self.feed_line(&format!("{indentation}{line}"), location)?;
        }
        Ok(())
    }
}

/// A `>` comes before any further `<`: the selector starts an inline element.
fn closes_inline(after: &str) -> bool {
    match (after.find('>'), after.find('<')) {
        (Some(close), Some(open)) => close < open,
        (Some(_), None) => true,
        _ => false,
    }
}

/// The next `<selector` in `text` at or after `from`: its start, the
/// selector, and the offset just past it.
fn next_inline_selector(text: &str, from: usize) -> Result<Option<(usize, Selector, usize)>> {
    for (index, _) in text[from..].match_indices('<') {
        let start = from + index;
        if let Some((selector, consumed)) = scan(&text[start + 1..])? {
            return Ok(Some((start, selector, start + 1 + consumed)));
        }
    }
    Ok(None)
}

/// Override attributes first, in their order; element attributes with a new
/// name are appended. `class` values are joined, override first.
fn merge_override(overrides: Vec<Attribute>, attributes: Vec<Attribute>) -> Vec<Attribute> {
    let mut merged = overrides;
    for attribute in attributes {
        match merged.iter_mut().find(|a| a.name == attribute.name) {
            None => merged.push(attribute),
            Some(existing) if attribute.name == "class" => {
                let joined = [existing.value.as_deref(), attribute.value.as_deref()]
                    .into_iter()
                    .flatten()
                    .filter(|v| !v.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                existing.value = Some(joined);
            }
            Some(_) => {}
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FormatFlag, Node};

    fn build(source: &str) -> Document {
        build_document(source, None, &Context::new()).unwrap()
    }

    fn texts(element: &Element) -> Vec<&str> {
        element.content.iter().filter_map(Node::as_text).collect()
    }

    #[test]
    fn inline_or_block() {
        assert!(closes_inline("(x)> a"));
        assert!(closes_inline(": a > b"));
        assert!(!closes_inline(": a <b> c"));
        assert!(!closes_inline(": plain"));
    }

    #[test]
    fn merge_keeps_override_order_and_joins_classes() {
        let merged = merge_override(
            vec![
                Attribute::new("class", Some("wide".into())),
                Attribute::new("id", Some("over".into())),
            ],
            vec![
                Attribute::new("id", Some("mine".into())),
                Attribute::new("class", Some("card".into())),
                Attribute::new("title", Some("t".into())),
            ],
        );
        assert_eq!(
            merged,
            vec![
                Attribute::new("class", Some("wide card".into())),
                Attribute::new("id", Some("over".into())),
                Attribute::new("title", Some("t".into())),
            ]
        );
    }

    #[test]
    fn children_follow_indentation() {
        let doc = build("<ul\n  <li: one\n  <li: two\n<p: after");
        let top: Vec<_> = doc.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(top, vec!["ul", "p"]);
        let ul = doc.elements().next().unwrap();
        assert_eq!(ul.children().count(), 2);
    }

    #[test]
    fn same_line_text_collapses_to_single_line() {
        let doc = build("<p: Hello world");
        let p = doc.elements().next().unwrap();
        assert_eq!(texts(p), vec!["Hello world "]);
        assert!(p.format_options.contains(FormatFlag::SingleLine));

        let doc = build("<p: Hello\n  world");
        let p = doc.elements().next().unwrap();
        assert!(!p.format_options.contains(FormatFlag::SingleLine));
    }

    #[test]
    fn content_line_with_inline_elements() {
        let doc = build("<p\n  Say <b:hello> to <a(href=/x):me>!");
        let p = doc.elements().next().unwrap();
        assert_eq!(p.content.len(), 5);
        let b = p.content[1].as_element().unwrap();
        assert!(b.is_inline);
        assert_eq!(texts(b), vec!["hello"]);
        let a = p.content[3].as_element().unwrap();
        assert_eq!(a.attribute_value("href"), Some("/x"));
        assert_eq!(p.content[4].as_text(), Some("! "));
    }

    #[test]
    fn unclosed_inline_tag_is_a_grammar_error() {
        let err = build_document("<p\n  broken <b:bold", None, &Context::new()).unwrap_err();
        assert!(matches!(err, PamlError::Grammar { .. }));
        assert_eq!(err.location().map(|l| l.line), Some(2));
    }

    #[test]
    fn line_starting_with_an_inline_element_is_content() {
        let doc = build("<p\n  <b:x> and y");
        let p = doc.elements().next().unwrap();
        assert!(p.content[0].as_element().unwrap().is_inline);
    }

    #[test]
    fn embed_body_is_verbatim() {
        let doc = build("<div\n  <pre@raw\n      a  b\n\n        c\n    # kept\n  <p: next");
        let div = doc.elements().next().unwrap();
        let pre = div.children().next().unwrap();
        assert_eq!(texts(pre), vec!["a  b\n\n  c\n# kept\n"]);
        assert_eq!(div.children().nth(1).unwrap().name, "p");
    }

    #[test]
    fn comments_and_declarations_stay_out_of_the_tree() {
        let doc = build("# heading\n@meta:\n  <p: hidden\n<p: shown");
        assert_eq!(doc.elements().count(), 1);
        assert_eq!(doc.declarations.len(), 1);
        assert_eq!(doc.declarations[0].name, "meta");
        assert_eq!(doc.declarations[0].children().count(), 1);
    }

    #[test]
    fn bem_prefixes_qualify_descendants() {
        let doc = build("<div.card-\n  <h2.-title: T\n  <div.-body.-sub-\n    <span.-x: x");
        let card = doc.elements().next().unwrap();
        assert!(card.attribute("class").is_none());
        let title = card.children().next().unwrap();
        assert_eq!(title.attribute_value("class"), Some("card-title"));
        let body = card.children().nth(1).unwrap();
        assert_eq!(body.attribute_value("class"), Some("card-body"));
        let x = body.children().next().unwrap();
        assert_eq!(x.attribute_value("class"), Some("card-sub-x"));
    }

    #[test]
    fn two_bem_prefixes_on_one_element_fail() {
        let err = build_document("<div.a-.b-", None, &Context::new()).unwrap_err();
        assert!(matches!(err, PamlError::Grammar { .. }));
    }

    #[test]
    fn bare_selectors_are_opt_in() {
        let mut ctx = Context::new();
        let doc = build_document("html\n  body", None, &ctx).unwrap();
        assert_eq!(doc.elements().count(), 0);

        ctx.parser.bare_selectors = true;
        let doc = build_document("html\n  body\n    p: Hello world", None, &ctx).unwrap();
        let html = doc.elements().next().unwrap();
        assert_eq!(html.name, "html");
        let p = html.children().next().unwrap().children().next().unwrap();
        assert_eq!(p.name, "p");
        assert_eq!(texts(p), vec!["Hello world "]);
    }

    #[test]
    fn only_a_colon_opens_same_line_content() {
        let doc = build("<p: Hello\n<p Hello\n<div\n  <span world");
        let mut elements = doc.elements();
        assert_eq!(texts(elements.next().unwrap()), vec!["Hello "]);
        assert!(elements.next().unwrap().content.is_empty());
        let div = elements.next().unwrap();
        assert!(div.children().next().unwrap().content.is_empty());
    }

    #[test]
    fn processing_instructions_are_kept_as_text() {
        let doc = build("<?xml version=\"1.0\"?>\n<root");
        assert_eq!(doc.root.content[0].as_text(), Some("<?xml version=\"1.0\"?>\n"));
    }
}
