//! DOM-builder JavaScript output
//!
//! The document becomes one expression of nested `html.tag(attributes,
//! ...children)` calls:
//!
//! ```text
//! html.ul({"class":"menu"},html.li({},"One"),html.li({},"Two"))
//! ```
//!
//! Text is JSON-quoted, valueless attributes are `null`, processing
//! instructions render as `""`. The document must have exactly one root
//! element.

use super::html::text::escape_angle_brackets;
use super::Renderer;
use crate::context::Context;
use crate::error::{PamlError, Result};
use crate::model::{Document, Element, Node};
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct JsRenderer;

impl Renderer for JsRenderer {
    fn name(&self) -> &str {
        "js"
    }

    fn description(&self) -> &str {
        "JavaScript DOM builder expression"
    }

    fn mime_type(&self) -> &str {
        "text/javascript"
    }

    fn file_extensions(&self) -> &[&str] {
        &["js"]
    }

    fn render(&self, doc: &Document, ctx: &Context) -> Result<String> {
        let roots: Vec<&Node> = doc
            .root
            .content
            .iter()
            .filter(|node| node.as_text().map_or(true, |t| !t.trim().is_empty()))
            .collect();
        match roots.as_slice() {
            [Node::Element(root)] => {
                JsWriter {
                    ctx,
                    path: doc.path.as_deref(),
                }
                .element(root)
            }
            _ => Err(PamlError::Render(format!(
                "js output needs exactly one root element, found {} top-level nodes",
                roots.len()
            ))),
        }
    }
}

struct JsWriter<'a> {
    ctx: &'a Context,
    path: Option<&'a Path>,
}

impl JsWriter<'_> {
    fn element(&self, element: &Element) -> Result<String> {
        if element.is_pi {
            return Ok("\"\"".to_string());
        }
        let mut out = callee(&element.name)?;
        out.push_str("({");
        for (i, attribute) in element.attributes.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&quote(&attribute.name)?);
            out.push(':');
            match &attribute.value {
                Some(value) => out.push_str(&quote(value)?),
                None => out.push_str("null"),
            }
        }
        out.push('}');
        for child in self.children(element)? {
            out.push(',');
            out.push_str(&child);
        }
        out.push(')');
        Ok(out)
    }

    fn children(&self, element: &Element) -> Result<Vec<String>> {
        if let Some(mode) = &element.mode {
            let source = element.flatten_text();
            let mut text = match self.ctx.processors.process(mode, &source, self.path)? {
                Some(processed) => processed.text,
                None => source,
            };
            if mode.modifiers.escape {
                text = escape_angle_brackets(&text);
            }
            return Ok(vec![quote(&text)?]);
        }

        let mut children = Vec::new();
        let mut run = String::new();
        for node in &element.content {
            match node {
                Node::Text { text } => run.push_str(text),
                Node::Element(child) => {
                    if !run.is_empty() {
                        children.push(quote(&run)?);
                        run.clear();
                    }
                    children.push(self.element(child)?);
                }
            }
        }
        let last = run.trim_end();
        if !last.is_empty() {
            children.push(quote(last)?);
        }
        Ok(children)
    }
}

fn quote(text: &str) -> Result<String> {
    serde_json::to_string(text).map_err(|e| PamlError::Render(e.to_string()))
}

/// `html.div`, or `html["my-widget"]` for names that are not identifiers.
fn callee(name: &str) -> Result<String> {
    let identifier = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if identifier {
        Ok(format!("html.{name}"))
    } else {
        Ok(format!("html[{}]", quote(name)?))
    }
}
