//! Tree view of a parsed document.
//!
//! One line per node, connectors showing the nesting:
//!
//! ```text
//! document
//! └─ html
//!   └─ body
//!     ├─ div class="content"
//!     │ └─ p |sl
//!     │   └─ "Hello world "
//!     └─ pre @raw
//!       └─ "a\n  b"
//! ```
//!
//! Text is shown quoted and truncated to 30 characters.

use super::Renderer;
use crate::context::Context;
use crate::error::Result;
use crate::model::{Document, Element, Node};

const MAX_TEXT: usize = 30;

#[derive(Debug, Default, Clone, Copy)]
pub struct OutlineRenderer;

impl Renderer for OutlineRenderer {
    fn name(&self) -> &str {
        "outline"
    }

    fn description(&self) -> &str {
        "Tree view of the parsed document"
    }

    fn render(&self, doc: &Document, _ctx: &Context) -> Result<String> {
        let mut output = String::from("document\n");
        write_children(&doc.root, "", &mut output);
        if !doc.declarations.is_empty() {
            output.push_str("declarations\n");
            let count = doc.declarations.len();
            for (i, declaration) in doc.declarations.iter().enumerate() {
                write_element(declaration, "", i == count - 1, &mut output);
            }
        }
        Ok(output.trim_end().to_string())
    }
}

fn write_children(element: &Element, prefix: &str, output: &mut String) {
    let count = element.content.len();
    for (i, node) in element.content.iter().enumerate() {
        let is_last = i == count - 1;
        match node {
            Node::Element(child) => write_element(child, prefix, is_last, output),
            Node::Text { text } => {
                let connector = if is_last { "└─" } else { "├─" };
                output.push_str(&format!("{prefix}{connector} {}\n", text_label(text)));
            }
        }
    }
}

fn write_element(element: &Element, prefix: &str, is_last: bool, output: &mut String) {
    let connector = if is_last { "└─" } else { "├─" };
    output.push_str(&format!("{prefix}{connector} {}\n", element_label(element)));
    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    write_children(element, &child_prefix, output);
}

fn element_label(element: &Element) -> String {
    let mut label = if element.is_pi {
        format!("?{}", element.name)
    } else {
        element.name.clone()
    };
    for attribute in &element.attributes {
        match &attribute.value {
            Some(value) => label.push_str(&format!(" {}=\"{}\"", attribute.name, value)),
            None => label.push_str(&format!(" {}", attribute.name)),
        }
    }
    if !element.format_options.is_empty() {
        label.push_str(&format!(" |{}", element.format_options));
    }
    if let Some(mode) = &element.mode {
        label.push_str(&format!(" @{mode}"));
    }
    if element.is_inline {
        label.push_str(" (inline)");
    }
    label
}

fn text_label(text: &str) -> String {
    let escaped = text.escape_debug().to_string();
    if escaped.chars().count() > MAX_TEXT {
        let truncated: String = escaped.chars().take(MAX_TEXT - 1).collect();
        format!("\"{truncated}…\"")
    } else {
        format!("\"{escaped}\"")
    }
}
