//! HTML and XML output
//!
//! Both renderers share one [`Formatter`](formatter::Formatter); they differ
//! only in the tag tables ([`Dialect`]).
//!
//! # Formatting Flags
//!
//! | Flag          | Short | Effect                                                         |
//! |---------------|-------|----------------------------------------------------------------|
//! | `INLINE`      | `i`   | One-line-able content is written on one line                    |
//! | `SINGLE_LINE` | `sl`  | Element and descendants on one line; also sets `NORMALIZE`     |
//! | `PRESERVE`    | `p`   | Text written verbatim; beats `SINGLE_LINE` at the same depth   |
//! | `NORMALIZE`   | `n`   | Whitespace runs collapse to one space                          |
//! | `STRIP`       | `s`   | Text trimmed on both ends                                      |
//! | `COMPACT`     | `c`   | No newline or indentation between the tags and the content     |
//! | `WRAP`        | `w`   | Block text word-wrapped at the configured width                |
//!
//! # HTML Tag Tables
//!
//! | Tag                     | Default flags | Filler when empty |
//! |-------------------------|---------------|-------------------|
//! | `script`                | `sl i`        | `" "`             |
//! | `link`                  | `i`           |                   |
//! | `title`, `h1` to `h4`   | `sl n`        |                   |
//! | `p`                     | `n c w`       |                   |
//! | `code`, `pre`           | `p`           |                   |
//! | `ol ul a span div`      |               | `" "`             |
//! | `canvas textarea iframe`|               | `" "`             |
//! | `li`                    |               | `""`              |
//! | `td`, `th`              |               | `&nbsp;`          |
//!
//! `br` and `hr` are written `<br>`; any other empty element self-closes
//! (`<img src="x" />`).

mod formatter;
pub mod scope;
pub mod tables;
pub mod text;

use crate::context::Context;
use crate::error::Result;
use crate::model::Document;
use crate::render::Renderer;
use formatter::Formatter;

pub use scope::single_line_wins;
pub use tables::Dialect;

/// Render `doc` with the given tag tables.
pub fn render_markup(doc: &Document, ctx: &Context, dialect: Dialect) -> Result<String> {
    Formatter::new(ctx, dialect, doc.path.as_deref()).format_document(doc)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "HTML markup"
    }

    fn mime_type(&self) -> &str {
        "text/html"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn render(&self, doc: &Document, ctx: &Context) -> Result<String> {
        render_markup(doc, ctx, Dialect::Html)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct XmlRenderer;

impl Renderer for XmlRenderer {
    fn name(&self) -> &str {
        "xml"
    }

    fn description(&self) -> &str {
        "XML markup, without HTML tag defaults"
    }

    fn mime_type(&self) -> &str {
        "text/xml"
    }

    fn file_extensions(&self) -> &[&str] {
        &["xml"]
    }

    fn render(&self, doc: &Document, ctx: &Context) -> Result<String> {
        render_markup(doc, ctx, Dialect::Xml)
    }
}
