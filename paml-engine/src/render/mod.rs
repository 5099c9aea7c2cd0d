//! Renderers: document tree to output text
//!
//! Every output format implements [`Renderer`] and is looked up by name in a
//! [`RendererRegistry`]. The markup renderers (`html`, `xml`) run the
//! flag-scoped formatter; `js` builds DOM construction code; `outline` and
//! `json` show the parsed tree.

pub mod html;
pub mod js;
pub mod outline;
pub mod registry;

use crate::context::Context;
use crate::error::{PamlError, Result};
use crate::model::Document;

pub use html::{HtmlRenderer, XmlRenderer};
pub use js::JsRenderer;
pub use outline::OutlineRenderer;
pub use registry::RendererRegistry;

/// Trait for output formats
///
/// # Examples
///
/// ```ignore
/// struct Upper;
///
/// impl Renderer for Upper {
///     fn name(&self) -> &str {
///         "upper"
///     }
///
///     fn render(&self, doc: &Document, _ctx: &Context) -> Result<String> {
///         Ok(doc.root.flatten_text().to_uppercase())
///     }
/// }
/// ```
pub trait Renderer: Send + Sync {
    /// The name of this format (e.g., "html", "js")
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn mime_type(&self) -> &str {
        "text/plain"
    }

    /// Output file extensions, without the leading dot.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    fn render(&self, doc: &Document, ctx: &Context) -> Result<String>;
}

/// The parsed tree as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Parsed document tree as JSON"
    }

    fn mime_type(&self) -> &str {
        "application/json"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn render(&self, doc: &Document, _ctx: &Context) -> Result<String> {
        serde_json::to_string_pretty(doc).map_err(|e| PamlError::Render(e.to_string()))
    }
}
