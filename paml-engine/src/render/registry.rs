//! Renderer registry for output format discovery and selection

use super::{HtmlRenderer, JsRenderer, JsonRenderer, OutlineRenderer, Renderer, XmlRenderer};
use crate::context::Context;
use crate::error::{PamlError, Result};
use crate::model::Document;
use std::collections::HashMap;
use std::path::Path;

/// Registry of renderers by name
///
/// ```ignore
/// let registry = RendererRegistry::default();
/// let html = registry.render(&doc, "html", &ctx)?;
/// ```
pub struct RendererRegistry {
    renderers: HashMap<String, Box<dyn Renderer>>,
}

impl RendererRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        RendererRegistry {
            renderers: HashMap::new(),
        }
    }

    /// Register a renderer, replacing one with the same name.
    pub fn register<R: Renderer + 'static>(&mut self, renderer: R) {
        self.renderers
            .insert(renderer.name().to_string(), Box::new(renderer));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Renderer> {
        self.renderers
            .get(name)
            .map(|r| r.as_ref())
            .ok_or_else(|| PamlError::RendererNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    /// List all renderer names (sorted)
    pub fn list_renderers(&self) -> Vec<String> {
        let mut names: Vec<_> = self.renderers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Renderer name for a file name.
    ///
    /// A `.paml` suffix is looked through, so `feed.xml.paml` selects `xml`
    /// and `index.html` selects `html`. Plain `page.paml` has no opinion.
    pub fn detect_from_filename(&self, filename: &str) -> Option<String> {
        let name = filename.strip_suffix(".paml").unwrap_or(filename);
        let extension = Path::new(name).extension().and_then(|ext| ext.to_str())?;
        let mut matches: Vec<&str> = self
            .renderers
            .values()
            .filter(|r| r.file_extensions().contains(&extension))
            .map(|r| r.name())
            .collect();
        matches.sort_unstable();
        matches.first().map(|name| name.to_string())
    }

    pub fn render(&self, doc: &Document, name: &str, ctx: &Context) -> Result<String> {
        self.get(name)?.render(doc, ctx)
    }

    /// `html`, `xml`, `js`, `outline` and `json`
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(HtmlRenderer);
        registry.register(XmlRenderer);
        registry.register(JsRenderer);
        registry.register(OutlineRenderer);
        registry.register(JsonRenderer);
        registry
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
