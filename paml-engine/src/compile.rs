//! Compilation pipeline: source to rendered output.
//!
//! One call reads the source, builds the tree, renders it and, when asked,
//! writes the result. Output is produced only after every step succeeded:
//! a failing include, processor or renderer leaves no partial file behind.
//!
//! For finer control, use [`build_document`](crate::builder::build_document)
//! and a [`RendererRegistry`] directly.

use crate::builder::build_document;
use crate::context::Context;
use crate::error::{PamlError, Result};
use crate::model::{Document, EmbedMode};
use crate::processors::Processed;
use crate::render::RendererRegistry;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// Output format used when neither the caller nor the file name picks one.
pub const DEFAULT_FORMAT: &str = "html";

/// Where the document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    File(PathBuf),
    Stdin,
}

impl DocumentSource {
    /// `-` and the empty string mean standard input.
    pub fn from_arg(arg: &str) -> Self {
        match arg {
            "" | "-" => DocumentSource::Stdin,
            path => DocumentSource::File(PathBuf::from(path)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            DocumentSource::File(path) => Some(path),
            DocumentSource::Stdin => None,
        }
    }

    pub fn read(&self) -> Result<String> {
        match self {
            DocumentSource::File(path) => fs::read_to_string(path).map_err(|source| PamlError::Io {
                path: path.clone(),
                source,
            }),
            DocumentSource::Stdin => {
                let mut text = String::new();
                io::stdin()
                    .read_to_string(&mut text)
                    .map_err(|source| PamlError::Io {
                        path: PathBuf::from("<stdin>"),
                        source,
                    })?;
                Ok(text)
            }
        }
    }
}

/// Specifies one compilation.
///
/// ```ignore
/// let spec = CompileSpec::new(DocumentSource::File("index.paml".into()))
///     .with_format("html")
///     .with_output_path("index.html");
/// ```
#[derive(Debug, Clone)]
pub struct CompileSpec {
    pub source: DocumentSource,
    /// Renderer name; detected from the source file name when `None`.
    pub format: Option<String>,
    pub output: Option<PathBuf>,
}

impl CompileSpec {
    pub fn new(source: DocumentSource) -> Self {
        Self {
            source,
            format: None,
            output: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_output_path(mut self, path: impl AsRef<Path>) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    InMemory(String),
    /// Path of the written file.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileResult {
    pub artifact: Artifact,
    /// Renderer that produced the output.
    pub format: String,
    pub mime_type: String,
}

/// Parse a string with no file context.
pub fn parse_str(source: &str, ctx: &Context) -> Result<Document> {
    build_document(source, None, ctx)
}

pub fn parse_source(source: &DocumentSource, ctx: &Context) -> Result<Document> {
    let text = source.read()?;
    build_document(&text, source.path(), ctx)
}

/// Parse and render a string.
pub fn compile_str(source: &str, format: &str, ctx: &Context) -> Result<String> {
    let doc = parse_str(source, ctx)?;
    RendererRegistry::with_defaults().render(&doc, format, ctx)
}

/// Parse and render a file. `format` defaults from the file name.
pub fn compile_file(path: impl AsRef<Path>, format: Option<&str>, ctx: &Context) -> Result<String> {
    let mut spec = CompileSpec::new(DocumentSource::File(path.as_ref().to_path_buf()));
    spec.format = format.map(str::to_string);
    match compile(spec, ctx, &RendererRegistry::with_defaults())?.artifact {
        Artifact::InMemory(text) => Ok(text),
        Artifact::File(path) => Err(PamlError::Render(format!(
            "unexpected file output '{}'",
            path.display()
        ))),
    }
}

/// The renderer for `source`: the requested one, else the one its file name
/// implies (`feed.xml.paml`), else [`DEFAULT_FORMAT`].
pub fn resolve_format(
    source: &DocumentSource,
    requested: Option<&str>,
    registry: &RendererRegistry,
) -> String {
    requested
        .map(str::to_string)
        .or_else(|| {
            source
                .path()
                .and_then(|p| p.file_name())
                .and_then(|name| name.to_str())
                .and_then(|name| registry.detect_from_filename(name))
        })
        .unwrap_or_else(|| DEFAULT_FORMAT.to_string())
}

/// Run a compilation.
pub fn compile(spec: CompileSpec, ctx: &Context, registry: &RendererRegistry) -> Result<CompileResult> {
    let started = Instant::now();
    let format = resolve_format(&spec.source, spec.format.as_deref(), registry);
    let renderer = registry.get(&format)?;

    let doc = parse_source(&spec.source, ctx)?;
    let text = renderer.render(&doc, ctx)?;
    debug!(
        format = %format,
        bytes = text.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "compiled document"
    );

    let artifact = match spec.output {
        Some(path) => {
            fs::write(&path, text).map_err(|source| PamlError::Io {
                path: path.clone(),
                source,
            })?;
            Artifact::File(path)
        }
        None => Artifact::InMemory(text),
    };
    Ok(CompileResult {
        artifact,
        format,
        mime_type: renderer.mime_type().to_string(),
    })
}

/// Send a whole non-PAML file to the processor registered for its
/// extension. Returns `Ok(None)` when no processor claims the file.
pub fn process_file(path: &Path, ctx: &Context) -> Result<Option<Processed>> {
    let Some(kind) = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| ctx.processors.detect_from_filename(name))
    else {
        return Ok(None);
    };
    let text = fs::read_to_string(path).map_err(|source| PamlError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), kind = %kind, "processing whole file");
    ctx.processors
        .process(&EmbedMode::new(kind), &text, Some(path))
}
