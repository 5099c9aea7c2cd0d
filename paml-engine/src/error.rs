//! Error types for parsing and rendering PAML documents

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Where in the source an error was detected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// File being parsed, `None` for strings and stdin
    pub path: Option<PathBuf>,
    /// Line number (1-indexed), 0 when unknown
    pub line: usize,
}

impl Location {
    pub fn new(path: Option<PathBuf>, line: usize) -> Self {
        Self { path, line }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}:{}", path.display(), self.line),
            None => write!(f, "<input>:{}", self.line),
        }
    }
}

/// Errors that can occur while compiling a document.
///
/// Every variant is fatal for the document being compiled: the pipeline
/// never returns partial output.
#[derive(Debug, Error)]
pub enum PamlError {
    /// Malformed selector, attribute list, inline tag or BEM usage.
    #[error("Grammar error at {location}: {message}")]
    Grammar { message: String, location: Location },

    /// Tabs where spaces are required, or the reverse.
    #[error("Indentation error at {location}: {message}")]
    Indentation { message: String, location: Location },

    /// `%include` or macro expansion failure.
    #[error("Directive error at {location}: {message}")]
    Directive { message: String, location: Location },

    /// A foreign processor failed and no fallback was configured.
    #[error("Processor '{mode}' failed: {message}")]
    ForeignProcessor { mode: String, message: String },

    /// Renderer not found in the registry
    #[error("Output format '{0}' not found")]
    RendererNotFound(String),

    /// The tree cannot be expressed in the requested output.
    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PamlError {
    pub fn grammar(message: impl Into<String>, location: Location) -> Self {
        PamlError::Grammar {
            message: message.into(),
            location,
        }
    }

    pub fn directive(message: impl Into<String>, location: Location) -> Self {
        PamlError::Directive {
            message: message.into(),
            location,
        }
    }

    pub fn processor(mode: impl Into<String>, message: impl Into<String>) -> Self {
        PamlError::ForeignProcessor {
            mode: mode.into(),
            message: message.into(),
        }
    }

    /// The location attached to parse-time errors, if any.
    pub fn location(&self) -> Option<&Location> {
        match self {
            PamlError::Grammar { location, .. }
            | PamlError::Indentation { location, .. }
            | PamlError::Directive { location, .. } => Some(location),
            _ => None,
        }
    }

    /// Fill in the location of a parse-time error raised without one.
    pub(crate) fn at(mut self, at: &Location) -> Self {
        if let PamlError::Grammar { location, .. }
        | PamlError::Indentation { location, .. }
        | PamlError::Directive { location, .. } = &mut self
        {
            if location.line == 0 && location.path.is_none() {
                *location = at.clone();
            }
        }
        self
    }
}

pub type Result<T> = std::result::Result<T, PamlError>;
