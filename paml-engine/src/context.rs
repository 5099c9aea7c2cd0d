//! The compilation context: options and registries, passed explicitly.

use crate::directives::MacroRegistry;
use crate::grammar::IndentationPolicy;
use crate::processors::ProcessorRegistry;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// What to do when `%include` names a file that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingInclude {
    /// Abort with a directive error.
    #[default]
    Error,
    /// Put an `ERROR: File not found` marker in the document and continue.
    Marker,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Columns a leading tab counts for.
    pub tab_width: usize,
    pub indentation: IndentationPolicy,
    /// Accept `div.content` at line start without the leading `<`.
    pub bare_selectors: bool,
    pub max_include_depth: usize,
    pub missing_include: MissingInclude,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            tab_width: 4,
            indentation: IndentationPolicy::Mixed,
            bare_selectors: false,
            max_include_depth: 32,
            missing_include: MissingInclude::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FormatterOptions {
    /// One level of output indentation.
    pub indent_string: String,
    /// Column at which `WRAP` text is wrapped.
    pub text_width: usize,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            indent_string: "  ".to_string(),
            text_width: 80,
        }
    }
}

/// Everything a compilation needs besides the source.
///
/// Owned by the caller and handed to the builder and the renderers; there
/// is no global state. Cloning is cheap for the registries (they hold
/// `Arc`s), so one context can seed many compilations.
#[derive(Debug, Clone)]
pub struct Context {
    pub parser: ParserOptions,
    pub formatter: FormatterOptions,
    /// Default `$key` values for includes.
    pub variables: BTreeMap<String, String>,
    pub macros: MacroRegistry,
    pub processors: ProcessorRegistry,
    /// Where `%require:*` looks for `lib/`. Defaults to the working directory.
    pub library_root: Option<PathBuf>,
}

impl Context {
    /// A context with empty registries.
    pub fn new() -> Self {
        Self {
            parser: ParserOptions::default(),
            formatter: FormatterOptions::default(),
            variables: BTreeMap::new(),
            macros: MacroRegistry::new(),
            processors: ProcessorRegistry::new(),
            library_root: None,
        }
    }

    /// Built-in macros and processors.
    pub fn with_defaults() -> Self {
        Self {
            macros: MacroRegistry::with_defaults(),
            processors: ProcessorRegistry::with_defaults(),
            ..Self::new()
        }
    }

    pub fn with_parser_options(mut self, options: ParserOptions) -> Self {
        self.parser = options;
        self
    }

    pub fn with_formatter_options(mut self, options: FormatterOptions) -> Self {
        self.formatter = options;
        self
    }

    pub fn with_processors(mut self, processors: ProcessorRegistry) -> Self {
        self.processors = processors;
        self
    }

    pub fn with_library_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.library_root = Some(root.into());
        self
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Add variables, replacing existing values.
    pub fn extend_variables<I, K, V>(&mut self, variables: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in variables {
            self.set_variable(name, value);
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::with_defaults()
    }
}
