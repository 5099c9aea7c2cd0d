//! PAML: an indentation-based markup that compiles to HTML
//!
//!     A PAML document is a tree written with indentation instead of closing tags. Lines start
//!     with a selector (`<div.content#main(role=main):`), plain text, a directive (`%include`,
//!     `%css(...)`) or an embed tag (`@raw`, `@json`). This crate turns that text into an element
//!     tree and renders the tree as formatted HTML, XML, JavaScript or a debug outline.
//!
//!     This is a pure lib: it powers paml-cli but supposes no shell. It does not print, and it
//!     reads no environment variables except the ones a configured foreign processor names.
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # PamlError and source locations
//!     ├── context.rs              # Options and registries, passed explicitly
//!     ├── compile.rs              # Source to artifact pipeline
//!     ├── model                   # Document, Element, flags, embed modes
//!     ├── grammar
//!     │   ├── line.rs             # Line classification and indentation
//!     │   └── selector.rs         # Selector scanner
//!     ├── directives
//!     │   ├── include.rs          # %include parsing and resolution
//!     │   └── macros.rs           # %css / %js library macros
//!     ├── builder                 # Indentation-stack tree builder
//!     ├── processors              # Foreign-language processors and their registry
//!     └── render
//!         ├── html                # Flag-scoped HTML/XML formatter
//!         ├── js.rs               # DOM builder output
//!         ├── outline.rs          # Tree view
//!         └── registry.rs         # RendererRegistry
//!
//! Core Algorithms
//!
//!     Two passes do the heavy lifting. The builder (./builder/mod.rs) keeps a stack of open
//!     frames keyed by indentation and attaches each finished element to its parent, expanding
//!     includes and macros in place. The formatter (./render/html/formatter.rs) walks the tree
//!     with a stack of flag scopes; the flags an element carries, merged with the tag defaults,
//!     decide line breaks, indentation and text treatment for it and its descendants.
//!
//! Foreign Languages
//!
//!     Embedded blocks (`@coffeescript`, `@markdown`, ...) are handed verbatim to a
//!     [`ForeignProcessor`](processors::ForeignProcessor) looked up by embed kind. Raw and JSON
//!     are built in; the rest shell out to their usual compilers when the `native-processors`
//!     feature is on. A mode with no registered processor passes its text through unchanged.
//!
//! Usage
//!
//!     ```ignore
//!     let ctx = Context::default();
//!     let html = compile_str("<p: Hello", "html", &ctx)?;
//!     assert_eq!(html, "<p>Hello</p>");
//!     ```
//!
pub mod builder;
pub mod compile;
pub mod context;
pub mod directives;
pub mod error;
pub mod grammar;
pub mod model;
pub mod processors;
pub mod render;

pub use builder::build_document;
pub use compile::{
    compile, compile_file, compile_str, parse_source, parse_str, process_file, Artifact,
    CompileResult, CompileSpec, DocumentSource,
};
pub use context::{Context, FormatterOptions, MissingInclude, ParserOptions};
pub use error::{Location, PamlError, Result};
pub use grammar::IndentationPolicy;
pub use model::{Attribute, Document, Element, EmbedKind, EmbedMode, FormatFlag, FormatFlags, Node};
pub use processors::{ProcessorRegistry, ProcessorSettings};
pub use render::{Renderer, RendererRegistry};
