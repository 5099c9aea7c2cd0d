//! Foreign processors: compilers for embedded foreign-language blocks.
//!
//! The formatter hands the flattened text of an `@lang` block to the
//! processor registered for its [`EmbedKind`](crate::model::EmbedKind) and
//! splices the result back into the tree. The same processors compile whole
//! files when the CLI is given a non-PAML source.
//!
//! Two families ship with the crate:
//!
//! - in-process processors ([`builtin`]): `raw`, `json`
//! - external commands ([`command`], feature `native-processors`): sugar,
//!   coffee, tsc, babel, pythoniccss, pandoc, hjson, texto, nobrackets
//!
//! The core never retries a processor. A failure (or empty output when empty
//! output is not allowed) is an error unless a fallback resolver is set on the
//! [`ProcessorRegistry`].

pub mod builtin;
pub mod cache;
#[cfg(feature = "native-processors")]
pub mod command;
pub mod registry;

use crate::error::Result;
use crate::model::{EmbedMode, FormatFlags};
use std::path::Path;

pub use cache::ProcessCache;
pub use registry::{FallbackResolver, ProcessorRegistry, ProcessorSettings};

/// Input to a single processor invocation.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRequest<'a> {
    pub text: &'a str,
    /// The file the text comes from, when known.
    pub path: Option<&'a Path>,
    pub mode: &'a EmbedMode,
}

/// Output of a processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    pub text: String,
    pub mime_type: String,
    /// Extra formatting flags for the element that held the block.
    pub flags: FormatFlags,
}

impl Processed {
    pub fn new(text: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mime_type: mime_type.into(),
            flags: FormatFlags::empty(),
        }
    }

    pub fn with_flags(mut self, flags: FormatFlags) -> Self {
        self.flags = flags;
        self
    }
}

/// Converts foreign-language text into output text plus a MIME type.
///
/// Implementations must be deterministic for identical requests so their
/// output can be cached.
pub trait ForeignProcessor: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Extensions of whole files this processor compiles (without the dot).
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    fn process(&self, request: &ProcessRequest<'_>) -> Result<Processed>;
}
