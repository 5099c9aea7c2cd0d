//! Line-expanding directives: `%include` and `%name(args)` macros.
//!
//! Both produce PAML lines that the tree builder feeds back into itself at
//! the directive's indentation. Includes are handled by the builder (they
//! need its frame stack); macros go through the [`MacroRegistry`].

pub mod include;
pub mod macros;

use crate::error::{Location, PamlError, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

pub use include::IncludeDirective;
pub use macros::RequireMacro;

/// Where a macro runs.
#[derive(Debug, Clone, Copy)]
pub struct MacroEnv<'a> {
    /// Directory of the file being parsed, `None` for strings and stdin.
    pub document_dir: Option<&'a Path>,
    /// Directory library patterns are resolved against.
    pub library_root: &'a Path,
}

/// A `%name(args)` expansion.
///
/// Returns PAML lines without indentation; the builder indents them to the
/// directive's level.
pub trait Macro: Send + Sync {
    fn name(&self) -> &str;

    fn expand(&self, arguments: &[&str], env: &MacroEnv<'_>) -> Result<Vec<String>>;
}

/// Registry of macros by name
#[derive(Clone, Default)]
pub struct MacroRegistry {
    macros: HashMap<String, Arc<dyn Macro>>,
}

impl fmt::Debug for MacroRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroRegistry")
            .field("macros", &self.list_macros())
            .finish()
    }
}

impl MacroRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<M: Macro + 'static>(&mut self, m: M) {
        self.macros.insert(m.name().to_string(), Arc::new(m));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Macro> {
        self.macros.get(name).map(|m| m.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn list_macros(&self) -> Vec<String> {
        let mut names: Vec<_> = self.macros.keys().cloned().collect();
        names.sort();
        names
    }

    /// `require:css` and `require:js`
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(RequireMacro::css());
        registry.register(RequireMacro::js());
        registry
    }

    /// Expand `%name(arguments)`. Arguments are split on `,` and trimmed.
    pub fn expand(
        &self,
        name: &str,
        arguments: &str,
        env: &MacroEnv<'_>,
        location: &Location,
    ) -> Result<Vec<String>> {
        let m = self.get(name).ok_or_else(|| {
            PamlError::directive(format!("unknown macro '%{name}'"), location.clone())
        })?;
        let arguments: Vec<&str> = arguments
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect();
        m.expand(&arguments, env).map_err(|e| e.at(location))
    }
}
