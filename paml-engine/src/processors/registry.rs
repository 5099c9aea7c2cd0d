//! Registry of foreign processors keyed by embed kind.

use super::builtin::{JsonProcessor, RawProcessor};
use super::cache::{CacheKey, ProcessCache};
use super::{ForeignProcessor, ProcessRequest, Processed};
use crate::error::{PamlError, Result};
use crate::model::{EmbedKind, EmbedMode};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Produces replacement text when a processor fails.
///
/// Receives the failing request and the error; returning `None` lets the
/// error propagate.
pub type FallbackResolver =
    Arc<dyn Fn(&ProcessRequest<'_>, &PamlError) -> Option<String> + Send + Sync>;

/// Knobs for [`ProcessorRegistry::from_settings`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessorSettings {
    /// Accept empty output instead of treating it as a failure.
    #[serde(default)]
    pub allow_empty: bool,
    /// Cache output per (mode, text, path) for the life of the registry.
    #[serde(default)]
    pub cache: bool,
    /// Program overrides by processor name (`typescript = "npx tsc"`).
    #[serde(default)]
    pub commands: HashMap<String, String>,
}

/// Maps [`EmbedKind`]s to [`ForeignProcessor`]s.
///
/// Open for extension: register a processor for any kind, including
/// [`EmbedKind::Other`], instead of editing a dispatch chain.
///
/// ```ignore
/// let mut registry = ProcessorRegistry::new();
/// registry.register(EmbedKind::Other("upper".into()), UpperProcessor);
/// ```
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    processors: HashMap<EmbedKind, Arc<dyn ForeignProcessor>>,
    allow_empty: bool,
    fallback: Option<FallbackResolver>,
    cache: Option<Arc<ProcessCache>>,
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("processors", &self.list_processors())
            .field("allow_empty", &self.allow_empty)
            .field("fallback", &self.fallback.is_some())
            .field("cache", &self.cache.is_some())
            .finish()
    }
}

impl ProcessorRegistry {
    /// An empty registry: every embed passes through unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a processor, replacing any previous one for `kind`.
    pub fn register<P: ForeignProcessor + 'static>(&mut self, kind: EmbedKind, processor: P) {
        self.processors.insert(kind.key(), Arc::new(processor));
    }

    pub fn get(&self, kind: &EmbedKind) -> Option<&dyn ForeignProcessor> {
        self.processors.get(&kind.key()).map(|p| p.as_ref())
    }

    pub fn has(&self, kind: &EmbedKind) -> bool {
        self.processors.contains_key(&kind.key())
    }

    /// Registered processor names (sorted)
    pub fn list_processors(&self) -> Vec<String> {
        let mut names: Vec<_> = self.processors.values().map(|p| p.name().to_string()).collect();
        names.sort();
        names
    }

    pub fn set_allow_empty(&mut self, allow: bool) {
        self.allow_empty = allow;
    }

    pub fn set_fallback(&mut self, fallback: FallbackResolver) {
        self.fallback = Some(fallback);
    }

    pub fn enable_cache(&mut self) {
        if self.cache.is_none() {
            self.cache = Some(Arc::new(ProcessCache::new()));
        }
    }

    pub fn cache(&self) -> Option<&ProcessCache> {
        self.cache.as_deref()
    }

    /// Find the embed kind whose processor compiles files like `filename`.
    pub fn detect_from_filename(&self, filename: &str) -> Option<EmbedKind> {
        let extension = Path::new(filename).extension().and_then(|ext| ext.to_str())?;
        let mut kinds: Vec<_> = self
            .processors
            .iter()
            .filter(|(_, p)| p.file_extensions().contains(&extension))
            .map(|(kind, _)| kind.clone())
            .collect();
        kinds.sort_by(|a, b| a.name().cmp(b.name()));
        kinds.into_iter().next()
    }

    /// Built-in processors, plus external commands when the
    /// `native-processors` feature is enabled.
    pub fn with_defaults() -> Self {
        Self::from_settings(&ProcessorSettings::default())
    }

    pub fn from_settings(settings: &ProcessorSettings) -> Self {
        let mut registry = Self::new();
        registry.register(EmbedKind::Raw, RawProcessor);
        registry.register(EmbedKind::Json, JsonProcessor);

        #[cfg(feature = "native-processors")]
        for (kind, processor) in super::command::default_command_processors() {
            let processor = match settings.commands.get(processor.name()) {
                Some(program) => processor.with_program(program.clone()),
                None => processor,
            };
            registry.register(kind, processor);
        }

        registry.allow_empty = settings.allow_empty;
        if settings.cache {
            registry.enable_cache();
        }
        registry
    }

    /// Run the processor for `mode` over `text`.
    ///
    /// Returns `Ok(None)` when no processor is registered for the mode, in
    /// which case the caller keeps the text as it is.
    pub fn process(
        &self,
        mode: &EmbedMode,
        text: &str,
        path: Option<&Path>,
    ) -> Result<Option<Processed>> {
        let Some(processor) = self.processors.get(&mode.kind.key()) else {
            debug!(mode = %mode, "no processor registered, passing block through");
            return Ok(None);
        };
        let request = ProcessRequest { text, path, mode };
        let run = || self.run(processor.as_ref(), &request);
        let outcome = match &self.cache {
            Some(cache) => cache.get_or_compute(
                CacheKey {
                    mode: mode.to_string(),
                    text: text.to_string(),
                    path: path.map(Path::to_path_buf),
                },
                run,
            ),
            None => run(),
        };
        // Fallback output is never cached: the next call retries the processor.
        match outcome {
            Ok(processed) => Ok(Some(processed)),
            Err(err) => match self.fallback.as_ref().and_then(|f| f(&request, &err)) {
                Some(text) => {
                    warn!(processor = processor.name(), error = %err, "using fallback output");
                    Ok(Some(Processed::new(text, "text/plain")))
                }
                None => Err(err),
            },
        }
    }

    fn run(&self, processor: &dyn ForeignProcessor, request: &ProcessRequest<'_>) -> Result<Processed> {
        let started = Instant::now();
        let outcome = processor.process(request).and_then(|processed| {
            if processed.text.trim().is_empty() && !self.allow_empty {
                Err(PamlError::processor(
                    processor.name(),
                    "processor produced no output",
                ))
            } else {
                Ok(processed)
            }
        });
        debug!(
            processor = processor.name(),
            lines = request.text.lines().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "processed embedded block"
        );
        outcome
    }
}
