//! Shared configuration loader for the paml toolchain.
//!
//! `defaults/paml.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`PamlConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use paml_engine::{
    Context, FormatterOptions, IndentationPolicy, MissingInclude, ParserOptions,
    ProcessorRegistry, ProcessorSettings,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/paml.default.toml");

/// Top-level configuration consumed by paml applications.
#[derive(Debug, Clone, Deserialize)]
pub struct PamlConfig {
    pub parser: ParserConfig,
    pub formatter: FormatterConfig,
    pub output: OutputConfig,
    pub includes: IncludesConfig,
    pub processors: ProcessorsConfig,
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    pub tab_width: usize,
    pub indentation: IndentationPolicy,
    pub bare_selectors: bool,
}

/// Mirrors the knobs exposed by the markup formatter.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatterConfig {
    pub indent_string: String,
    pub text_width: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Renderer used when the command line does not pick one.
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncludesConfig {
    pub missing: MissingInclude,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorsConfig {
    pub allow_empty: bool,
    pub cache: bool,
    #[serde(default)]
    pub commands: HashMap<String, String>,
}

impl PamlConfig {
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            tab_width: self.parser.tab_width,
            indentation: self.parser.indentation,
            bare_selectors: self.parser.bare_selectors,
            max_include_depth: self.includes.max_depth,
            missing_include: self.includes.missing,
        }
    }

    /// A compilation context with the built-in macros, the configured
    /// processors and the configured variables.
    pub fn context(&self) -> Context {
        let mut ctx = Context::with_defaults()
            .with_parser_options(self.parser_options())
            .with_formatter_options((&self.formatter).into())
            .with_processors(ProcessorRegistry::from_settings(&(&self.processors).into()));
        ctx.extend_variables(self.variables.clone());
        ctx
    }
}

impl From<&FormatterConfig> for FormatterOptions {
    fn from(config: &FormatterConfig) -> Self {
        FormatterOptions {
            indent_string: config.indent_string.clone(),
            text_width: config.text_width,
        }
    }
}

impl From<FormatterConfig> for FormatterOptions {
    fn from(config: FormatterConfig) -> Self {
        FormatterOptions {
            indent_string: config.indent_string,
            text_width: config.text_width,
        }
    }
}

impl From<&ProcessorsConfig> for ProcessorSettings {
    fn from(config: &ProcessorsConfig) -> Self {
        ProcessorSettings {
            allow_empty: config.allow_empty,
            cache: config.cache,
            commands: config.commands.clone(),
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<PamlConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<PamlConfig, ConfigError> {
    Loader::new().build()
}

/// Read a JSON object of default substitution variables.
///
/// Strings are taken as they are; numbers and booleans are stringified.
/// Anything else (arrays, objects, null) is rejected.
pub fn load_variables(path: impl AsRef<Path>) -> Result<BTreeMap<String, String>, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| ConfigError::Message(format!("{}: {e}", path.display())))?;
    parse_variables(&text).map_err(|e| ConfigError::Message(format!("{}: {e}", path.display())))
}

fn parse_variables(text: &str) -> Result<BTreeMap<String, String>, String> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    let serde_json::Value::Object(map) = value else {
        return Err("expected a JSON object of variables".to_string());
    };
    map.into_iter()
        .map(|(name, value)| match value {
            serde_json::Value::String(s) => Ok((name, s)),
            serde_json::Value::Number(n) => Ok((name, n.to_string())),
            serde_json::Value::Bool(b) => Ok((name, b.to_string())),
            other => Err(format!("variable '{name}' must be a string, number or bool, not {other}")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.parser.tab_width, 4);
        assert_eq!(config.parser.indentation, IndentationPolicy::Mixed);
        assert_eq!(config.output.format, "html");
        assert_eq!(config.includes.missing, MissingInclude::Error);
        assert!(config.variables.is_empty());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("includes.missing", "marker")
            .expect("override to apply")
            .set_override("parser.indentation", "spaces-only")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.includes.missing, MissingInclude::Marker);
        assert_eq!(config.parser.indentation, IndentationPolicy::SpacesOnly);
    }

    #[test]
    fn user_file_layers_over_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[formatter]\ntext_width = 60\n\n[variables]\nsite = \"Demo\"\n\n[processors.commands]\ntypescript = \"npx tsc\""
        )
        .unwrap();
        let config = Loader::new().with_file(file.path()).build().unwrap();
        assert_eq!(config.formatter.text_width, 60);
        assert_eq!(config.formatter.indent_string, "  ");
        assert_eq!(config.variables.get("site").map(String::as_str), Some("Demo"));
        let settings: ProcessorSettings = (&config.processors).into();
        assert_eq!(settings.commands.get("typescript").map(String::as_str), Some("npx tsc"));
    }

    #[test]
    fn missing_required_file_is_an_error() {
        assert!(Loader::new().with_file("/nonexistent/paml.toml").build().is_err());
        assert!(Loader::new()
            .with_optional_file("/nonexistent/paml.toml")
            .build()
            .is_ok());
    }

    #[test]
    fn config_converts_to_engine_options() {
        let config = load_defaults().unwrap();
        let options = config.parser_options();
        assert_eq!(options, ParserOptions::default());
        let formatter: FormatterOptions = config.formatter.clone().into();
        assert_eq!(formatter, FormatterOptions::default());

        let ctx = config.context();
        assert!(ctx.macros.has("require:css"));
        assert!(ctx.processors.cache().is_some());
    }

    #[test]
    fn variables_file_stringifies_scalars() {
        let vars = parse_variables(r#"{"site": "Demo", "year": 2024, "draft": false}"#).unwrap();
        assert_eq!(vars["site"], "Demo");
        assert_eq!(vars["year"], "2024");
        assert_eq!(vars["draft"], "false");
        assert!(parse_variables(r#"{"tags": ["a"]}"#).is_err());
        assert!(parse_variables("[1, 2]").is_err());
    }

    #[test]
    fn variables_file_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"lang": "en"}}"#).unwrap();
        let vars = load_variables(file.path()).unwrap();
        assert_eq!(vars.get("lang").map(String::as_str), Some("en"));
        assert!(load_variables("/nonexistent/vars.json").is_err());
    }
}
