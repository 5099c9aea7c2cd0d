//! Processors that shell out to external compilers.
//!
//! The block text is written to a file in a fresh temp directory, the command
//! runs synchronously, and its stdout (or the file it was told to write) is
//! the result. The binary is looked up on `PATH`; its name can be replaced
//! per processor from configuration or from an environment variable
//! (`SUGAR`, `COFFEE`, ...). An override may carry extra arguments
//! (`"sugar -DDEBUG"`).

use super::{ForeignProcessor, ProcessRequest, Processed};
use crate::error::{PamlError, Result};
use crate::model::{EmbedKind, FormatFlag, FormatFlags};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;
use tracing::debug;
use which::which;

/// Where the command leaves its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutput {
    Stdout,
    /// The file substituted for `{output}` in the arguments.
    OutputFile,
}

/// An external compiler invoked once per block.
///
/// `{input}` and `{output}` in the arguments are replaced by the temp input
/// file and the expected output file.
#[derive(Debug, Clone)]
pub struct CommandProcessor {
    name: String,
    description: String,
    program: String,
    env_var: Option<String>,
    args: Vec<String>,
    source_args: Option<Vec<String>>,
    output: CommandOutput,
    mime_type: String,
    flags: FormatFlags,
    extensions: Vec<&'static str>,
    suffix: String,
}

impl CommandProcessor {
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            program: program.into(),
            env_var: None,
            args: vec!["{input}".to_string()],
            source_args: None,
            output: CommandOutput::Stdout,
            mime_type: "text/plain".to_string(),
            flags: FormatFlags::empty(),
            extensions: Vec::new(),
            suffix: ".tmp".to_string(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Arguments used instead of [`args`](Self::args) for `+source` blocks.
    pub fn source_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    pub fn env_var(mut self, var: impl Into<String>) -> Self {
        self.env_var = Some(var.into());
        self
    }

    pub fn output(mut self, output: CommandOutput) -> Self {
        self.output = output;
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn flags(mut self, flags: FormatFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn extensions(mut self, extensions: &[&'static str]) -> Self {
        self.extensions = extensions.to_vec();
        self
    }

    /// Suffix of the temp input file, which some compilers dispatch on.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Replace the program (and leading arguments) the command runs.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// The program in effect: environment, then configuration or default.
    pub fn program(&self) -> String {
        self.env_var
            .as_deref()
            .and_then(|var| env::var(var).ok())
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| self.program.clone())
    }

    fn input_file_name(&self, kind: &EmbedKind) -> String {
        match kind {
            EmbedKind::Nobrackets {
                dialect: Some(dialect),
            } => format!("input.{dialect}{}", self.suffix),
            _ => format!("input{}", self.suffix),
        }
    }

    fn fail(&self, message: impl Into<String>) -> PamlError {
        PamlError::processor(self.name.clone(), message)
    }
}

impl ForeignProcessor for CommandProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn file_extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn process(&self, request: &ProcessRequest<'_>) -> Result<Processed> {
        let program = self.program();
        let mut words = program.split_whitespace();
        let binary = words
            .next()
            .ok_or_else(|| self.fail("no command configured"))?;
        let binary_path = resolve_binary(binary).map_err(|e| self.fail(e))?;

        let workdir = tempdir().map_err(|e| self.fail(format!("temp dir error: {e}")))?;
        let input = workdir.path().join(self.input_file_name(&request.mode.kind));
        let output = workdir.path().join("output");
        fs::write(&input, request.text).map_err(|e| self.fail(e.to_string()))?;

        let template = match (&self.source_args, request.mode.modifiers.source) {
            (Some(source_args), true) => source_args,
            _ => &self.args,
        };
        let args: Vec<String> = template
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input.to_string_lossy())
                    .replace("{output}", &output.to_string_lossy())
            })
            .collect();

        let mut command = Command::new(&binary_path);
        command.args(words).args(&args);
        if let Some(dir) = request.path.and_then(Path::parent).filter(|d| d.is_dir()) {
            command.current_dir(dir);
        }

        debug!(processor = %self.name, binary = %binary_path.display(), "running external processor");
        let result = command.output().map_err(|e| {
            self.fail(format!(
                "failed to launch '{}': {e}",
                binary_path.display()
            ))
        })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(self.fail(format!(
                "'{}' exited with {}: {}",
                binary,
                result.status,
                stderr.trim()
            )));
        }

        let text = match self.output {
            CommandOutput::Stdout => String::from_utf8_lossy(&result.stdout).into_owned(),
            CommandOutput::OutputFile => fs::read_to_string(&output).unwrap_or_default(),
        };

        Ok(Processed::new(text, self.mime_type.clone()).with_flags(self.flags))
    }
}

fn resolve_binary(binary: &str) -> std::result::Result<PathBuf, String> {
    let candidate = Path::new(binary);
    if candidate.components().count() > 1 {
        return if candidate.exists() {
            Ok(candidate.to_path_buf())
        } else {
            Err(format!("command '{binary}' does not exist"))
        };
    }
    which(binary).map_err(|_| format!("command '{binary}' not found on PATH"))
}

/// The external compilers known out of the box.
pub fn default_command_processors() -> Vec<(EmbedKind, CommandProcessor)> {
    vec![
        (
            EmbedKind::Sugar,
            CommandProcessor::new("sugar", "sugar")
                .description("Sugar compiled to JavaScript")
                .env_var("SUGAR")
                .args(["-cljs", "{input}"])
                .source_args(["-cSljs", "{input}"])
                .suffix(".sjs")
                .extensions(&["sjs"])
                .mime_type("text/javascript"),
        ),
        (
            EmbedKind::CoffeeScript,
            CommandProcessor::new("coffeescript", "coffee")
                .description("CoffeeScript compiled to JavaScript")
                .env_var("COFFEE")
                .args(["-cp", "{input}"])
                .suffix(".coffee")
                .extensions(&["coffee"])
                .mime_type("text/javascript"),
        ),
        (
            EmbedKind::TypeScript,
            CommandProcessor::new("typescript", "tsc")
                .description("TypeScript compiled to JavaScript")
                .env_var("TYPESCRIPT")
                .args(["--outFile", "{output}", "--module", "amd", "{input}"])
                .output(CommandOutput::OutputFile)
                .suffix(".ts")
                .extensions(&["ts"])
                .mime_type("text/javascript"),
        ),
        (
            EmbedKind::Babel,
            CommandProcessor::new("babel", "babel")
                .description("Modern JavaScript transpiled with Babel")
                .env_var("BABEL")
                .suffix(".js")
                .extensions(&["es6"])
                .mime_type("text/javascript"),
        ),
        (
            EmbedKind::PythonicCss,
            CommandProcessor::new("pythoniccss", "pythoniccss")
                .description("PythonicCSS compiled to CSS")
                .env_var("PYTHONICCSS")
                .suffix(".pcss")
                .extensions(&["pcss"])
                .mime_type("text/css"),
        ),
        (
            EmbedKind::Markdown,
            CommandProcessor::new("markdown", "pandoc")
                .description("Markdown converted to HTML by pandoc")
                .env_var("PANDOC")
                .args(["-f", "markdown", "-t", "html", "{input}"])
                .suffix(".md")
                .extensions(&["md", "markdown"])
                .mime_type("text/html"),
        ),
        (
            EmbedKind::Hjson,
            CommandProcessor::new("hjson", "hjson")
                .description("HJSON converted to JSON")
                .env_var("HJSON")
                .args(["-c", "{input}"])
                .suffix(".hjson")
                .extensions(&["hjson"])
                .mime_type("application/json"),
        ),
        (
            EmbedKind::Texto,
            CommandProcessor::new("texto", "texto")
                .description("Texto markup converted to HTML")
                .env_var("TEXTO")
                .suffix(".txto")
                .extensions(&["txto", "texto"])
                .mime_type("text/html")
                .flags(FormatFlags::empty().with(FormatFlag::Preserve)),
        ),
        (
            EmbedKind::Nobrackets { dialect: None },
            CommandProcessor::new("nobrackets", "nobrackets")
                .description("Nobrackets sources expanded to their dialect")
                .env_var("NOBRACKETS")
                .suffix(".nb")
                .extensions(&["nb"]),
        ),
    ]
}
