//! Embed modes: the `@lang+modifier` tag of foreign-language blocks.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The language of an embedded block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EmbedKind {
    Raw,
    Json,
    Sugar,
    CoffeeScript,
    TypeScript,
    Babel,
    PythonicCss,
    Hjson,
    Texto,
    Markdown,
    /// `nobrackets`, optionally prefixed with the dialect (`js.nobrackets`).
    Nobrackets { dialect: Option<String> },
    /// Any other tag. Passed through unless a processor is registered for it.
    Other(String),
}

impl EmbedKind {
    /// Canonical name, used for registry lookups and cache keys.
    pub fn name(&self) -> &str {
        match self {
            EmbedKind::Raw => "raw",
            EmbedKind::Json => "json",
            EmbedKind::Sugar => "sugar",
            EmbedKind::CoffeeScript => "coffeescript",
            EmbedKind::TypeScript => "typescript",
            EmbedKind::Babel => "babel",
            EmbedKind::PythonicCss => "pythoniccss",
            EmbedKind::Hjson => "hjson",
            EmbedKind::Texto => "texto",
            EmbedKind::Markdown => "markdown",
            EmbedKind::Nobrackets { .. } => "nobrackets",
            EmbedKind::Other(name) => name,
        }
    }

    /// Registry key: every nobrackets dialect shares one processor.
    pub(crate) fn key(&self) -> EmbedKind {
        match self {
            EmbedKind::Nobrackets { .. } => EmbedKind::Nobrackets { dialect: None },
            other => other.clone(),
        }
    }
}

impl From<&str> for EmbedKind {
    fn from(tag: &str) -> Self {
        match tag {
            "raw" => EmbedKind::Raw,
            "json" => EmbedKind::Json,
            "sugar" => EmbedKind::Sugar,
            "coffeescript" | "coffee" => EmbedKind::CoffeeScript,
            "typescript" | "ts" => EmbedKind::TypeScript,
            "babel" | "es6" => EmbedKind::Babel,
            "pythoniccss" | "pcss" => EmbedKind::PythonicCss,
            "hjson" => EmbedKind::Hjson,
            "texto" => EmbedKind::Texto,
            "markdown" | "md" | "pandoc" => EmbedKind::Markdown,
            "nobrackets" => EmbedKind::Nobrackets { dialect: None },
            other => match other.strip_suffix("nobrackets") {
                Some(prefix) => {
                    let dialect = prefix.trim_end_matches('.');
                    EmbedKind::Nobrackets {
                        dialect: (!dialect.is_empty()).then(|| dialect.to_string()),
                    }
                }
                None => EmbedKind::Other(other.to_string()),
            },
        }
    }
}

impl fmt::Display for EmbedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedKind::Nobrackets {
                dialect: Some(dialect),
            } => write!(f, "{dialect}.nobrackets"),
            other => f.write_str(other.name()),
        }
    }
}

/// Post-processing modifiers, written `+source` / `+escape` after the tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ModeModifiers {
    /// Ask the processor to keep the source alongside its output.
    pub source: bool,
    /// Replace `<` and `>` with entities in the processed output.
    pub escape: bool,
    /// Modifiers this crate does not interpret, kept for processors.
    pub other: Vec<String>,
}

impl ModeModifiers {
    pub fn is_empty(&self) -> bool {
        !self.source && !self.escape && self.other.is_empty()
    }
}

/// A parsed embed tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmbedMode {
    pub kind: EmbedKind,
    pub modifiers: ModeModifiers,
}

impl EmbedMode {
    pub fn new(kind: EmbedKind) -> Self {
        Self {
            kind,
            modifiers: ModeModifiers::default(),
        }
    }
}

impl FromStr for EmbedMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('+');
        let tag = parts.next().unwrap_or_default().trim();
        if tag.is_empty() {
            return Err(format!("empty embed tag in '@{s}'"));
        }
        let mut modifiers = ModeModifiers::default();
        for part in parts.map(str::trim).filter(|p| !p.is_empty()) {
            match part {
                "source" => modifiers.source = true,
                "escape" => modifiers.escape = true,
                other => modifiers.other.push(other.to_string()),
            }
        }
        Ok(EmbedMode {
            kind: EmbedKind::from(tag),
            modifiers,
        })
    }
}

impl fmt::Display for EmbedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.modifiers.source {
            f.write_str("+source")?;
        }
        if self.modifiers.escape {
            f.write_str("+escape")?;
        }
        for other in &self.modifiers.other {
            write!(f, "+{other}")?;
        }
        Ok(())
    }
}

impl Serialize for EmbedMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
