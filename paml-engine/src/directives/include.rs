//! `%include PATH{k=v,...}+selector`

use crate::error::{Location, PamlError, Result};
use crate::grammar::Selector;
use crate::model::Attribute;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

static RE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:(\$)|([_A-Za-z][_A-Za-z0-9]*)|\{([_A-Za-z][_A-Za-z0-9]*)\})")
        .expect("valid placeholder pattern")
});

/// A parsed include directive.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeDirective {
    pub path: String,
    /// Values from the `{...}` clause, in written order of keys.
    pub substitutions: BTreeMap<String, String>,
    /// Attributes of the `+selector` clause, merged into the next element.
    pub override_attributes: Option<Vec<Attribute>>,
}

impl IncludeDirective {
    /// Parse the argument of `%include`.
    pub fn parse(argument: &str) -> Result<Self> {
        let mut rest = argument.trim().to_string();

        let mut substitutions = BTreeMap::new();
        if let (Some(open), Some(close)) = (rest.rfind('{'), rest.rfind('}')) {
            if close > open {
                for (name, value) in parse_substitutions(&rest[open + 1..close])? {
                    substitutions.insert(name, value);
                }
                rest = format!("{}{}", &rest[..open], &rest[close + 1..]);
            }
        }

        let mut override_attributes = None;
        if let Some(plus) = rest.find('+') {
            let selector = format!("div{}", rest[plus + 1..].trim());
            override_attributes = Some(Selector::parse(&selector)?.attributes);
            rest.truncate(plus);
        }

        let path = dequote(rest.trim());
        if path.is_empty() {
            return Err(PamlError::directive(
                format!("include without a path: '%include {argument}'"),
                Location::default(),
            ));
        }

        Ok(Self {
            path: path.to_string(),
            substitutions,
            override_attributes,
        })
    }

    /// Candidate files, in lookup order: next to the including file, then
    /// relative to the working directory, each with and without `.paml`.
    pub fn candidates(&self, including_dir: &Path) -> Vec<PathBuf> {
        let local = including_dir.join(&self.path);
        let plain = PathBuf::from(&self.path);
        vec![
            local.clone(),
            with_extension_appended(&local),
            plain.clone(),
            with_extension_appended(&plain),
        ]
    }

    pub fn resolve(&self, including_dir: &Path) -> Option<PathBuf> {
        self.candidates(including_dir)
            .into_iter()
            .find(|candidate| candidate.is_file())
    }
}

fn with_extension_appended(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".paml");
    PathBuf::from(name)
}

fn dequote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Parse `KEY=VALUE,KEY="VAL\"UE",KEY='VALUE'`.
pub fn parse_substitutions(text: &str) -> Result<Vec<(String, String)>> {
    let mut result = Vec::new();
    let mut offset = 0;
    while offset < text.len() {
        let rest = &text[offset..];
        let Some(equal) = rest.find('=') else {
            return Err(PamlError::directive(
                format!("include substitution without value: '{}'", rest.trim()),
                Location::default(),
            ));
        };
        let name = rest[..equal].trim().to_string();
        offset += equal + 1;

        let value_text = &text[offset..];
        let value = match value_text.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let (value, consumed) = read_quoted(value_text, quote);
                offset += consumed;
                let after = text[offset..].trim_start();
                offset = text.len() - after.len();
                if after.starts_with(',') {
                    offset += 1;
                }
                value
            }
            _ => match value_text.find(',') {
                Some(comma) => {
                    offset += comma + 1;
                    value_text[..comma].trim().to_string()
                }
                None => {
                    offset = text.len();
                    value_text.trim().to_string()
                }
            },
        };
        result.push((name, value));
    }
    Ok(result)
}

/// Read a quoted value starting at the opening quote. Returns the unescaped
/// value and the bytes consumed, closing quote included.
fn read_quoted(text: &str, quote: char) -> (String, usize) {
    let mut value = String::new();
    let mut chars = text.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            if let Some((_, next)) = chars.next() {
                if next != quote {
                    value.push('\\');
                }
                value.push(next);
            } else {
                value.push('\\');
            }
        } else if c == quote {
            return (value, i + c.len_utf8());
        } else {
            value.push(c);
        }
    }
    (value, text.len())
}

/// `$key`, `${key}` and `$$` substitution. Unknown keys are left untouched.
pub fn substitute(line: &str, variables: &BTreeMap<String, String>) -> String {
    RE_PLACEHOLDER
        .replace_all(line, |caps: &Captures<'_>| {
            if caps.get(1).is_some() {
                return "$".to_string();
            }
            let key = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str());
            match key.and_then(|k| variables.get(k)) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Marker text used in place of a missing include when errors are lenient.
pub fn missing_marker(path: &Path) -> String {
    format!("ERROR: File not found <code>{}</code>", path.display())
}
