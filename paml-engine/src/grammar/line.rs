//! Line-level scanning: indentation and the fixed line shapes.

use crate::error::{Location, PamlError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static RE_PROCESSING_INSTRUCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*<\?.+\?>\s*$").expect("valid PI pattern"));
static RE_INCLUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%include\s+(.+?)\s*$").expect("valid include pattern"));
static RE_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@([\w-]+(?::[\w-]+)?):?").expect("valid declaration pattern"));
static RE_MACRO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^%([\w-]+(?::[\w-]+)?)\s*\(([^)]*)\)\s*$").expect("valid macro pattern")
});

/// Which indentation characters a document may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndentationPolicy {
    #[default]
    Mixed,
    TabsOnly,
    SpacesOnly,
}

/// Measure the indentation of `line`.
///
/// Tabs count `tab_width` columns, spaces one. Returns the width and the
/// remainder of the line.
pub fn measure_indent<'a>(
    line: &'a str,
    tab_width: usize,
    policy: IndentationPolicy,
    location: &Location,
) -> Result<(usize, &'a str)> {
    let mut width = 0;
    let mut consumed = 0;
    for c in line.chars() {
        match c {
            '\t' => {
                if policy == IndentationPolicy::SpacesOnly {
                    return Err(indentation_error(
                        "spaces are expected, this line is indented with tabs",
                        location,
                    ));
                }
                width += tab_width;
            }
            ' ' => {
                if policy == IndentationPolicy::TabsOnly {
                    return Err(indentation_error(
                        "tabs are expected, this line is indented with spaces",
                        location,
                    ));
                }
                width += 1;
            }
            _ => break,
        }
        consumed += 1;
    }
    Ok((width, &line[consumed..]))
}

fn indentation_error(message: &str, location: &Location) -> PamlError {
    PamlError::Indentation {
        message: message.to_string(),
        location: location.clone(),
    }
}

/// Strip at most `width` columns of leading whitespace.
pub fn strip_indent(line: &str, width: usize, tab_width: usize) -> &str {
    let mut removed = 0;
    let mut offset = 0;
    for c in line.chars() {
        let step = match c {
            '\t' => tab_width,
            ' ' => 1,
            _ => break,
        };
        if removed + step > width {
            break;
        }
        removed += step;
        offset += 1;
    }
    &line[offset..]
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// `line` is expected without its indentation.
pub fn is_comment(line: &str) -> bool {
    line.starts_with('#')
}

pub fn is_processing_instruction(line: &str) -> bool {
    RE_PROCESSING_INSTRUCTION.is_match(line.trim_end_matches(['\n', '\r']))
}

/// The argument of a `%include` line.
pub fn match_include(line: &str) -> Option<&str> {
    RE_INCLUDE
        .captures(line.trim_end())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Name of an `@name` declaration line.
pub fn match_declaration(line: &str) -> Option<&str> {
    RE_DECLARATION
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Name and raw argument list of a `%name(args)` line.
pub fn match_macro(line: &str) -> Option<(&str, &str)> {
    let caps = RE_MACRO.captures(line.trim_end())?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}
