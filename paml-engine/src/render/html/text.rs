//! Text transformations applied by the formatter.

use std::borrow::Cow;

/// Collapse every run of whitespace into a single space.
pub fn normalize(text: &str) -> Cow<'_, str> {
    let needs_work = text
        .as_bytes()
        .windows(2)
        .any(|w| w[0].is_ascii_whitespace() && w[1].is_ascii_whitespace())
        || text.contains(['\n', '\t', '\r']);
    if !needs_work {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    Cow::Owned(out)
}

/// Words of `text`: whitespace separated, a `<...>` tag counting as part of
/// one word even when it contains spaces.
fn words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = None;
    let mut in_tag = false;
    for (i, c) in text.char_indices() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ => {}
        }
        if c.is_whitespace() && !in_tag {
            if let Some(s) = start.take() {
                words.push(&text[s..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        words.push(&text[s..]);
    }
    words
}

/// Greedy word wrap at `width` columns.
///
/// The first line starts at `column`, continuation lines at `indent`. A
/// leading and a trailing space survive so wrapped text still joins its
/// neighbours; the leading one becomes the first break when the first word
/// does not fit. A word glued to what precedes it never breaks away, and
/// words longer than the line get a line of their own.
pub fn wrap(text: &str, width: usize, column: usize, indent: usize) -> String {
    let words = words(text);
    if words.is_empty() {
        return text.to_string();
    }
    let leading = text.starts_with(char::is_whitespace);
    let mut out = String::with_capacity(text.len());
    let mut line_len = column;
    for (i, word) in words.iter().enumerate() {
        let len = word.chars().count();
        if i > 0 || leading {
            if line_len <= indent {
                // Nothing on the line yet.
            } else if line_len + 1 + len > width {
                out.push('\n');
                line_len = indent;
            } else {
                out.push(' ');
                line_len += 1;
            }
        }
        out.push_str(word);
        line_len += len;
    }
    if text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
    out
}

/// `name="value"`, or `name='value'` when the value holds a double quote.
pub fn quote_attribute(name: &str, value: Option<&str>) -> String {
    match value {
        None => name.to_string(),
        Some(value) if value.contains('"') => format!("{name}='{value}'"),
        Some(value) => format!("{name}=\"{value}\""),
    }
}

pub fn escape_angle_brackets(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}
