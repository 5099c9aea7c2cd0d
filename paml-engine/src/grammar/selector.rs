//! Recursive-descent parser for element selectors.
//!
//! A selector is what follows `<` in a PAML line:
//!
//! ```text
//! selector   := name? idclass* attrs? hints? embed? ':'?
//! name       := '?'? (NAME '::')? NAME
//! idclass    := ('#' NAME | '.' NAME)
//! attrs      := '(' attr (',' attr)* ')'
//! attr       := NAME ('=' (QUOTED | UNQUOTED))?
//! hints      := '|' NAME ('+' NAME)*
//! embed      := '@' WORD ('+' WORD)*
//! ```
//!
//! Each production is a method on [`SelectorParser`]. Scanning stops at the
//! first character no production accepts, so callers learn where the selector
//! ends (the rest of the line is content, or `>` for inline elements).
//!
//! Because the attribute list is consumed as a whole before the embed
//! production runs, an `@` inside an attribute value is never mistaken for
//! an embed tag: the embed is only recognised after the closing `)`.

use crate::error::{Location, PamlError, Result};
use crate::model::{Attribute, EmbedMode, FormatFlags};

/// Structured form of one element declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    /// Element name with `::` normalised to `:`. Defaults to `div`.
    pub name: String,
    /// `id`, then `class`, then the explicit attributes in written order.
    pub attributes: Vec<Attribute>,
    pub hints: FormatFlags,
    pub embed: Option<EmbedMode>,
    /// Written `?name`: a processing instruction.
    pub is_pi: bool,
    /// Ends with `:`, so the rest of the line is content.
    pub has_colon: bool,
}

impl Selector {
    /// Parse a complete selector (without the leading `<`).
    pub fn parse(input: &str) -> Result<Selector> {
        let input = input.trim();
        match scan(input)? {
            Some((selector, consumed)) if consumed == input.len() => Ok(selector),
            Some((_, consumed)) => Err(grammar(format!(
                "unexpected '{}' after selector '{}'",
                &input[consumed..],
                &input[..consumed]
            ))),
            None => Err(grammar(format!("'{input}' is not a selector"))),
        }
    }

    pub fn is_embed(&self) -> bool {
        self.embed.is_some()
    }
}

/// Whether `c` can start a selector after `<`.
pub fn starts_selector(c: char) -> bool {
    is_name_char(c) || matches!(c, '#' | '.' | '?')
}

/// Scan a selector at the start of `input` (the text after `<`).
///
/// Returns `None` when `input` does not begin with a selector, and the
/// selector together with the number of bytes it spans otherwise.
pub fn scan(input: &str) -> Result<Option<(Selector, usize)>> {
    match input.chars().next() {
        Some(c) if starts_selector(c) => {}
        _ => return Ok(None),
    }
    let mut parser = SelectorParser::new(input);
    let selector = parser.selector()?;
    Ok(Some((selector, parser.pos)))
}

fn grammar(message: impl Into<String>) -> PamlError {
    PamlError::grammar(message, Location::default())
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn is_embed_char(c: char) -> bool {
    is_name_char(c) || c == '.'
}

struct SelectorParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    fn skip_spaces(&mut self) {
        self.take_while(|c| c == ' ' || c == '\t');
    }

    fn selector(&mut self) -> Result<Selector> {
        let original = self.input;
        let is_pi = self.eat('?');
        let name = self.qualified_name();

        let mut ids: Vec<&str> = Vec::new();
        let mut classes: Vec<&str> = Vec::new();
        self.idclass(&mut ids, &mut classes)?;

        let explicit = if self.peek() == Some('(') {
            self.attrs()?
        } else {
            Vec::new()
        };

        let hints = if self.peek() == Some('|') {
            self.hints()?
        } else {
            FormatFlags::empty()
        };

        let embed = if self.peek() == Some('@') {
            Some(self.embed()?)
        } else {
            None
        };

        let has_colon = self.eat(':');

        let attributes = assemble_attributes(&ids, &classes, explicit)
            .map_err(|msg| grammar(format!("{msg} in '<{}'", &original[..self.pos])))?;

        if is_pi && !attributes.is_empty() {
            return Err(grammar(format!(
                "processing instruction cannot have attributes: '<{}'",
                &original[..self.pos]
            )));
        }

        Ok(Selector {
            name: if name.is_empty() {
                "div".to_string()
            } else {
                name
            },
            attributes,
            hints,
            embed,
            is_pi,
            has_colon,
        })
    }

    /// `(NAME '::')? NAME`, possibly empty.
    fn qualified_name(&mut self) -> String {
        let first = self.take_while(is_name_char);
        if first.is_empty() {
            return String::new();
        }
        let rest = &self.input[self.pos..];
        if rest.starts_with("::")
            && rest[2..].chars().next().map(is_name_char).unwrap_or(false)
        {
            self.pos += 2;
            let local = self.take_while(is_name_char);
            format!("{first}:{local}")
        } else {
            first.to_string()
        }
    }

    fn idclass(&mut self, ids: &mut Vec<&'a str>, classes: &mut Vec<&'a str>) -> Result<()> {
        loop {
            let marker = match self.peek() {
                Some(c @ ('#' | '.')) => c,
                _ => return Ok(()),
            };
            self.pos += 1;
            let name = self.take_while(is_name_char);
            if name.is_empty() {
                return Err(grammar(format!(
                    "expected a name after '{marker}' in '<{}'",
                    self.input
                )));
            }
            if marker == '#' {
                ids.push(name);
            } else {
                classes.push(name);
            }
        }
    }

    fn attrs(&mut self) -> Result<Vec<Attribute>> {
        let open = self.pos;
        self.pos += 1;
        let mut attributes = Vec::new();
        loop {
            self.skip_spaces();
            if self.peek() == Some(')') {
                let message = if attributes.is_empty() {
                    "empty attribute list"
                } else {
                    "trailing comma with no remaining attributes"
                };
                return Err(grammar(format!("{message}: '{}'", &self.input[open..])));
            }
            attributes.push(self.attr(open)?);
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                }
                Some(')') => {
                    self.pos += 1;
                    return Ok(attributes);
                }
                None => {
                    return Err(grammar(format!(
                        "unclosed attribute list: '{}'",
                        &self.input[open..]
                    )))
                }
                Some(other) => {
                    return Err(grammar(format!(
                        "attributes must be comma-separated, found '{other}' in '{}'",
                        &self.input[open..]
                    )))
                }
            }
        }
    }

    fn attr(&mut self, open: usize) -> Result<Attribute> {
        let pi_marker = if self.eat('?') { "?" } else { "" };
        let name = self.qualified_name();
        if name.is_empty() {
            return Err(grammar(format!(
                "malformed attribute list: '{}'",
                &self.input[open..]
            )));
        }
        let name = format!("{pi_marker}{name}");
        if !self.eat('=') {
            return Ok(Attribute::new(name, None));
        }
        let value = match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                let start = self.pos + 1;
                match self.input[start..].find(quote) {
                    Some(len) => {
                        self.pos = start + len + 1;
                        &self.input[start..start + len]
                    }
                    None => {
                        return Err(grammar(format!(
                            "unterminated {quote} quote in '{}'",
                            &self.input[open..]
                        )))
                    }
                }
            }
            _ => self.take_while(|c| c != ',' && c != ')'),
        };
        Ok(Attribute::new(name, Some(value.to_string())))
    }

    fn hints(&mut self) -> Result<FormatFlags> {
        self.pos += 1;
        let mut flags = FormatFlags::empty();
        loop {
            let hint = self.take_while(is_name_char);
            if hint.is_empty() {
                return Err(grammar(format!("empty formatting hint in '<{}'", self.input)));
            }
            flags.insert(hint.parse().map_err(grammar)?);
            if !self.eat('+') {
                return Ok(flags);
            }
        }
    }

    fn embed(&mut self) -> Result<EmbedMode> {
        self.pos += 1;
        let tag = self.take_while(|c| is_embed_char(c) || c == '+');
        if tag.is_empty() {
            return Err(grammar(format!("expected an embed language after '@' in '<{}'", self.input)));
        }
        tag.parse().map_err(grammar)
    }
}

/// Order attributes as `id`, `class`, explicit, merging shorthand classes
/// in front of an explicit `class` value.
fn assemble_attributes(
    ids: &[&str],
    classes: &[&str],
    mut explicit: Vec<Attribute>,
) -> std::result::Result<Vec<Attribute>, String> {
    let explicit_ids = explicit.iter().filter(|a| a.name == "id").count();
    if ids.len() + explicit_ids > 1 {
        return Err("duplicate id".to_string());
    }

    let mut attributes = Vec::with_capacity(explicit.len() + 2);
    if let Some(id) = ids.first() {
        attributes.push(Attribute::new("id", Some(id.to_string())));
    }
    if !classes.is_empty() {
        let shorthand = classes.join(" ");
        match explicit.iter_mut().find(|a| a.name == "class") {
            Some(existing) => {
                existing.value = Some(match existing.value.take() {
                    Some(value) if !value.is_empty() => format!("{shorthand} {value}"),
                    _ => shorthand,
                });
            }
            None => attributes.push(Attribute::new("class", Some(shorthand))),
        }
    }
    attributes.extend(explicit);
    Ok(attributes)
}
