//! Formatting flags attached to elements and resolved by the formatter.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A single rendering policy flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatFlag {
    /// Render on one line when every descendant fits on one line.
    Inline,
    /// Open tag, content and close tag on one line.
    SingleLine,
    /// Emit text verbatim.
    Preserve,
    /// Collapse whitespace runs to a single space.
    Normalize,
    /// Trim leading and trailing whitespace.
    Strip,
    /// No newline/indent between the tags and the content.
    Compact,
    /// Word-wrap block text.
    Wrap,
}

impl FormatFlag {
    pub const ALL: [FormatFlag; 7] = [
        FormatFlag::Inline,
        FormatFlag::SingleLine,
        FormatFlag::Preserve,
        FormatFlag::Normalize,
        FormatFlag::Strip,
        FormatFlag::Compact,
        FormatFlag::Wrap,
    ];

    /// Short hint name as written in selectors (`|sl+n`).
    pub fn short_name(self) -> &'static str {
        match self {
            FormatFlag::Inline => "i",
            FormatFlag::SingleLine => "sl",
            FormatFlag::Preserve => "p",
            FormatFlag::Normalize => "n",
            FormatFlag::Strip => "s",
            FormatFlag::Compact => "c",
            FormatFlag::Wrap => "w",
        }
    }

    pub fn long_name(self) -> &'static str {
        match self {
            FormatFlag::Inline => "inline",
            FormatFlag::SingleLine => "single-line",
            FormatFlag::Preserve => "preserve",
            FormatFlag::Normalize => "normalize",
            FormatFlag::Strip => "strip",
            FormatFlag::Compact => "compact",
            FormatFlag::Wrap => "wrap",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl FromStr for FormatFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        FormatFlag::ALL
            .into_iter()
            .find(|flag| flag.short_name() == name || flag.long_name() == name)
            .ok_or_else(|| format!("unknown formatting hint '{name}'"))
    }
}

impl fmt::Display for FormatFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// A small set of [`FormatFlag`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct FormatFlags(u8);

impl FormatFlags {
    pub const fn empty() -> Self {
        FormatFlags(0)
    }

    pub fn contains(&self, flag: FormatFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    pub fn insert(&mut self, flag: FormatFlag) {
        self.0 |= flag.bit();
    }

    pub fn with(mut self, flag: FormatFlag) -> Self {
        self.insert(flag);
        self
    }

    pub fn union(self, other: FormatFlags) -> Self {
        FormatFlags(self.0 | other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = FormatFlag> + '_ {
        FormatFlag::ALL.into_iter().filter(|f| self.contains(*f))
    }

    /// Parse a `+`- or whitespace-separated list of hint names.
    pub fn parse_list(list: &str) -> Result<Self, String> {
        list.split(|c: char| c == '+' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .try_fold(FormatFlags::empty(), |acc, name| {
                name.parse::<FormatFlag>().map(|f| acc.with(f))
            })
    }
}

impl FromIterator<FormatFlag> for FormatFlags {
    fn from_iter<I: IntoIterator<Item = FormatFlag>>(iter: I) -> Self {
        iter.into_iter()
            .fold(FormatFlags::empty(), |acc, flag| acc.with(flag))
    }
}

impl fmt::Display for FormatFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.iter().map(FormatFlag::short_name).collect();
        f.write_str(&names.join("+"))
    }
}

impl Serialize for FormatFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(FormatFlag::long_name))
    }
}
