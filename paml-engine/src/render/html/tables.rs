//! Per-tag rendering tables.

use crate::model::{FormatFlag, FormatFlags};

/// Which tag tables apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Html,
    /// No tag defaults, no fillers, every empty element self-closes.
    Xml,
}

impl Dialect {
    /// Flags every element with this tag gets.
    pub fn tag_defaults(self, tag: &str) -> FormatFlags {
        use FormatFlag::*;
        if self == Dialect::Xml {
            return FormatFlags::empty();
        }
        let flags: &[FormatFlag] = match tag {
            "script" => &[SingleLine, Inline],
            "link" => &[Inline],
            "title" | "h1" | "h2" | "h3" | "h4" => &[SingleLine, Normalize],
            "p" => &[Normalize, Compact, Wrap],
            "code" | "pre" => &[Preserve],
            _ => &[],
        };
        flags.iter().copied().collect()
    }

    /// Content injected into an empty element so it is not written
    /// self-closing.
    pub fn filler(self, tag: &str) -> Option<&'static str> {
        if self == Dialect::Xml {
            return None;
        }
        match tag {
            "ol" | "ul" | "a" | "script" | "span" | "canvas" | "textarea" | "iframe" | "div" => {
                Some(" ")
            }
            "li" => Some(""),
            "td" | "th" => Some("&nbsp;"),
            _ => None,
        }
    }

    /// Whether an empty element is written `<tag />` rather than `<tag>`.
    pub fn self_closes(self, tag: &str) -> bool {
        !(self == Dialect::Html && matches!(tag, "br" | "hr"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_tables() {
        let p = Dialect::Html.tag_defaults("p");
        assert!(p.contains(FormatFlag::Wrap) && p.contains(FormatFlag::Compact));
        assert!(Dialect::Html.tag_defaults("pre").contains(FormatFlag::Preserve));
        assert_eq!(Dialect::Html.filler("td"), Some("&nbsp;"));
        assert_eq!(Dialect::Html.filler("li"), Some(""));
        assert_eq!(Dialect::Html.filler("img"), None);
        assert!(!Dialect::Html.self_closes("br"));
        assert!(Dialect::Html.self_closes("img"));
    }

    #[test]
    fn xml_has_no_tables() {
        assert!(Dialect::Xml.tag_defaults("p").is_empty());
        assert_eq!(Dialect::Xml.filler("div"), None);
        assert!(Dialect::Xml.self_closes("br"));
    }
}
