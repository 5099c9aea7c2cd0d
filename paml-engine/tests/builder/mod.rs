//! Property tests for indentation-determined nesting.
//!
//! Nesting only depends on how line indentations compare, so scaling every
//! indentation by a constant factor, or shifting all of them by a constant
//! offset, must build the same tree.

use paml_engine::{build_document, Context, Document, IndentationPolicy};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Line {
    Block(&'static str),
    WithText(&'static str, String),
    Text(String),
}

fn name_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["div", "section", "ul", "li", "span", "p", "em"])
}

fn line_strategy() -> impl Strategy<Value = (usize, Line)> {
    let line = prop_oneof![
        name_strategy().prop_map(Line::Block),
        (name_strategy(), "[a-z]{1,8}( [a-z]{1,8}){0,3}")
            .prop_map(|(name, text)| Line::WithText(name, text)),
        "[a-z]{1,8}( [a-z]{1,8}){0,3}".prop_map(Line::Text),
    ];
    (0usize..6, line)
}

fn render_source(lines: &[(usize, Line)], unit: usize, offset: usize) -> String {
    lines
        .iter()
        .map(|(depth, line)| {
            let indent = " ".repeat(offset + depth * unit);
            match line {
                Line::Block(name) => format!("{indent}<{name}"),
                Line::WithText(name, text) => format!("{indent}<{name}: {text}"),
                Line::Text(text) => format!("{indent}{text}"),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn build(source: &str) -> Document {
    build_document(source, None, &Context::new()).unwrap()
}

proptest! {
    #[test]
    fn reindenting_keeps_the_tree(
        lines in prop::collection::vec(line_strategy(), 1..24),
        unit in 1usize..5,
        offset in 0usize..6,
    ) {
        let reference = build(&render_source(&lines, 1, 0));
        let shifted = build(&render_source(&lines, unit, offset));
        prop_assert_eq!(reference, shifted);
    }

    #[test]
    fn tabs_count_as_tab_width(
        lines in prop::collection::vec(line_strategy(), 1..16),
    ) {
        let spaces = render_source(&lines, 4, 0);
        let tabs: String = spaces
            .lines()
            .map(|line| {
                let rest = line.trim_start_matches(' ');
                format!("{}{}", "\t".repeat((line.len() - rest.len()) / 4), rest)
            })
            .collect::<Vec<_>>()
            .join("\n");
        prop_assert_eq!(build(&spaces), build(&tabs));
    }
}

#[test]
fn test_spaces_only_policy_rejects_tabs() {
    let mut ctx = Context::new();
    ctx.parser.indentation = IndentationPolicy::SpacesOnly;
    let err = build_document("<ul\n\t<li: one", None, &ctx).unwrap_err();
    assert!(matches!(err, paml_engine::PamlError::Indentation { .. }));
}
