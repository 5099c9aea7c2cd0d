//! Text treatment: normalizing, wrapping, preserving and embedded blocks.

use crate::common::{html, html_with};
use insta::assert_snapshot;
use paml_engine::processors::{ProcessRequest, ProcessorRegistry};
use paml_engine::{compile_str, Context, EmbedKind, PamlError};
use std::sync::Arc;

#[test]
fn test_paragraph_lines_join() {
    let out = html("<p\n  First line,\n  second   line.");
    assert_eq!(out, "<p>First line, second line.</p>");
}

#[test]
fn test_paragraph_wraps_at_text_width() {
    let mut ctx = Context::new();
    ctx.formatter.text_width = 20;
    let out = html_with(&ctx, "<div\n  <p\n    one two three four five six seven");
    assert_snapshot!(out, @r###"
    <div>
      <p>one two three
      four five six
      seven</p>
    </div>
    "###);
}

#[test]
fn test_inline_elements_wrap_as_one_word() {
    let mut ctx = Context::new();
    ctx.formatter.text_width = 30;
    let out = html_with(&ctx, "<div
  <p
    aaaa bbbb cccc <b:dddd eeee> ffff gggg hhhh");
    assert_snapshot!(out, @r###"
    <div>
      <p>aaaa bbbb cccc
      <b>dddd eeee</b> ffff gggg
      hhhh</p>
    </div>
    "###);
}

#[test]
fn test_wrapped_lines_stay_within_text_width() {
    let words: Vec<String> = (b'a'..=b'z')
        .chain(b'a'..=b'n')
        .map(|c| (c as char).to_string().repeat(4))
        .collect();
    let (head, tail) = words.split_at(20);
    let source = format!("<p
  {} <b:uuuu vvvv> {}", head.join(" "), tail.join(" "));
    let out = html(&source);
    for line in out.lines() {
        assert!(line.chars().count() <= 80, "line too long: {line:?}");
    }
    assert!(out.contains("<b>uuuu vvvv</b>"));
    assert!(out.starts_with("<p>aaaa "));
}

#[test]
fn test_indent_string_is_configurable() {
    let mut ctx = Context::new();
    ctx.formatter.indent_string = "\t".to_string();
    let out = html_with(&ctx, "<ul\n  <li: one");
    assert_eq!(out, "<ul>\n\t<li>one</li>\n</ul>");
}

#[test]
fn test_strip_hint() {
    assert_eq!(html("<span|s:   padded   "), "<span>padded</span>");
}

#[test]
fn test_raw_block_survives_wrapping_ancestor() {
    let source = "<p\n  <pre@raw\n    x   =  1\n      y\n";
    let out = html_with(&Context::default(), source);
    assert!(
        out.contains("<pre>x   =  1\n  y</pre>"),
        "raw body was reformatted:\n{out}"
    );
}

#[test]
fn test_raw_block_without_processor_is_verbatim() {
    let out = html("<pre@raw\n  a  b\n\n    c");
    assert_eq!(out, "<pre>\na  b\n\n  c\n</pre>");
}

#[test]
fn test_json_block_is_compacted() {
    let source = "<script(type=application/json)@json\n  { \"a\" : [1, 2] }";
    let out = html_with(&Context::default(), source);
    assert_eq!(out, r#"<script type="application/json">{"a":[1,2]}</script>"#);
}

#[test]
fn test_escape_modifier() {
    let out = html_with(&Context::default(), "<pre@raw+escape\n  <b>x</b>");
    assert_eq!(out, "<pre>&lt;b&gt;x&lt;/b&gt;</pre>");
}

#[test]
fn test_processor_failure_is_fatal() {
    let err = compile_str("<div@json\n  {not json", "html", &Context::default()).unwrap_err();
    assert!(matches!(err, PamlError::ForeignProcessor { .. }));
}

#[test]
fn test_fallback_replaces_failed_output() {
    let mut processors = ProcessorRegistry::with_defaults();
    processors.set_fallback(Arc::new(|request: &ProcessRequest<'_>, _err: &PamlError| {
        Some(format!("/* {} failed */", request.mode))
    }));
    let ctx = Context::new().with_processors(processors);
    let out = html_with(&ctx, "<div@json\n  {not json");
    assert_eq!(out, "<div>/* json failed */</div>");
}

#[test]
fn test_unregistered_mode_passes_through() {
    let ctx = Context::default();
    assert!(!ctx.processors.has(&EmbedKind::Other("upper".into())));
    let out = html_with(&ctx, "<pre@upper\n  keep me");
    assert_eq!(out, "<pre>\nkeep me\n</pre>");
}
