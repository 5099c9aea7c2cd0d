//! Element shapes: block, one-line, empty and inline rendering.

use crate::common::{html, html_with};
use insta::assert_snapshot;
use paml_engine::{compile_str, Context, PamlError};

#[test]
fn test_bare_selector_document() {
    let mut ctx = Context::new();
    ctx.parser.bare_selectors = true;
    let out = html_with(
        &ctx,
        "html\n  body\n    div.content\n      p: Hello world\n",
    );
    assert_snapshot!(out, @r###"
    <html>
      <body>
        <div class="content">
          <p>Hello world</p>
        </div>
      </body>
    </html>
    "###);
}

#[test]
fn test_same_document_with_brackets() {
    let out = html("<html\n  <body\n    <div.content\n      <p: Hello world\n");
    assert!(out.contains("      <p>Hello world</p>\n"));
    assert!(out.starts_with("<html>\n  <body>\n"));
    assert!(out.ends_with("</body>\n</html>"));
}

#[test]
fn test_empty_elements_self_close() {
    assert_eq!(html("<img(src=foo.png)"), r#"<img src="foo.png" />"#);
    assert_eq!(html("<input(type=checkbox,checked)"), r#"<input type="checkbox" checked />"#);
}

#[test]
fn test_fillers_keep_elements_open() {
    assert_eq!(html("<div"), "<div> </div>");
    assert_eq!(html("<li"), "<li></li>");
    assert_snapshot!(html("<table\n  <tr\n    <td\n    <th"), @r###"
    <table>
      <tr>
        <td>&nbsp;</td>
        <th>&nbsp;</th>
      </tr>
    </table>
    "###);
}

#[test]
fn test_never_self_closing_tags() {
    assert_eq!(html("<br"), "<br>");
    assert_eq!(html("<hr.rule"), r#"<hr class="rule">"#);
}

#[test]
fn test_selector_attribute_order() {
    assert_eq!(
        html("<div#x.a.b(data-y=1): z"),
        r#"<div id="x" class="a b" data-y="1">z</div>"#
    );
}

#[test]
fn test_same_line_text_is_single_line() {
    assert_eq!(html("<p: Hello world"), "<p>Hello world</p>");
    assert_eq!(html("<h1:   Spaced    title  "), "<h1>Spaced title</h1>");
}

#[test]
fn test_inline_elements_flow_with_text() {
    let out = html("<p\n  Say <b:hello> to <a(href=/x):me>!");
    assert_eq!(out, r#"<p>Say <b>hello</b> to <a href="/x">me</a>!</p>"#);
}

#[test]
fn test_single_line_hint_flattens_children() {
    let out = html("<div|sl\n  <span: a\n  <span: b");
    assert_eq!(out, "<div><span>a</span><span>b</span></div>");
}

#[test]
fn test_inline_default_collapses_short_content() {
    let out = html("<head\n  <script(src=app.js)\n  <link(rel=icon,href=favicon.ico)");
    assert_snapshot!(out, @r###"
    <head>
      <script src="app.js"> </script>
      <link rel="icon" href="favicon.ico" />
    </head>
    "###);
}

#[test]
fn test_bem_classes() {
    let out = html("<div.card-\n  <h2.-title: T\n  <div.-body\n    <span.-x: x");
    assert_snapshot!(out, @r###"
    <div>
      <h2 class="card-title">T</h2>
      <div class="card-body">
        <span class="card-x">x</span>
      </div>
    </div>
    "###);
}

#[test]
fn test_processing_instruction_lines_pass_through() {
    let out = html("<?xml version=\"1.0\"?>\n<root\n  <item: a");
    assert_snapshot!(out, @r###"
    <?xml version="1.0"?>
    <root>
      <item>a</item>
    </root>
    "###);
}

#[test]
fn test_declarations_are_not_rendered() {
    let out = html("@meta:\n  <p: hidden\n<p: shown");
    assert_eq!(out, "<p>shown</p>");
}

#[test]
fn test_comments_are_skipped() {
    let out = html("# header comment\n<ul\n  # inside\n  <li: one");
    assert_eq!(out, "<ul>\n  <li>one</li>\n</ul>");
}

#[test]
fn test_grammar_errors_abort() {
    let ctx = Context::new();
    for source in ["<div(a=1,)", "<div#a#b", "<p\n  open <b:never closed", "<div(a=1"] {
        let err = compile_str(source, "html", &ctx).unwrap_err();
        assert!(
            matches!(err, PamlError::Grammar { .. }),
            "expected a grammar error for {source:?}, got {err:?}"
        );
    }
}

#[test]
fn test_xml_dialect_has_no_tag_tables() {
    let out = compile_str("<feed\n  <entry\n  <br", "xml", &Context::new()).unwrap();
    assert_eq!(out, "<feed>\n  <entry />\n  <br />\n</feed>");
}
