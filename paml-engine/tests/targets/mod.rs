//! Non-HTML outputs: DOM-builder JavaScript, outline and JSON.

use insta::assert_snapshot;
use paml_engine::{compile_str, Context, PamlError, RendererRegistry};

fn render(source: &str, format: &str) -> String {
    compile_str(source, format, &Context::new()).unwrap()
}

#[test]
fn test_js_builds_nested_calls() {
    let out = render("<ul.menu\n  <li: One\n  <li\n    Two <b:bold>", "js");
    assert_eq!(
        out,
        r#"html.ul({"class":"menu"},html.li({},"One"),html.li({},"Two ",html.b({},"bold")))"#
    );
}

#[test]
fn test_js_needs_one_root() {
    let err = compile_str("<p: a\n<p: b", "js", &Context::new()).unwrap_err();
    assert!(matches!(err, PamlError::Render(_)));
}

#[test]
fn test_js_custom_element_names() {
    let out = render("<my-widget(data-x=1)", "js");
    assert_eq!(out, r#"html["my-widget"]({"data-x":"1"})"#);
}

#[test]
fn test_outline_shows_structure() {
    let out = render("<div.content\n  <p: Hello world\n  <pre@raw\n    a\n    b", "outline");
    assert_snapshot!(out, @r###"
    document
    └─ div class="content"
      ├─ p |sl
      │ └─ "Hello world "
      └─ pre @raw
        └─ "a\nb\n"
    "###);
}

#[test]
fn test_json_dump_is_valid_json() {
    let out = render("<p(title=x): Hi", "json");
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["root"]["content"][0]["name"], "p");
}

#[test]
fn test_unknown_format() {
    let err = compile_str("<p", "pdf", &Context::new()).unwrap_err();
    assert!(matches!(err, PamlError::RendererNotFound(name) if name == "pdf"));
}

#[test]
fn test_default_registry_lists_formats() {
    let registry = RendererRegistry::default();
    for name in ["html", "xml", "js", "outline", "json"] {
        assert!(registry.has(name), "missing {name}");
    }
}
