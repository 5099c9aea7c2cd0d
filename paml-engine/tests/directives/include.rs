//! `%include` through the whole pipeline.

use crate::common::write_files;
use insta::assert_snapshot;
use paml_engine::{compile_file, Context, MissingInclude, PamlError};
use tempfile::tempdir;

#[test]
fn test_include_substitutes_and_overrides() {
    let dir = tempdir().unwrap();
    let paths = write_files(
        dir.path(),
        &[
            (
                "main.paml",
                "<ul\n  %include item.paml{label=First}+.first\n  %include item.paml{label=\"Second, too\"}\n",
            ),
            ("item.paml", "<li.item: ${label}\n"),
        ],
    );
    let out = compile_file(&paths[0], None, &Context::new()).unwrap();
    assert_snapshot!(out, @r###"
    <ul>
      <li class="first item">First</li>
      <li class="item">Second, too</li>
    </ul>
    "###);
}

#[test]
fn test_nested_includes_keep_indentation() {
    let dir = tempdir().unwrap();
    let paths = write_files(
        dir.path(),
        &[
            ("main.paml", "<div\n  %include parts/a.paml\n"),
            ("parts/a.paml", "<section\n  %include b.paml\n"),
            ("parts/b.paml", "<p: deep\n"),
        ],
    );
    let out = compile_file(&paths[0], None, &Context::new()).unwrap();
    assert_snapshot!(out, @r###"
    <div>
      <section>
        <p>deep</p>
      </section>
    </div>
    "###);
}

#[test]
fn test_include_extension_is_optional() {
    let dir = tempdir().unwrap();
    let paths = write_files(
        dir.path(),
        &[("main.paml", "<nav\n  %include menu\n"), ("menu.paml", "<a(href=/): Home\n")],
    );
    let out = compile_file(&paths[0], None, &Context::new()).unwrap();
    assert_eq!(out, "<nav>\n  <a href=\"/\">Home</a>\n</nav>");
}

#[test]
fn test_context_variables_are_defaults() {
    let dir = tempdir().unwrap();
    let paths = write_files(
        dir.path(),
        &[
            ("main.paml", "<head\n  %include title.paml\n  %include title.paml{site=Other}\n"),
            ("title.paml", "<title: ${site} | $$5\n"),
        ],
    );
    let mut ctx = Context::new();
    ctx.set_variable("site", "Demo");
    let out = compile_file(&paths[0], None, &ctx).unwrap();
    assert_eq!(
        out,
        "<head>\n  <title>Demo | $5</title>\n  <title>Other | $5</title>\n</head>"
    );
}

#[test]
fn test_unbalanced_include_does_not_capture_siblings() {
    let dir = tempdir().unwrap();
    let paths = write_files(
        dir.path(),
        &[
            ("main.paml", "<div\n  %include open.paml\n  <p: sibling\n"),
            ("open.paml", "<section\n  <span: x\n"),
        ],
    );
    let doc = paml_engine::parse_source(
        &paml_engine::DocumentSource::File(paths[0].clone()),
        &Context::new(),
    )
    .unwrap();
    let div = doc.elements().next().unwrap();
    let names: Vec<_> = div.children().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["section", "p"]);
}

#[test]
fn test_missing_include_is_an_error_by_default() {
    let dir = tempdir().unwrap();
    let paths = write_files(dir.path(), &[("main.paml", "<div\n  %include nothere.paml\n")]);
    let err = compile_file(&paths[0], None, &Context::new()).unwrap_err();
    assert!(matches!(err, PamlError::Directive { .. }));
    assert_eq!(err.location().map(|l| l.line), Some(2));
}

#[test]
fn test_missing_include_marker() {
    let dir = tempdir().unwrap();
    let paths = write_files(dir.path(), &[("main.paml", "<div\n  %include nothere.paml\n")]);
    let mut ctx = Context::new();
    ctx.parser.missing_include = MissingInclude::Marker;
    let out = compile_file(&paths[0], None, &ctx).unwrap();
    assert!(out.starts_with("<div>ERROR: File not found <code>"));
    assert!(out.ends_with("nothere.paml</code></div>"));
}

#[test]
fn test_recursive_include_hits_depth_limit() {
    let dir = tempdir().unwrap();
    let paths = write_files(dir.path(), &[("loop.paml", "<div\n  %include loop.paml\n")]);
    let mut ctx = Context::new();
    ctx.parser.max_include_depth = 4;
    let err = compile_file(&paths[0], None, &ctx).unwrap_err();
    assert!(matches!(err, PamlError::Directive { .. }));
    assert!(err.to_string().contains("deeper than 4"));
}
