//! Library macros resolved against a temporary library tree.

use crate::common::write_files;
use insta::assert_snapshot;
use paml_engine::{compile_file, compile_str, Context, PamlError};
use tempfile::tempdir;

#[test]
fn test_require_macros_link_library_files() {
    let dir = tempdir().unwrap();
    let paths = write_files(
        dir.path(),
        &[
            ("index.paml", "<head\n  %require:css(site)\n  %require:js(app*)\n"),
            ("lib/css/site.css", ""),
            ("lib/js/app-b.js", ""),
            ("lib/js/app-a.js", ""),
        ],
    );
    let ctx = Context::with_defaults().with_library_root(dir.path());
    let out = compile_file(&paths[0], None, &ctx).unwrap();
    assert_snapshot!(out, @r###"
    <head>
      <link rel="stylesheet" type="text/css" href="lib/css/site.css" />
      <script type="text/javascript" src="lib/js/app-a.js"> </script>
      <script type="text/javascript" src="lib/js/app-b.js"> </script>
    </head>
    "###);
}

#[test]
fn test_require_prefers_earlier_patterns() {
    let dir = tempdir().unwrap();
    let paths = write_files(
        dir.path(),
        &[
            ("pages/index.paml", "%require:css(theme)\n"),
            ("lib/pcss/theme.pcss", ""),
            ("lib/css/theme.css", ""),
        ],
    );
    let ctx = Context::with_defaults().with_library_root(dir.path());
    let out = compile_file(&paths[0], None, &ctx).unwrap();
    assert_eq!(
        out,
        r#"<link rel="stylesheet" type="text/css" href="../lib/pcss/theme.pcss" />"#
    );
}

#[test]
fn test_unknown_macro_is_a_directive_error() {
    let err = compile_str("<div\n  %nope(x)", "html", &Context::default()).unwrap_err();
    assert!(matches!(err, PamlError::Directive { .. }));
}
