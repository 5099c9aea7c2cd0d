//! Shared helpers for the integration tests.

use paml_engine::{compile_str, Context};
use std::fs;
use std::path::{Path, PathBuf};

/// Compile with empty registries: embeds pass through unprocessed.
pub fn html(source: &str) -> String {
    html_with(&Context::new(), source)
}

pub fn html_with(ctx: &Context, source: &str) -> String {
    compile_str(source, "html", ctx).unwrap()
}

/// Write `files` (relative path, contents) under `dir`, creating parents.
pub fn write_files(dir: &Path, files: &[(&str, &str)]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(name, contents)| {
            let path = dir.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, contents).unwrap();
            path
        })
        .collect()
}
