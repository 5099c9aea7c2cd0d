//! Built-in `%require:css(...)` and `%require:js(...)` macros.

use super::{Macro, MacroEnv};
use crate::error::{PamlError, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Expands each argument into one element line per matching library file.
///
/// The patterns are tried in order and the first one with matches wins. An
/// argument containing `*` takes every match in sorted order, any other
/// argument the last one.
#[derive(Debug, Clone)]
pub struct RequireMacro {
    name: &'static str,
    patterns: &'static [&'static str],
    template: &'static str,
}

impl RequireMacro {
    pub fn css() -> Self {
        Self {
            name: "require:css",
            patterns: &[
                "lib/pcss/{0}.pcss",
                "lib/ccss/{0}.ccss",
                "lib/css/{0}.css",
                "lib/css/{0}-*.css",
            ],
            template: "<link(rel=stylesheet,type=text/css,href=\"{path}\")",
        }
    }

    pub fn js() -> Self {
        Self {
            name: "require:js",
            patterns: &[
                "lib/sjs/{0}.sjs",
                "lib/ts/{0}.ts",
                "lib/js/{0}.js",
                "lib/js/{0}-*.js",
            ],
            template: "<script(type=text/javascript,src=\"{path}\")",
        }
    }

    fn find(&self, argument: &str, root: &Path) -> Result<Vec<PathBuf>> {
        for pattern in self.patterns {
            let pattern = root.join(pattern.replace("{0}", argument));
            let pattern = pattern.to_string_lossy();
            let entries = glob::glob(&pattern).map_err(|e| {
                PamlError::directive(
                    format!("%{}: invalid pattern '{pattern}': {e}", self.name),
                    Default::default(),
                )
            })?;
            let mut matches: Vec<PathBuf> = entries.filter_map(|entry| entry.ok()).collect();
            if matches.is_empty() {
                continue;
            }
            matches.sort();
            if !argument.contains('*') {
                matches = matches.pop().into_iter().collect();
            }
            return Ok(matches);
        }
        Ok(Vec::new())
    }
}

impl Macro for RequireMacro {
    fn name(&self) -> &str {
        self.name
    }

    fn expand(&self, arguments: &[&str], env: &MacroEnv<'_>) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for argument in arguments {
            let found = self.find(argument, env.library_root)?;
            if found.is_empty() {
                warn!(name = %self.name, argument, "no library file matches");
                continue;
            }
            for path in found {
                let href = link_path(&path, env);
                debug!(name = %self.name, href = %href, "required library file");
                lines.push(self.template.replace("{path}", &href));
            }
        }
        Ok(lines)
    }
}

/// `path` as written into the page: relative to the document's directory when
/// there is one, otherwise to the library root, always with `/` separators.
fn link_path(path: &Path, env: &MacroEnv<'_>) -> String {
    let relative = match env.document_dir {
        Some(dir) => pathdiff::diff_paths(absolute(path), absolute(dir)),
        None => path.strip_prefix(env.library_root).ok().map(Path::to_path_buf),
    }
    .unwrap_or_else(|| path.to_path_buf());

    relative
        .components()
        .filter_map(|component| match component {
            Component::CurDir => None,
            Component::ParentDir => Some("..".to_string()),
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
