// Command-line interface for paml
//
// Compiles PAML documents to HTML (or XML, a JavaScript DOM builder, an outline or JSON).
//
// Usage:
//  paml <input> [--to <format>] [--output <file>]          - Compile a document (default)
//  paml convert <input> [--to <format>] [--output <file>]  - Same as above (explicit)
//  paml inspect <input> [outline|json]                      - Show the parsed tree
//  paml --list-formats                                      - List output formats and processors
//
// The input is a file path, or `-` for standard input. Without --to, the format comes from the
// file name (`feed.xml.paml` compiles to xml), then from the configuration.
//
// Files that are not .paml but have a registered foreign processor (.coffee, .ts, .md, ...) are
// compiled whole by that processor.
//
// Configuration:
//
// paml.toml in the working directory is loaded when present; --config adds another file on top.
// Default substitution variables come from .paml-defaults (a JSON object) in the working
// directory, or from --variables, and can be set one by one with -d name=value.

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use paml_config::{load_variables, Loader, PamlConfig};
use paml_engine::compile::{compile, process_file, Artifact, CompileSpec, DocumentSource};
use paml_engine::{parse_source, Context, MissingInclude, RendererRegistry};
use std::fs;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["convert", "inspect", "help"];
const DEFAULTS_FILE: &str = ".paml-defaults";
const CONFIG_FILE: &str = "paml.toml";

fn build_cli() -> Command {
    Command::new("paml")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile PAML documents to HTML")
        .long_about(
            "paml compiles PAML, an indentation-based markup, to formatted HTML.\n\n\
            Commands:\n  \
            - convert: Compile a document (default command)\n  \
            - inspect: Show the parsed document tree\n\n\
            Examples:\n  \
            paml index.paml                        # HTML to stdout\n  \
            paml index.paml -o index.html          # HTML to a file\n  \
            paml feed.xml.paml                     # XML, picked from the file name\n  \
            paml widget.paml --to js               # JavaScript DOM builder\n  \
            cat page.paml | paml - -d title=Home   # From stdin, with a variable",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List output formats and foreign processors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a paml.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("variables")
                .long("variables")
                .value_name("PATH")
                .help("JSON file of default substitution variables (defaults to .paml-defaults)")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("def")
                .short('d')
                .long("def")
                .value_name("NAME=VALUE")
                .help("Define a substitution variable (repeatable)")
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new("lenient-includes")
                .long("lenient-includes")
                .help("Put an error marker in the page for missing includes instead of failing")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log includes, macros and processor runs to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Compile a document (default command)")
                .long_about(
                    "Compile a PAML document.\n\n\
                    Output formats:\n  \
                    - html:    Formatted HTML (default)\n  \
                    - xml:     Formatted XML, no HTML tag rules\n  \
                    - js:      JavaScript DOM builder expression\n  \
                    - outline: Tree view of the parsed document\n  \
                    - json:    Parsed document as JSON\n\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\
                    Nothing is written when compilation fails.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path, or - for stdin")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("to")
                        .short('t')
                        .long("to")
                        .help("Output format (detected from the file name if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show the parsed document tree")
                .arg(
                    Arg::new("path")
                        .help("Input file path, or - for stdin")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("view")
                        .help("How to show the tree. Defaults to 'outline'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(["outline", "json"]))
                        .index(2),
                ),
        )
}

/// A first argument that is neither a flag nor a subcommand is an input:
/// `paml page.paml` means `paml convert page.paml`. `-` (stdin) counts as an
/// input.
fn should_inject_convert(args: &[String]) -> bool {
    match args.get(1) {
        Some(first) => {
            (first == "-" || !first.starts_with('-')) && !SUBCOMMANDS.contains(&first.as_str())
        }
        None => false,
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&args) {
        Ok(m) => m,
        Err(e) => {
            if should_inject_convert(&args) {
                let mut new_args = vec![args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    init_tracing(matches.get_flag("verbose"));

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    let ctx = build_context(&config, &matches);

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let to = sub_matches.get_one::<String>("to").map(|s| s.as_str());
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(input, to, output, &config, &ctx);
        }
        Some(("inspect", sub_matches)) => {
            let path = sub_matches
                .get_one::<String>("path")
                .expect("path is required");
            let view = sub_matches
                .get_one::<String>("view")
                .map(|s| s.as_str())
                .unwrap_or("outline");
            handle_inspect_command(path, view, &ctx);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let directive = if verbose { "paml=debug" } else { "paml=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(directive.parse().expect("valid log directive")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Handle the convert command
fn handle_convert_command(
    input: &str,
    to: Option<&str>,
    output: Option<&str>,
    config: &PamlConfig,
    ctx: &Context,
) {
    let source = DocumentSource::from_arg(input);

    if let Some(path) = source.path().filter(|p| is_foreign_file(p, ctx)) {
        handle_foreign_file(path, output, ctx);
        return;
    }

    let registry = RendererRegistry::default();
    let format = select_format(&source, to, &config.output.format, &registry);
    if let Err(e) = registry.get(&format) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    debug!(input, format = %format, "converting");

    let mut spec = CompileSpec::new(source).with_format(format);
    if let Some(path) = output {
        spec = spec.with_output_path(path);
    }
    let result = compile(spec, ctx, &registry).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    match result.artifact {
        Artifact::InMemory(text) => println!("{text}"),
        Artifact::File(path) => debug!(path = %path.display(), "wrote output"),
    }
}

/// Whole-file compilation through a foreign processor.
fn handle_foreign_file(path: &Path, output: Option<&str>, ctx: &Context) {
    let processed = match process_file(path, ctx) {
        Ok(Some(processed)) => processed,
        Ok(None) => {
            eprintln!("Error: no processor for '{}'", path.display());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match output {
        Some(out) => fs::write(out, processed.text).unwrap_or_else(|e| {
            eprintln!("Error writing file '{out}': {e}");
            std::process::exit(1);
        }),
        None => println!("{}", processed.text),
    }
}

/// Handle the inspect command
fn handle_inspect_command(path: &str, view: &str, ctx: &Context) {
    let source = DocumentSource::from_arg(path);
    let doc = parse_source(&source, ctx).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    let output = RendererRegistry::default()
        .render(&doc, view, ctx)
        .unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        });
    println!("{output}");
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    let registry = RendererRegistry::default();
    println!("Output formats:");
    for name in registry.list_renderers() {
        let description = registry
            .get(&name)
            .map(|renderer| renderer.description().to_string())
            .unwrap_or_default();
        println!("  {name:<10}{description}");
    }

    println!("\nForeign processors:");
    for name in Context::default().processors.list_processors() {
        println!("  {name}");
    }
}

/// A non-PAML file that a registered processor compiles.
fn is_foreign_file(path: &Path, ctx: &Context) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    !name.ends_with(".paml") && ctx.processors.detect_from_filename(name).is_some()
}

/// `--to`, else the format the file name implies, else the configured one.
fn select_format(
    source: &DocumentSource,
    to: Option<&str>,
    configured: &str,
    registry: &RendererRegistry,
) -> String {
    if let Some(to) = to {
        return to.to_string();
    }
    source
        .path()
        .and_then(|p| p.file_name())
        .and_then(|name| name.to_str())
        .and_then(|name| registry.detect_from_filename(name))
        .unwrap_or_else(|| configured.to_string())
}

fn load_cli_config(explicit_path: Option<&str>) -> PamlConfig {
    let loader = Loader::new().with_optional_file(CONFIG_FILE);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

/// Configuration, then the variables file, then `-d` definitions.
fn build_context(config: &PamlConfig, matches: &ArgMatches) -> Context {
    let mut ctx = config.context();
    if matches.get_flag("lenient-includes") {
        ctx.parser.missing_include = MissingInclude::Marker;
    }

    let variables = match matches.get_one::<String>("variables") {
        Some(path) => Some(load_variables(path)),
        None if Path::new(DEFAULTS_FILE).is_file() => Some(load_variables(DEFAULTS_FILE)),
        None => None,
    };
    if let Some(variables) = variables {
        let variables = variables.unwrap_or_else(|err| {
            eprintln!("Failed to load variables: {err}");
            std::process::exit(1);
        });
        ctx.extend_variables(variables);
    }

    let definitions: Vec<&str> = matches
        .get_many::<String>("def")
        .map(|values| values.map(|s| s.as_str()).collect())
        .unwrap_or_default();
    let definitions = parse_definitions(&definitions).unwrap_or_else(|err| {
        eprintln!("Error: {err}");
        std::process::exit(1);
    });
    ctx.extend_variables(definitions);
    ctx
}

/// `name=value` pairs. The value may be empty and may contain `=`.
fn parse_definitions(definitions: &[&str]) -> Result<Vec<(String, String)>, String> {
    definitions
        .iter()
        .map(|definition| match definition.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.to_string()))
            }
            _ => Err(format!("invalid definition '{definition}', expected name=value")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_inject_convert_for_bare_inputs() {
        assert!(should_inject_convert(&args(&["paml", "page.paml"])));
        assert!(should_inject_convert(&args(&["paml", "-"])));
        assert!(!should_inject_convert(&args(&["paml", "inspect", "page.paml"])));
        assert!(!should_inject_convert(&args(&["paml", "convert", "page.paml"])));
        assert!(!should_inject_convert(&args(&["paml", "--list-formats"])));
        assert!(!should_inject_convert(&args(&["paml"])));
    }

    #[test]
    fn test_parse_definitions() {
        let parsed = parse_definitions(&["title=Home", "empty=", "expr=a=b"]).unwrap();
        assert_eq!(
            parsed,
            vec![
                ("title".to_string(), "Home".to_string()),
                ("empty".to_string(), String::new()),
                ("expr".to_string(), "a=b".to_string()),
            ]
        );
        assert!(parse_definitions(&["novalue"]).is_err());
        assert!(parse_definitions(&["=x"]).is_err());
    }

    #[test]
    fn test_select_format() {
        let registry = RendererRegistry::default();
        let xml = DocumentSource::File("feed.xml.paml".into());
        let page = DocumentSource::File("page.paml".into());
        assert_eq!(select_format(&xml, None, "html", &registry), "xml");
        assert_eq!(select_format(&xml, Some("js"), "html", &registry), "js");
        assert_eq!(select_format(&page, None, "outline", &registry), "outline");
        assert_eq!(select_format(&DocumentSource::Stdin, None, "html", &registry), "html");
    }

    #[test]
    fn test_foreign_files() {
        let ctx = Context::default();
        assert!(is_foreign_file(Path::new("data.json"), &ctx));
        assert!(!is_foreign_file(Path::new("page.paml"), &ctx));
        assert!(!is_foreign_file(Path::new("notes.txt"), &ctx));
    }

    #[test]
    fn test_cli_parses_global_flags_after_input() {
        let matches = build_cli()
            .try_get_matches_from(args(&[
                "paml", "convert", "page.paml", "-d", "a=1", "-d", "b=2", "--to", "js",
            ]))
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<String>("to").map(String::as_str), Some("js"));
        let defs: Vec<_> = sub.get_many::<String>("def").unwrap().collect();
        assert_eq!(defs.len(), 2);
    }
}
