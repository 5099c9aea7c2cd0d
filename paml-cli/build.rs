use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the renderer names from paml-engine's RendererRegistry.
// Build scripts can't reach the crate's dependencies at this point.
const AVAILABLE_FORMATS: &[&str] = &["html", "xml", "js", "outline", "json"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("paml")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile PAML documents to HTML")
        .arg_required_else_help(true)
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
                .help("JSON file of default substitution variables")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("def")
                .short('d')
                .long("def")
                .value_name("NAME=VALUE")
                .help("Define a substitution variable")
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new("lenient-includes")
                .long("lenient-includes")
                .help("Mark missing includes instead of failing")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log includes, macros and processor runs")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Compile a document (default command)")
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
                        .help("Output format")
                        .value_parser(clap::builder::PossibleValuesParser::new(AVAILABLE_FORMATS))
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path")
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
                        .help("How to show the tree")
                        .value_parser(clap::builder::PossibleValuesParser::new(["outline", "json"]))
                        .index(2),
                ),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "paml", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "paml", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "paml", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
