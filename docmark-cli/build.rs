use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the targets in src/main.rs
// Build scripts can't reach src/ modules, so the list is repeated here
const TARGETS: &[&str] = &["markdown", "rich"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let input = || {
        Arg::new("input")
            .help("Input file path")
            .required(true)
            .index(1)
            .value_hint(ValueHint::FilePath)
    };
    let metadata = || {
        Arg::new("metadata")
            .long("metadata")
            .help("JSON sidecar for unit and module metadata")
            .value_hint(ValueHint::FilePath)
    };

    let mut cmd = Command::new("docmark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert rich-text documents to and from extended Markdown")
        .arg_required_else_help(true)
        .arg(
            Arg::new("list-renderers")
                .long("list-renderers")
                .help("List the renderers registered for both directions")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to a docmark.toml configuration file")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between rich text and Markdown")
                .arg(input())
                .arg(
                    Arg::new("to")
                        .long("to")
                        .required(true)
                        .value_parser(clap::builder::PossibleValuesParser::new(TARGETS)),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                )
                .arg(metadata())
                .arg(
                    Arg::new("allow-network")
                        .long("allow-network")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("content-root")
                        .long("content-root")
                        .value_hint(ValueHint::Url),
                ),
        )
        .subcommand(
            Command::new("units")
                .about("Show how a Markdown file splits into units")
                .arg(input())
                .arg(metadata()),
        );

    generate_to(Bash, &mut cmd, "docmark", &outdir)?;
    generate_to(Zsh, &mut cmd, "docmark", &outdir)?;
    generate_to(Fish, &mut cmd, "docmark", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
