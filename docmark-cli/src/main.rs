// Command-line interface for docmark
//
// Converts between rich-text documents and extended Markdown. Rich documents are exchanged as
// JSON (the serde form of docmark_render::RichDocument); reading and writing the binary
// word-processor container is left to other tools.
//
// The library never touches the filesystem for output. This binary decides where the Markdown,
// the extracted media and the unit metadata go.
//
// Usage:
//  docmark <input> --to <markdown|rich> [--output <file>]          - Convert (default)
//  docmark convert <input> --to <markdown|rich> [--output <file>]  - Same as above (explicit)
//  docmark units <input.md> [--metadata <file>]                    - List the units of a Markdown file
//  docmark --list-renderers                                        - List registered renderers
//
// Unit and module metadata travel in a JSON sidecar given with --metadata: written when
// converting to Markdown, read when converting back.

use clap::{Arg, ArgAction, Command, ValueHint};
use docmark_config::{DocmarkConfig, Loader};
use docmark_render::metadata::{ModuleMetadata, UnitMetadata};
use docmark_render::resolve::{FileSystemResolver, Url};
use docmark_render::to_markdown::FRONT_MATTER_PROPERTY;
use docmark_render::units::{split_units, UnitMetadataMap};
use docmark_render::{
    parse_markdown, serialize_markdown, to_markdown, to_richtext, MarkdownDocument, RichDocument,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const TARGETS: &[&str] = &["markdown", "rich"];
const SUBCOMMANDS: &[&str] = &["convert", "units", "help"];

/// Sidecar carrying what Markdown has no place for.
#[derive(Debug, Default, Serialize, Deserialize)]
struct MetadataFile {
    #[serde(default)]
    module: ModuleMetadata,
    #[serde(default)]
    units: UnitMetadataMap,
}

#[derive(Serialize)]
struct UnitSummary<'a> {
    title: String,
    blocks: usize,
    metadata: &'a UnitMetadata,
}

fn build_cli() -> Command {
    Command::new("docmark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert rich-text documents to and from extended Markdown")
        .long_about(
            "docmark converts styled rich-text documents (as JSON) into Markdown and back.\n\n\
            Commands:\n  \
            - convert: Rich text to Markdown or Markdown to rich text\n  \
            - units:   Show how a Markdown file splits into units\n\n\
            Examples:\n  \
            docmark doc.json --to markdown -o doc.md     # Markdown plus media/ next to it\n  \
            docmark doc.md --to rich -o doc.json         # Back to a rich document\n  \
            docmark units doc.md                         # Unit titles and metadata as JSON",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-renderers")
                .long("list-renderers")
                .help("List the renderers registered for both directions")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a docmark.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every conversion decision, not just warnings")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between rich text and Markdown (default command)")
                .long_about(
                    "Convert a document in either direction.\n\n\
                    Targets:\n  \
                    - markdown: input is a rich document (.json)\n  \
                    - rich:     input is Markdown (.md)\n\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\
                    Extracted images are written relative to the output file.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_parser(clap::builder::PossibleValuesParser::new(TARGETS))
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("metadata")
                        .long("metadata")
                        .value_name("PATH")
                        .help("JSON sidecar for unit and module metadata")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("allow-network")
                        .long("allow-network")
                        .help("Fetch images referenced by absolute URL")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("content-root")
                        .long("content-root")
                        .value_name("URL")
                        .help("Site root that relative .md links are rewritten against")
                        .value_hint(ValueHint::Url),
                ),
        )
        .subcommand(
            Command::new("units")
                .about("Show how a Markdown file splits into units")
                .arg(
                    Arg::new("input")
                        .help("Markdown file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("metadata")
                        .long("metadata")
                        .value_name("PATH")
                        .help("JSON sidecar with unit metadata to attach")
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&args) {
        Ok(m) => m,
        Err(e) => {
            // `docmark <input> --to ...` is shorthand for `docmark convert <input> --to ...`
            if args.len() > 1
                && !args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&args[1].as_str())
            {
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

    init_logging(matches.get_flag("verbose"));

    if matches.get_flag("list-renderers") {
        handle_list_renderers_command();
        return;
    }

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let to = sub_matches.get_one::<String>("to").expect("to is required");
            let request = ConvertRequest {
                input,
                output: sub_matches.get_one::<String>("output").map(|s| s.as_str()),
                metadata: sub_matches.get_one::<String>("metadata").map(|s| s.as_str()),
                allow_network: sub_matches.get_flag("allow-network"),
                content_root: sub_matches
                    .get_one::<String>("content-root")
                    .map(|s| s.as_str()),
            };
            match to.as_str() {
                "markdown" => handle_to_markdown_command(&request, &config),
                _ => handle_to_rich_command(&request, &config),
            }
        }
        Some(("units", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let metadata = sub_matches.get_one::<String>("metadata").map(|s| s.as_str());
            handle_units_command(input, metadata);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

struct ConvertRequest<'a> {
    input: &'a str,
    output: Option<&'a str>,
    metadata: Option<&'a str>,
    allow_network: bool,
    content_root: Option<&'a str>,
}

/// Rich document (JSON) to Markdown, writing extracted media next to the output.
fn handle_to_markdown_command(request: &ConvertRequest<'_>, config: &DocmarkConfig) {
    let source = read_input(request.input);
    let document: RichDocument = serde_json::from_str(&source).unwrap_or_else(|e| {
        eprintln!("Error: '{}' is not a rich document: {e}", request.input);
        std::process::exit(1);
    });

    let output_dir = request.output.map(directory_of);
    let mut options = config.markdown_options();
    options.output_dir = output_dir.clone();

    let result = to_markdown::convert(&document, &options);
    let text = serialize_markdown(&result.document).unwrap_or_else(|e| {
        eprintln!("Serialization error: {e}");
        std::process::exit(1);
    });

    let media_base = output_dir.unwrap_or_else(|| PathBuf::from("."));
    for media in &result.media {
        let target = if media.path.is_absolute() {
            media.path.clone()
        } else {
            media_base.join(&media.path)
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).unwrap_or_else(|e| {
                eprintln!("Error creating '{}': {e}", parent.display());
                std::process::exit(1);
            });
        }
        write_output(&target, &media.data);
        log::debug!("wrote {}", target.display());
    }

    if let Some(path) = request.metadata {
        let sidecar = MetadataFile {
            module: result.module.clone(),
            units: result.units.clone(),
        };
        let json = serde_json::to_string_pretty(&sidecar).unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        });
        write_output(Path::new(path), json.as_bytes());
    }

    emit(request.output, &text);
}

/// Markdown to rich document (JSON).
fn handle_to_rich_command(request: &ConvertRequest<'_>, config: &DocmarkConfig) {
    let source = read_input(request.input);
    let markdown = parse_markdown(&source).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });

    let base_dir = directory_of(request.input);
    let mut resolver = FileSystemResolver::new(&base_dir);
    if let Some(root) = request.content_root {
        let url = Url::parse(root).unwrap_or_else(|e| {
            eprintln!("Error: invalid --content-root '{root}': {e}");
            std::process::exit(1);
        });
        resolver = resolver.with_content_root(url);
    }

    let mut options = config.richtext_options();
    options.base_dir = Some(base_dir);
    options.allow_network |= request.allow_network;

    let result = match request.metadata {
        Some(path) => {
            let sidecar = read_metadata(path);
            let units = split_units(&markdown, &sidecar.units);
            let mut result = to_richtext::convert_units(&units, &sidecar.module, &options, &resolver);
            if let Some(front_matter) = &markdown.front_matter {
                result
                    .document
                    .set_property(FRONT_MATTER_PROPERTY, front_matter);
            }
            result
        }
        None => to_richtext::convert(&markdown, &options, &resolver),
    };

    let json = serde_json::to_string_pretty(&result.document).unwrap_or_else(|e| {
        eprintln!("Serialization error: {e}");
        std::process::exit(1);
    });
    emit(request.output, &json);
}

fn handle_units_command(input: &str, metadata: Option<&str>) {
    let source = read_input(input);
    let markdown: MarkdownDocument = parse_markdown(&source).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });
    let sidecar = metadata.map(read_metadata).unwrap_or_default();
    let units = split_units(&markdown, &sidecar.units);

    let summaries: Vec<UnitSummary<'_>> = units
        .iter()
        .map(|unit| UnitSummary {
            title: unit.title(),
            blocks: unit.blocks.len(),
            metadata: &unit.metadata,
        })
        .collect();
    let json = serde_json::to_string_pretty(&summaries).unwrap_or_else(|e| {
        eprintln!("Serialization error: {e}");
        std::process::exit(1);
    });
    println!("{json}");
}

fn handle_list_renderers_command() {
    println!("Rich text -> Markdown:");
    for line in to_markdown::Renderers::standard().describe() {
        println!("  {line}");
    }
    println!("\nMarkdown -> rich text:");
    for line in to_richtext::Renderers::standard().describe() {
        println!("  {line}");
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn load_cli_config(explicit_path: Option<&str>) -> DocmarkConfig {
    let loader = Loader::new().with_optional_file("docmark.toml");
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

fn read_input(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    })
}

fn read_metadata(path: &str) -> MetadataFile {
    let raw = read_input(path);
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        eprintln!("Error: '{path}' is not a metadata file: {e}");
        std::process::exit(1);
    })
}

fn write_output(path: &Path, data: &[u8]) {
    fs::write(path, data).unwrap_or_else(|e| {
        eprintln!("Error writing file '{}': {e}", path.display());
        std::process::exit(1);
    });
}

fn emit(output: Option<&str>, text: &str) {
    match output {
        Some(path) => write_output(Path::new(path), text.as_bytes()),
        None => print!("{text}"),
    }
}

/// Directory containing `path`, `.` for a bare file name.
fn directory_of(path: &str) -> PathBuf {
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
