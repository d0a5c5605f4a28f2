//! `mireport` command-line converter

use clap::{value_parser, Arg, ArgAction, Command};
use mireport_cli::{describe, load_profile, load_taxonomy, run_convert, Outcome, EXIT_FAILURE, EXIT_OK};
use mireport_taxonomy::TaxonomyCache;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn taxonomy_arg() -> Arg {
    Arg::new("taxonomy")
        .long("taxonomy")
        .short('t')
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Taxonomy snapshot (JSON or YAML)")
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print(value: serde_json::Result<serde_json::Value>) -> i32 {
    match value.and_then(|v| serde_json::to_string_pretty(&v)) {
        Ok(text) => {
            println!("{text}");
            EXIT_OK
        }
        Err(e) => {
            tracing::error!("Failed to render output: {e}");
            EXIT_FAILURE
        }
    }
}

fn main() {
    let cli = Command::new("mireport")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Resolve named values into taxonomy-conformant report facts")
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Write logs to stderr as JSON lines"),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a workbook or structured document into a report")
                .arg(taxonomy_arg())
                .arg(
                    Arg::new("profile")
                        .long("profile")
                        .short('p')
                        .value_parser(value_parser!(PathBuf))
                        .help("Conversion profile (JSON or YAML)"),
                )
                .arg(
                    Arg::new("input")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Input document, or - for JSON on standard input"),
                ),
        )
        .subcommand(
            Command::new("taxonomy")
                .about("Summarise a taxonomy snapshot or show one concept")
                .arg(taxonomy_arg())
                .arg(Arg::new("concept").help("Concept name or label")),
        );

    let matches = cli.get_matches();
    let log_json = matches
        .subcommand()
        .map_or_else(|| matches.get_flag("log-json"), |(_, sub)| sub.get_flag("log-json"));
    init_logging(log_json);
    let cache = TaxonomyCache::new();

    let code = match matches.subcommand() {
        Some(("convert", args)) => {
            let (Some(taxonomy), Some(input)) = (args.get_one::<PathBuf>("taxonomy"), args.get_one::<PathBuf>("input"))
            else {
                std::process::exit(EXIT_FAILURE);
            };
            let profile = args.get_one::<PathBuf>("profile");

            let outcome = load_taxonomy(&cache, taxonomy)
                .and_then(|t| load_profile(profile.map(PathBuf::as_path)).map(|p| (t, p)))
                .and_then(|(t, p)| run_convert(t, p, input));
            match outcome {
                Ok(outcome) => {
                    if let Outcome::Incomplete { reasons, .. } = &outcome {
                        tracing::error!("Report is incomplete: {}", reasons.join("; "));
                    }
                    match print(outcome.to_json()) {
                        EXIT_OK => outcome.exit_code(),
                        failed => failed,
                    }
                }
                Err(e) => {
                    tracing::error!("{e:#}");
                    EXIT_FAILURE
                }
            }
        }
        Some(("taxonomy", args)) => {
            let Some(taxonomy) = args.get_one::<PathBuf>("taxonomy") else {
                std::process::exit(EXIT_FAILURE);
            };
            let concept = args.get_one::<String>("concept").map(String::as_str);
            match load_taxonomy(&cache, taxonomy).and_then(|t| describe(&t, concept)) {
                Ok(value) => print(Ok(value)),
                Err(e) => {
                    tracing::error!("{e:#}");
                    EXIT_FAILURE
                }
            }
        }
        _ => EXIT_OK,
    };

    std::process::exit(code);
}
