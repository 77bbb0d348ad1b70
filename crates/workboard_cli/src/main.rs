//! Command-line entry point for the workboard core.
//!
//! # Responsibility
//! - Expose the markdown codec and slash catalog for local inspection.
//! - Keep output deterministic so it can be diffed in scripts.

use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use workboard_core::markdown::normalize;
use workboard_core::{core_version, filter_commands, init_logging, parse, ping, Document};

#[derive(Parser)]
#[command(name = "workboard", version, about = "Workboard document utilities")]
struct Cli {
    /// Write rolling logs into this absolute directory
    #[arg(long, value_name = "DIR")]
    log_dir: Option<String>,

    /// Log level: trace|debug|info|warn|error (default depends on build)
    #[arg(long, requires = "log_dir")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-emit markdown in its canonical form
    Normalize(InputArgs),
    /// Print parsed blocks as JSON
    Blocks(BlocksArgs),
    /// List slash commands, optionally filtered
    Commands(CommandsArgs),
    /// Print the core crate version
    Version,
}

#[derive(Parser)]
struct InputArgs {
    /// Markdown file to read (default: stdin)
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,
}

#[derive(Parser)]
struct BlocksArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Parser)]
struct CommandsArgs {
    /// Filter text matched against labels and keywords
    #[arg(value_name = "QUERY", default_value = "")]
    query: String,

    /// Show Indonesian labels and descriptions
    #[arg(long)]
    localized: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or_else(|| workboard_core::default_log_level());
        init_logging(level, log_dir)?;
    }

    match cli.command {
        Commands::Normalize(args) => {
            let text = read_input(&args)?;
            println!("{}", normalize(&text));
        }
        Commands::Blocks(args) => {
            let text = read_input(&args.input)?;
            let document = Document::try_from(parse(&text)).map_err(str::to_string)?;
            let json = if args.pretty {
                serde_json::to_string_pretty(&document)
            } else {
                serde_json::to_string(&document)
            }
            .map_err(|err| format!("failed to encode blocks: {err}"))?;
            println!("{json}");
        }
        Commands::Commands(args) => {
            for command in filter_commands(&args.query) {
                let (label, description) = if args.localized {
                    (command.label_localized, command.description_localized)
                } else {
                    (command.label, command.description)
                };
                println!("{:<16} {:<18} {description}", command.id.as_str(), label);
            }
        }
        Commands::Version => {
            println!("workboard_core ping={}", ping());
            println!("workboard_core version={}", core_version());
        }
    }
    Ok(())
}

fn read_input(args: &InputArgs) -> Result<String, String> {
    match &args.path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|err| format!("failed to read `{}`: {err}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|err| format!("failed to read stdin: {err}"))?;
            Ok(text)
        }
    }
}
