//! plistedit CLI - decode, inspect and canonicalize XML property lists.

use clap::{Parser, Subcommand};

mod commands;
mod errors;
mod input;
mod output;

use commands::{canonicalize, check, get, inspect};
use input::DecodeArgs;

#[derive(Parser)]
#[command(name = "plistedit")]
#[command(about = "Decode, inspect and canonicalize XML property lists")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical form of a property list
    Canonicalize {
        /// Input plist file (or stdin if not provided)
        input: Option<String>,
        /// Write the canonical form to FILE instead of stdout
        #[arg(long, short)]
        output: Option<String>,
        #[command(flatten)]
        decode: DecodeArgs,
    },
    /// Check whether a property list is already in canonical form
    Check {
        /// Input plist file (or stdin if not provided)
        input: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        decode: DecodeArgs,
    },
    /// List every node with its identity, kind and path
    Inspect {
        /// Input plist file (or stdin if not provided)
        input: Option<String>,
        /// Output as JSON lines
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        decode: DecodeArgs,
    },
    /// Print the node at a dotted path (e.g. `Settings.Items.[0]`)
    Get {
        /// Input plist file, or `-` for stdin
        input: String,
        /// Path of the node
        path: String,
        #[command(flatten)]
        decode: DecodeArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Canonicalize {
            input,
            output,
            decode,
        } => canonicalize::run(input, output, decode),
        Commands::Check {
            input,
            json,
            decode,
        } => check::run(input, json, decode),
        Commands::Inspect {
            input,
            json,
            decode,
        } => inspect::run(input, json, decode),
        Commands::Get {
            input,
            path,
            decode,
        } => get::run(input, path, decode),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
