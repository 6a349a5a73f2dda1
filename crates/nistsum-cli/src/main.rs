//! CLI for nistsum — NIST randomness report parsing and summarization.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nistsum")]
#[command(about = "nistsum — parse NIST SP 800-22 / SP 800-90B output into summaries")]
#[command(version = nistsum_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse individual NIST output files into JSON, CSV, or console text
    Parse {
        /// NIST output files to parse (battery reports or consolidated
        /// entropy assessments, chosen by filename)
        #[arg(required = true)]
        files: Vec<String>,

        /// Output format
        #[arg(long, default_value = "json", value_parser = ["json", "csv", "pretty"])]
        format: String,

        /// Output file (default: stdout; CSV with multiple inputs writes
        /// one numbered file per input)
        #[arg(long, short)]
        output: Option<String>,

        /// Merge multiple files into a single output document
        #[arg(long)]
        merge: bool,
    },

    /// Walk an evaluation tree, write summary.json per test directory and
    /// MASTER_SUMMARY.json at the root
    Summarize {
        /// Root directory of the evaluation results
        root: String,

        /// Skip hashing sample .bin artifacts into summaries
        #[arg(long)]
        no_checksums: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            files,
            format,
            output,
            merge,
        } => commands::parse::run(&files, &format, output.as_deref(), merge),
        Commands::Summarize { root, no_checksums } => {
            commands::summarize::run(&root, !no_checksums)
        }
    }
}
