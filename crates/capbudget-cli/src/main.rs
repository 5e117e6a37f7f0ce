mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::appraisal::AppraiseArgs;
use commands::comparison::CompareArgs;

/// Capital budgeting appraisal of investment alternatives
#[derive(Parser)]
#[command(
    name = "cba",
    version,
    about = "Capital budgeting appraisal of investment alternatives",
    long_about = "A CLI for appraising investment alternatives with decimal precision. \
                  Computes NPV, IRR, and discounted payback for a cash-flow series, and \
                  compares two alternatives metric by metric."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Appraise a single cash-flow series (NPV, IRR, payback)
    Appraise(AppraiseArgs),
    /// Compare two alternatives metric by metric
    Compare(CompareArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Appraise(args) => commands::appraisal::run_appraise(args),
        Commands::Compare(args) => commands::comparison::run_compare(args),
        Commands::Version => {
            println!("cba {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
