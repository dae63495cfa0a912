//! mdtree CLI - markdown to structured node trees.
//!
//! Provides commands for:
//! - `render`: Render markdown into a node tree (JSON) or HTML
//! - `tokens`: Print the block token stream and link table

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{RenderArgs, TokensArgs};
use output::Output;

/// mdtree - markdown to structured node trees.
#[derive(Parser)]
#[command(name = "mdtree", version, about)]
struct Cli {
    /// Enable verbose output (debug logging to stderr).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render markdown into a node tree.
    Render(RenderArgs),
    /// Print the block token stream and link reference table.
    Tokens(TokensArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(&output),
        Commands::Tokens(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
