//! tagmark CLI - render markup tags with embedded markdown.
//!
//! Provides commands for:
//! - `render`: Render a document to HTML
//! - `parse`: Print the parsed document tree as JSON

mod alias;
mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ParseArgs, RenderArgs};
use output::Output;

/// tagmark - markup components with embedded markdown.
#[derive(Parser)]
#[command(name = "tagmark", version, about)]
struct Cli {
    /// Enable verbose output (debug logs for parsing and component lookup).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a document to HTML.
    Render(RenderArgs),
    /// Print the parsed document tree as JSON.
    Parse(ParseArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Parse(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsStr;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_config_reads_environment() {
        let cli = Cli::command();
        let render = cli.find_subcommand("render").unwrap();
        let config = render
            .get_arguments()
            .find(|arg| arg.get_id() == "config")
            .unwrap();
        assert_eq!(config.get_env(), Some(OsStr::new("TAGMARK_CONFIG")));
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["tagmark", "parse", "doc.tm", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Parse(_)));
    }
}
