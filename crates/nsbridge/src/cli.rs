//! Command line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// nsbridge: serves namespace content summaries as XML over HTTP.
#[derive(Parser)]
#[command(name = "nsbridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the server.
    Serve(ServeArgs),
    /// Fetch a content summary from a running server.
    Fetch(FetchArgs),
    /// Print version information.
    Version,
}

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Path to configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Bind address (overrides config).
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Metadata service base URL (overrides config).
    #[arg(short, long)]
    pub metadata_endpoint: Option<String>,

    /// Serve from an in-memory namespace holding only an empty root.
    ///
    /// Useful for local development without a metadata service.
    #[arg(long)]
    pub memory: bool,
}

/// Arguments for the fetch command.
#[derive(Args)]
pub struct FetchArgs {
    /// Address of the bridge.
    #[arg(short, long, default_value = "http://127.0.0.1:50070")]
    pub endpoint: String,

    /// Identity to act as, in `user,group,...` form.
    #[arg(short, long)]
    pub ugi: Option<String>,

    /// Output format (text, json).
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Namespace path to summarize.
    #[arg(default_value = "/")]
    pub path: String,
}

/// Output format for CLI commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
