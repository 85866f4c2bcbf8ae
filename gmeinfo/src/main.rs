//! gmeinfo — inspect a Game Music Emu build.
//!
//! Lists the formats the linked `gme-formats` build supports and identifies
//! music files by header signature and extension.

mod formats;
mod identify;
mod inputs;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gmeinfo", version, about)]
struct Cli {
    /// Increase diagnostic output (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List formats compiled into this build.
    Formats(FormatsArgs),

    /// Identify music files and check whether this build can play them.
    Identify(IdentifyArgs),
}

/// Arguments for the `formats` subcommand.
#[derive(Parser, Debug)]
pub struct FormatsArgs {
    /// Also list formats that were not compiled in.
    #[arg(short, long)]
    pub all: bool,

    /// Print the generated gme_types.h instead of a table.
    #[arg(long, conflicts_with = "json")]
    pub header: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `identify` subcommand.
#[derive(Parser, Debug)]
pub struct IdentifyArgs {
    /// Input files, directories or glob patterns.
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Only consider these formats (comma separated), e.g. `nsf,nsfe`.
    #[arg(long, env = "GMEINFO_ONLY", value_delimiter = ',')]
    pub only: Vec<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Formats(args) => formats::run(args),
        Command::Identify(args) => identify::run(args),
    }
}
