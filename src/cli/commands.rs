use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lb", about = concat!("laneboard v", env!("CARGO_PKG_VERSION"), " - markdown kanban boards"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Read parser markers (labels, triggers) from a TOML file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the parsed board as JSON
    Show(ShowArgs),
    /// Print the board in canonical form
    Fmt(FmtArgs),
    /// Report recoverable problems found in a board
    Check(CheckArgs),
}

#[derive(Args)]
pub struct ShowArgs {
    /// Board file, or - for stdin
    pub file: String,
    /// Skip date/time resolution and search text
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args)]
pub struct FmtArgs {
    /// Board file, or - for stdin
    pub file: String,
    /// Exit non-zero instead of printing when the file is not canonical
    #[arg(long)]
    pub check: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Board file, or - for stdin
    pub file: String,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
