//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{inspect::InspectArgs, pile::PileArgs, process::ProcessArgs};

#[derive(Parser)]
#[command(name = "owtgeo")]
#[command(author, version, about = "Offshore wind turbine support-structure geometry")]
#[command(
    long_about = "Re-references tower, transition piece and monopile building blocks to mLAT, joins them into one structure and summarises a fleet of turbines."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format (default: from config, else table)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Only log errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Log processing steps
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process a dataset and print one of the derived tables
    Process(ProcessArgs),

    /// Summarise the subassemblies of one turbine
    Inspect(InspectArgs),

    /// Monopile geometry measured from the mudline
    Pile(PileArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Boxed table for the terminal
    #[default]
    #[value(alias = "auto")]
    Table,
    /// Markdown tables
    Md,
    /// CSV format (for spreadsheets)
    Csv,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
}
