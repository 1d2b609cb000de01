//! `owtgeo pile` command - monopile geometry from the mudline

use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{load_turbine, resolve_format, write_output};
use crate::cli::table::render;
use crate::cli::GlobalOpts;
use crate::core::config::Config;

#[derive(clap::Args, Debug)]
pub struct PileArgs {
    /// Dataset file (YAML or JSON)
    pub dataset: PathBuf,

    /// Turbine title
    #[arg(long)]
    pub turbine: String,

    /// Drop the pile above this depth below mudline, m
    #[arg(long, allow_negative_numbers = true)]
    pub cutoff: Option<f64>,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: PileArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let format = resolve_format(global, &config);
    let owt = load_turbine(&args.dataset, &args.turbine, &config)?;

    let pile = owt.transform_monopile_geometry(args.cutoff)?;
    let content = render(&pile, format)?;
    write_output(&content, args.output, global.quiet)
}
