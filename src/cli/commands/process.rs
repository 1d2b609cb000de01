//! `owtgeo process` command - run the fleet engine and print a table

use clap::ValueEnum;
use console::style;
use miette::Result;
use std::path::PathBuf;
use tracing::info;

use crate::cli::helpers::{load_fleet, resolve_format, rows, write_output};
use crate::cli::table::render;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::processing::owt::Owt;
use crate::processing::owts::Owts;
use crate::processing::tables::{LumpedMassRow, TubularRow};

/// Derived table to print
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableKind {
    /// Per-turbine heights and masses
    #[default]
    Summary,
    /// Tower, transition piece and monopile cans
    Tubular,
    /// RNA and point masses
    Lumped,
    /// Distributed masses and grout
    Distributed,
    Rna,
    Tower,
    TransitionPiece,
    Monopile,
    /// Transition piece above the joint and the monopile
    Substructure,
    /// Transition piece below the joint
    TpSkirt,
    /// Tower on top of the substructure
    FullStructure,
}

#[derive(clap::Args, Debug)]
pub struct ProcessArgs {
    /// Dataset file (YAML or JSON)
    pub dataset: PathBuf,

    /// Table to print
    #[arg(long, short = 't', value_enum, default_value_t = TableKind::Summary)]
    pub table: TableKind,

    /// Only this turbine
    #[arg(long)]
    pub turbine: Option<String>,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ProcessArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let format = resolve_format(global, &config);

    let mut fleet = load_fleet(&args.dataset, &config)?;
    fleet.process_structures()?;
    info!(table = ?args.table, "rendering table");

    let (content, count) = match &args.turbine {
        Some(title) => {
            let owt = fleet.select_owt(title.as_str())?;
            turbine_table(&fleet, title, owt, args.table, format)?
        }
        None => fleet_table(&fleet, args.table, format)?,
    };

    write_output(&content, args.output.clone(), global.quiet)?;
    if format == OutputFormat::Table && args.output.is_none() && !global.quiet {
        eprintln!("{} row(s)", style(count).cyan());
    }
    Ok(())
}

fn fleet_table(fleet: &Owts, table: TableKind, format: OutputFormat) -> Result<(String, usize)> {
    macro_rules! out {
        ($rows:expr) => {{
            let table_rows = $rows;
            (render(table_rows, format)?, table_rows.len())
        }};
    }
    Ok(match table {
        TableKind::Summary => out!(fleet.all_turbines().into_inner()),
        TableKind::Tubular => out!(rows(fleet.all_tubular_structures())),
        TableKind::Lumped => out!(rows(fleet.all_lumped_mass())),
        TableKind::Distributed => out!(rows(fleet.all_distributed_mass())),
        TableKind::Rna => out!(rows(fleet.rna())),
        TableKind::Tower => out!(rows(fleet.tower())),
        TableKind::TransitionPiece => out!(rows(fleet.transition_piece())),
        TableKind::Monopile => out!(rows(fleet.monopile())),
        TableKind::Substructure => out!(rows(fleet.substructure())),
        TableKind::TpSkirt => out!(rows(fleet.tp_skirt())),
        TableKind::FullStructure => out!(rows(fleet.full_structure())),
    })
}

fn turbine_table(
    fleet: &Owts,
    title: &str,
    owt: &Owt,
    table: TableKind,
    format: OutputFormat,
) -> Result<(String, usize)> {
    macro_rules! out {
        ($rows:expr) => {{
            let table_rows = $rows;
            (render(table_rows, format)?, table_rows.len())
        }};
    }
    let t = owt.tables();
    Ok(match table {
        TableKind::Summary => {
            let summary: Vec<_> = fleet
                .all_turbines()
                .into_inner()
                .iter()
                .filter(|s| s.turbine == title)
                .cloned()
                .collect();
            out!(summary.as_slice())
        }
        TableKind::Tubular => {
            let cans: Vec<TubularRow> = [&t.tower, &t.transition_piece, &t.monopile]
                .into_iter()
                .flatten()
                .flatten()
                .cloned()
                .collect();
            out!(cans.as_slice())
        }
        TableKind::Lumped => {
            let mut masses: Vec<LumpedMassRow> = t.rna.iter().flatten().map(LumpedMassRow::from).collect();
            masses.extend(
                [&t.tw_lumped_mass, &t.tp_lumped_mass, &t.mp_lumped_mass]
                    .into_iter()
                    .flatten()
                    .flatten()
                    .cloned(),
            );
            out!(masses.as_slice())
        }
        TableKind::Distributed => {
            let masses: Vec<_> = [&t.tp_distributed_mass, &t.grout, &t.mp_distributed_mass]
                .into_iter()
                .flatten()
                .flatten()
                .cloned()
                .collect();
            out!(masses.as_slice())
        }
        TableKind::Rna => out!(rows(owt.rna())),
        TableKind::Tower => out!(rows(owt.tower())),
        TableKind::TransitionPiece => out!(rows(owt.transition_piece())),
        TableKind::Monopile => out!(rows(owt.monopile())),
        TableKind::Substructure => out!(rows(owt.substructure())),
        TableKind::TpSkirt => out!(rows(owt.tp_skirt())),
        TableKind::FullStructure => out!(rows(owt.full_structure())),
    })
}
