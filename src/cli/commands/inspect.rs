//! `owtgeo inspect` command - subassembly summary of one turbine

use miette::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::helpers::{load_turbine, resolve_format, write_output};
use crate::cli::table::render;
use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::units::{round_to, KG_TO_T, MM_TO_M};
use crate::entities::subassembly::SubAssembly;
use crate::processing::tables::{num, opt, TableRow};

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// Dataset file (YAML or JSON)
    pub dataset: PathBuf,

    /// Turbine title
    #[arg(long)]
    pub turbine: String,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// One subassembly of the inspected turbine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectRow {
    #[serde(rename = "Kind")]
    pub kind: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Building blocks")]
    pub blocks: usize,
    #[serde(rename = "Height [m]")]
    pub height: f64,
    #[serde(rename = "Mass [t]")]
    pub mass: f64,
    #[serde(rename = "Bottom [mLAT]")]
    pub bottom: f64,
    #[serde(rename = "Top [mLAT]")]
    pub top: Option<f64>,
}

impl InspectRow {
    pub fn from_subassembly(sa: &SubAssembly) -> crate::core::error::Result<Self> {
        let props = sa.properties()?;
        Ok(Self {
            kind: sa.kind.name().to_string(),
            title: sa.title.clone(),
            blocks: sa.building_blocks()?.len(),
            height: round_to(props.height * MM_TO_M, 3),
            mass: round_to(props.mass * KG_TO_T, 2),
            bottom: sa.absolute_bottom()?,
            top: sa.absolute_top().ok(),
        })
    }
}

impl TableRow for InspectRow {
    fn headers() -> Vec<&'static str> {
        vec![
            "Kind",
            "Title",
            "Building blocks",
            "Height [m]",
            "Mass [t]",
            "Bottom [mLAT]",
            "Top [mLAT]",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.kind.clone(),
            self.title.clone(),
            self.blocks.to_string(),
            num(self.height),
            num(self.mass),
            num(self.bottom),
            opt(self.top),
        ]
    }
}

pub fn run(args: InspectArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let format = resolve_format(global, &config);
    let owt = load_turbine(&args.dataset, &args.turbine, &config)?;

    let rows = owt
        .sub_assemblies()
        .values()
        .map(InspectRow::from_subassembly)
        .collect::<crate::core::error::Result<Vec<_>>>()?;

    let mut content = render(&rows, format)?;
    if format == crate::cli::OutputFormat::Table {
        content.push_str(&format!(
            "Tower base {} mLAT, pile head {} mLAT, water depth {} mLAT\n",
            opt(owt.tower_base),
            opt(owt.pile_head),
            num(owt.water_depth)
        ));
    }
    write_output(&content, args.output, global.quiet)
}
