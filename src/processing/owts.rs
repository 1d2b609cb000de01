//! Fleet geometry engine
//!
//! [`Owts`] owns one [`Owt`] per turbine, processes them in input order and
//! concatenates their tables. Every fleet row carries the title of the
//! turbine it came from. The per-turbine summary ([`TurbineSummary`]) totals
//! heights and masses per structural section.
//!
//! Fleet tables are built once; [`Owts::process_structures`] is a no-op on a
//! fleet that has already been processed.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::core::error::{GeometryError, Result};
use crate::core::units::round_to;
use crate::entities::building_block::BlockRow;
use crate::entities::material::Material;
use crate::entities::subassembly::SubAssemblyType;
use crate::processing::owt::{DerivedTables, Owt, ProcessOption};
use crate::processing::stage::Staged;
use crate::processing::tables::{
    label, DistributedMassRow, FleetRow, LumpedMassRow, RnaRow, TubularRow, TurbineSummary,
};

/// A turbine picked by title or by its position in the input list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurbineRef {
    Title(String),
    Index(usize),
}

impl From<&str> for TurbineRef {
    fn from(title: &str) -> Self {
        TurbineRef::Title(title.to_string())
    }
}

impl From<String> for TurbineRef {
    fn from(title: String) -> Self {
        TurbineRef::Title(title)
    }
}

impl From<usize> for TurbineRef {
    fn from(index: usize) -> Self {
        TurbineRef::Index(index)
    }
}

impl fmt::Display for TurbineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurbineRef::Title(title) => write!(f, "'{}'", title),
            TurbineRef::Index(index) => write!(f, "#{}", index),
        }
    }
}

/// Concatenated tables of a processed fleet
///
/// A table is `None` when no turbine produced it.
#[derive(Debug, Clone, Default)]
pub struct FleetTables {
    pub rna: Option<Vec<FleetRow<RnaRow>>>,
    pub tower: Option<Vec<FleetRow<TubularRow>>>,
    pub transition_piece: Option<Vec<FleetRow<TubularRow>>>,
    pub monopile: Option<Vec<FleetRow<TubularRow>>>,
    pub tw_lumped_mass: Option<Vec<FleetRow<LumpedMassRow>>>,
    pub tp_lumped_mass: Option<Vec<FleetRow<LumpedMassRow>>>,
    pub mp_lumped_mass: Option<Vec<FleetRow<LumpedMassRow>>>,
    pub tp_distributed_mass: Option<Vec<FleetRow<DistributedMassRow>>>,
    pub mp_distributed_mass: Option<Vec<FleetRow<DistributedMassRow>>>,
    pub grout: Option<Vec<FleetRow<DistributedMassRow>>>,
    pub full_structure: Option<Vec<FleetRow<TubularRow>>>,
    pub tp_skirt: Option<Vec<FleetRow<TubularRow>>>,
    pub substructure: Option<Vec<FleetRow<TubularRow>>>,
    /// Tower, transition piece and monopile cans
    pub all_tubular_structures: Option<Vec<FleetRow<TubularRow>>>,
    /// Transition piece masses, grout and monopile masses
    pub all_distributed_mass: Option<Vec<FleetRow<DistributedMassRow>>>,
    /// RNA, then tower, transition piece and monopile point masses
    pub all_lumped_mass: Option<Vec<FleetRow<LumpedMassRow>>>,
    pub all_turbines: Vec<TurbineSummary>,
}

impl FleetTables {
    fn collect(&mut self, turbine: &str, t: &DerivedTables) {
        gather(&mut self.rna, turbine, t.rna.as_deref());
        gather(&mut self.tower, turbine, t.tower.as_deref());
        gather(&mut self.transition_piece, turbine, t.transition_piece.as_deref());
        gather(&mut self.monopile, turbine, t.monopile.as_deref());
        gather(&mut self.tw_lumped_mass, turbine, t.tw_lumped_mass.as_deref());
        gather(&mut self.tp_lumped_mass, turbine, t.tp_lumped_mass.as_deref());
        gather(&mut self.mp_lumped_mass, turbine, t.mp_lumped_mass.as_deref());
        gather(&mut self.tp_distributed_mass, turbine, t.tp_distributed_mass.as_deref());
        gather(&mut self.mp_distributed_mass, turbine, t.mp_distributed_mass.as_deref());
        gather(&mut self.grout, turbine, t.grout.as_deref());
        gather(&mut self.full_structure, turbine, t.full_structure.as_deref());
        gather(&mut self.tp_skirt, turbine, t.tp_skirt.as_deref());
        gather(&mut self.substructure, turbine, t.substructure.as_deref());

        for rows in [&t.tower, &t.transition_piece, &t.monopile] {
            gather(&mut self.all_tubular_structures, turbine, rows.as_deref());
        }
        for rows in [&t.tp_distributed_mass, &t.grout, &t.mp_distributed_mass] {
            gather(&mut self.all_distributed_mass, turbine, rows.as_deref());
        }
        let rna: Option<Vec<LumpedMassRow>> = t
            .rna
            .as_ref()
            .map(|rows| rows.iter().map(LumpedMassRow::from).collect());
        for rows in [&rna, &t.tw_lumped_mass, &t.tp_lumped_mass, &t.mp_lumped_mass] {
            gather(&mut self.all_lumped_mass, turbine, rows.as_deref());
        }
    }
}

fn gather<R: Clone>(acc: &mut Option<Vec<FleetRow<R>>>, turbine: &str, rows: Option<&[R]>) {
    if let Some(rows) = rows {
        acc.get_or_insert_with(Vec::new).extend(label(turbine, rows));
    }
}

fn total<R>(rows: &Option<Vec<R>>, value: impl Fn(&R) -> f64) -> f64 {
    rows.iter().flatten().map(value).sum()
}

fn summarize(turbine: &str, owt: &Owt) -> TurbineSummary {
    let t = owt.tables();
    let round = |v: f64| round_to(v, 2);
    let section = |rows: &Option<Vec<TubularRow>>, extra: f64| {
        rows.as_ref().map(|_| {
            (
                round(total(rows, |r| r.height)),
                round(total(rows, |r| r.mass) + extra),
            )
        })
    };

    let monopile = section(
        &t.monopile,
        total(&t.mp_distributed_mass, |r| r.mass) + total(&t.mp_lumped_mass, |r| r.mass),
    );
    let transition_piece = section(
        &t.transition_piece,
        total(&t.tp_distributed_mass, |r| r.mass)
            + total(&t.tp_lumped_mass, |r| r.mass)
            + total(&t.grout, |r| r.mass),
    );
    let tower = section(&t.tower, total(&t.tw_lumped_mass, |r| r.mass));

    TurbineSummary {
        turbine: turbine.to_string(),
        water_depth: round(owt.water_depth),
        monopile_toe: t.pile_toe.map(round),
        monopile_head: owt.pile_head.map(round),
        tower_base: owt.tower_base.map(round),
        monopile_height: monopile.map(|(h, _)| h),
        monopile_mass: monopile.map(|(_, m)| m),
        transition_piece_height: transition_piece.map(|(h, _)| h),
        transition_piece_mass: transition_piece.map(|(_, m)| m),
        tower_height: tower.map(|(h, _)| h),
        tower_mass: tower.map(|(_, m)| m),
        rna_mass: t.rna.as_ref().map(|_| round(total(&t.rna, |r| r.mass))),
    }
}

/// Geometry engine of a fleet of turbines
#[derive(Debug)]
pub struct Owts {
    owts: IndexMap<String, Owt>,
    pub tower_base: IndexMap<String, Option<f64>>,
    pub pile_head: IndexMap<String, Option<f64>>,
    pub water_depth: IndexMap<String, f64>,
    /// Structural kinds present per turbine
    pub sub_assemblies: IndexMap<String, Vec<SubAssemblyType>>,
    tw_sub_assemblies: Option<Vec<FleetRow<BlockRow>>>,
    tp_sub_assemblies: Option<Vec<FleetRow<BlockRow>>>,
    mp_sub_assemblies: Option<Vec<FleetRow<BlockRow>>>,
    pile_toe: IndexMap<String, Option<f64>>,
    tables: FleetTables,
    initialized: bool,
}

macro_rules! fleet_tables {
    ($($name:ident: $row:ty),* $(,)?) => {
        $(
            pub fn $name(&self) -> Staged<Option<&[FleetRow<$row>]>> {
                self.staged(stringify!($name), self.tables.$name.as_deref())
            }
        )*
    };
}

impl Owts {
    /// Pair turbine titles with their engines, in input order
    pub fn new(turbines: Vec<String>, owts: Vec<Owt>) -> Result<Self> {
        if turbines.is_empty() {
            return Err(GeometryError::missing("no turbines supplied"));
        }
        if turbines.len() != owts.len() {
            return Err(GeometryError::missing(format!(
                "{} turbine titles given for {} turbines",
                turbines.len(),
                owts.len()
            )));
        }

        let mut map = IndexMap::with_capacity(owts.len());
        for (title, owt) in turbines.into_iter().zip(owts) {
            if map.contains_key(&title) {
                return Err(GeometryError::DuplicateTurbine(title));
            }
            map.insert(title, owt);
        }

        let mut fleet = Self {
            tower_base: map.iter().map(|(k, o)| (k.clone(), o.tower_base)).collect(),
            pile_head: map.iter().map(|(k, o)| (k.clone(), o.pile_head)).collect(),
            water_depth: map.iter().map(|(k, o)| (k.clone(), o.water_depth)).collect(),
            sub_assemblies: map
                .iter()
                .map(|(k, o)| (k.clone(), o.sub_assemblies().keys().copied().collect()))
                .collect(),
            tw_sub_assemblies: None,
            tp_sub_assemblies: None,
            mp_sub_assemblies: None,
            pile_toe: IndexMap::new(),
            tables: FleetTables::default(),
            initialized: false,
            owts: map,
        };
        for kind in SubAssemblyType::ALL {
            let mut rows = None;
            for (title, owt) in &fleet.owts {
                gather(&mut rows, title, owt.block_table(kind));
            }
            match kind {
                SubAssemblyType::Tw => fleet.tw_sub_assemblies = rows,
                SubAssemblyType::Tp => fleet.tp_sub_assemblies = rows,
                SubAssemblyType::Mp => fleet.mp_sub_assemblies = rows,
            }
        }
        Ok(fleet)
    }

    /// Turbine titles in input order
    pub fn turbines(&self) -> impl Iterator<Item = &str> {
        self.owts.keys().map(String::as_str)
    }

    pub fn owts(&self) -> &IndexMap<String, Owt> {
        &self.owts
    }

    /// Materials of the first turbine
    pub fn materials(&self) -> &[Arc<Material>] {
        self.owts
            .first()
            .map(|(_, owt)| owt.materials())
            .unwrap_or_default()
    }

    pub fn is_processed(&self) -> bool {
        self.initialized
    }

    /// Building-block table of one kind across the fleet
    pub fn sub_assembly_table(&self, kind: SubAssemblyType) -> Option<&[FleetRow<BlockRow>]> {
        match kind {
            SubAssemblyType::Tw => self.tw_sub_assemblies.as_deref(),
            SubAssemblyType::Tp => self.tp_sub_assemblies.as_deref(),
            SubAssemblyType::Mp => self.mp_sub_assemblies.as_deref(),
        }
    }

    /// Process every turbine and build the fleet tables
    ///
    /// A turbine with all three sections is processed in full; otherwise each
    /// section it has is processed on its own. The first failing turbine
    /// aborts the run and leaves the fleet unprocessed.
    pub fn process_structures(&mut self) -> Result<()> {
        if self.initialized {
            debug!("fleet already processed");
            return Ok(());
        }
        info!(turbines = self.owts.len(), "processing fleet structures");

        let mut tables = FleetTables::default();
        let mut pile_toe = IndexMap::with_capacity(self.owts.len());
        for (title, owt) in self.owts.iter_mut() {
            if let Err(err) = process_turbine(owt) {
                error!(turbine = %title, error = %err, "turbine processing failed");
                return Err(err);
            }
            pile_toe.insert(title.clone(), owt.tables().pile_toe);
            tables.collect(title, owt.tables());
        }
        tables.all_turbines = self
            .owts
            .iter()
            .map(|(title, owt)| summarize(title, owt))
            .collect();

        self.pile_toe = pile_toe;
        self.tables = tables;
        self.initialized = true;
        Ok(())
    }

    /// One turbine, by title or by position in the input list
    pub fn select_owt(&self, turbine: impl Into<TurbineRef>) -> Result<&Owt> {
        let turbine = turbine.into();
        let found = match &turbine {
            TurbineRef::Title(title) => self.owts.get(title),
            TurbineRef::Index(index) => self.owts.get_index(*index).map(|(_, owt)| owt),
        };
        found.ok_or_else(|| GeometryError::UnknownTurbine(turbine.to_string()))
    }

    /// All fleet tables regardless of processing
    pub fn tables(&self) -> &FleetTables {
        &self.tables
    }

    fn staged<T>(&self, name: &str, value: T) -> Staged<T> {
        Staged::guard(name, self.initialized, "process_structures()", value)
    }

    pub fn pile_toe(&self) -> Staged<&IndexMap<String, Option<f64>>> {
        self.staged("pile_toe", &self.pile_toe)
    }

    pub fn all_turbines(&self) -> Staged<&[TurbineSummary]> {
        self.staged("all_turbines", self.tables.all_turbines.as_slice())
    }

    fleet_tables! {
        rna: RnaRow,
        tower: TubularRow,
        transition_piece: TubularRow,
        monopile: TubularRow,
        tw_lumped_mass: LumpedMassRow,
        tp_lumped_mass: LumpedMassRow,
        mp_lumped_mass: LumpedMassRow,
        tp_distributed_mass: DistributedMassRow,
        mp_distributed_mass: DistributedMassRow,
        grout: DistributedMassRow,
        full_structure: TubularRow,
        tp_skirt: TubularRow,
        substructure: TubularRow,
        all_tubular_structures: TubularRow,
        all_distributed_mass: DistributedMassRow,
        all_lumped_mass: LumpedMassRow,
    }
}

fn process_turbine(owt: &mut Owt) -> Result<()> {
    let kinds: Vec<SubAssemblyType> = owt.sub_assemblies().keys().copied().collect();
    if kinds.len() == SubAssemblyType::ALL.len() {
        owt.process_structure(ProcessOption::Full)?;
    } else {
        for kind in kinds {
            owt.process_structure(ProcessOption::Only(kind))?;
        }
    }
    owt.extend_dfs()
}
