//! Single-turbine geometry engine
//!
//! An [`Owt`] takes the tower (TW), transition piece (TP) and monopile (MP)
//! of one turbine and re-references their building blocks to mLAT. Processing
//! runs in stages:
//!
//! 1. [`Owt::process_structure`] derives the can, RNA and appurtenance tables
//! 2. [`Owt::assembly_tp_mp`] joins the transition piece to the monopile at the pile head
//! 3. [`Owt::assembly_full_structure`] stacks the tower on the substructure
//!
//! [`Owt::extend_dfs`] tags every table with its subassembly and runs steps 2
//! and 3 for whatever sections are present.
//!
//! Reading a table before its stage has run is allowed: the accessor returns
//! [`Staged::NotYetProcessed`] and logs a warning.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::error::{GeometryError, Result};
use crate::core::source::BuildingBlockSource;
use crate::core::units::{round_to, KG_TO_T, MM_TO_M};
use crate::entities::building_block::{BlockKind, BlockRow};
use crate::entities::location::LocationRecord;
use crate::entities::material::{Material, MaterialRecord};
use crate::entities::subassembly::{SubAssembly, SubAssemblyRecord, SubAssemblyType};
use crate::processing::can::{can_modification, CanEnd};
use crate::processing::stage::{Stage, Staged};
use crate::processing::tables::{
    tag_rows, AppurtenanceRow, DistributedMassRow, LumpedMassRow, PileRow, RnaRow, StructureRow,
    TubularRow,
};

/// Young's modulus used for every can unless configured otherwise, GPa
pub const DEFAULT_YOUNGS_MODULUS_GPA: f64 = 210.0;

/// Poisson ratio used for every can unless configured otherwise
pub const DEFAULT_POISSONS_RATIO: f64 = 0.3;

/// Where the elastic constants of the can tables come from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SectionProperties {
    /// Same constants for every can
    Fixed {
        youngs_modulus_gpa: f64,
        poissons_ratio: f64,
    },
    /// Each can's own material
    #[serde(rename = "material")]
    FromMaterial,
}

impl Default for SectionProperties {
    fn default() -> Self {
        SectionProperties::Fixed {
            youngs_modulus_gpa: DEFAULT_YOUNGS_MODULUS_GPA,
            poissons_ratio: DEFAULT_POISSONS_RATIO,
        }
    }
}

/// Structural stack selected by [`Owt::set_df_structure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureIndex {
    Tw,
    Tp,
    Mp,
}

impl StructureIndex {
    pub fn kind(&self) -> SubAssemblyType {
        match self {
            StructureIndex::Tw => SubAssemblyType::Tw,
            StructureIndex::Tp => SubAssemblyType::Tp,
            StructureIndex::Mp => SubAssemblyType::Mp,
        }
    }
}

impl std::str::FromStr for StructureIndex {
    type Err = GeometryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tw" => Ok(StructureIndex::Tw),
            "tp" => Ok(StructureIndex::Tp),
            "mp" => Ok(StructureIndex::Mp),
            _ => Err(GeometryError::classification(format!("unknown structure index '{}'", s))),
        }
    }
}

/// Group of distributed masses selected by [`Owt::set_df_distributed_appurtenances`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributedGroup {
    /// Transition piece masses other than grout
    Tp,
    Mp,
    /// Grout in the transition piece
    Grout,
}

impl std::str::FromStr for DistributedGroup {
    type Err = GeometryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tp" => Ok(DistributedGroup::Tp),
            "mp" => Ok(DistributedGroup::Mp),
            "grout" => Ok(DistributedGroup::Grout),
            _ => Err(GeometryError::classification(format!(
                "unknown index '{}', distributed masses exist only for TP, MP and grout",
                s
            ))),
        }
    }
}

/// What [`Owt::process_structure`] should process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessOption {
    #[default]
    Full,
    Only(SubAssemblyType),
}

impl std::str::FromStr for ProcessOption {
    type Err = GeometryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("full") {
            Ok(ProcessOption::Full)
        } else {
            s.parse().map(ProcessOption::Only)
        }
    }
}

impl fmt::Display for ProcessOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessOption::Full => write!(f, "full"),
            ProcessOption::Only(kind) => write!(f, "{}", kind),
        }
    }
}

/// Reference elevations of a turbine, mLAT
///
/// When either is missing both are derived from the subassemblies.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Anchors {
    pub tower_base: Option<f64>,
    pub pile_head: Option<f64>,
}

/// Derived tables of one turbine
#[derive(Debug, Clone, Default)]
pub struct DerivedTables {
    pub pile_toe: Option<f64>,
    pub rna: Option<Vec<RnaRow>>,
    pub tower: Option<Vec<TubularRow>>,
    pub transition_piece: Option<Vec<TubularRow>>,
    pub monopile: Option<Vec<TubularRow>>,
    pub tw_lumped_mass: Option<Vec<LumpedMassRow>>,
    pub tp_lumped_mass: Option<Vec<LumpedMassRow>>,
    pub mp_lumped_mass: Option<Vec<LumpedMassRow>>,
    pub tp_distributed_mass: Option<Vec<DistributedMassRow>>,
    pub mp_distributed_mass: Option<Vec<DistributedMassRow>>,
    pub grout: Option<Vec<DistributedMassRow>>,
    pub full_structure: Option<Vec<TubularRow>>,
    pub tp_skirt: Option<Vec<TubularRow>>,
    pub substructure: Option<Vec<TubularRow>>,
}

/// Geometry engine of one offshore wind turbine
#[derive(Debug)]
pub struct Owt {
    materials: Vec<Arc<Material>>,
    sub_assemblies: BTreeMap<SubAssemblyType, SubAssembly>,
    block_tables: BTreeMap<SubAssemblyType, Vec<BlockRow>>,
    pub tower_base: Option<f64>,
    pub pile_head: Option<f64>,
    pub water_depth: f64,
    section_properties: SectionProperties,
    stage: Stage,
    tables: DerivedTables,
}

impl Owt {
    /// Build an engine from raw records, fetching building blocks from `source`
    pub fn new(
        materials: Vec<MaterialRecord>,
        subassemblies: Vec<SubAssemblyRecord>,
        location: LocationRecord,
        source: Arc<dyn BuildingBlockSource>,
        anchors: Anchors,
    ) -> Result<Self> {
        let materials: Vec<Arc<Material>> =
            materials.into_iter().map(|m| Arc::new(Material::from(m))).collect();
        let subassemblies = subassemblies
            .into_iter()
            .map(|record| SubAssembly::new(record, materials.clone(), Some(source.clone())))
            .collect();
        Self::from_subassemblies(materials, subassemblies, location.elevation, anchors)
    }

    /// Build an engine from subassemblies that are already constructed
    pub fn from_subassemblies(
        materials: Vec<Arc<Material>>,
        subassemblies: Vec<SubAssembly>,
        water_depth: f64,
        anchors: Anchors,
    ) -> Result<Self> {
        if materials.is_empty() {
            return Err(GeometryError::missing("no materials supplied"));
        }

        let mut sub_assemblies = BTreeMap::new();
        for sa in subassemblies {
            let kind = sa.kind;
            if sub_assemblies.insert(kind, sa).is_some() {
                return Err(GeometryError::DuplicateSubAssembly {
                    kind: kind.to_string(),
                });
            }
        }

        let mut block_tables = BTreeMap::new();
        for (kind, sa) in &sub_assemblies {
            block_tables.insert(*kind, sa.as_table(false)?);
        }

        let mut owt = Self {
            materials,
            sub_assemblies,
            block_tables,
            tower_base: anchors.tower_base,
            pile_head: anchors.pile_head,
            water_depth,
            section_properties: SectionProperties::default(),
            stage: Stage::Unprocessed,
            tables: DerivedTables::default(),
        };

        if anchors.tower_base.is_none() || anchors.pile_head.is_none() {
            owt.derive_anchors()?;
        }
        Ok(owt)
    }

    fn derive_anchors(&mut self) -> Result<()> {
        self.tower_base = if let Some(tw) = self.sub_assemblies.get(&SubAssemblyType::Tw) {
            Some(tw.absolute_bottom()?)
        } else if let Some(tp) = self.sub_assemblies.get(&SubAssemblyType::Tp) {
            Some(tp.absolute_top()?)
        } else {
            None
        };
        self.pile_head = match self.sub_assemblies.get(&SubAssemblyType::Mp) {
            Some(mp) => Some(mp.absolute_top()?),
            None => None,
        };
        debug!(
            tower_base = ?self.tower_base,
            pile_head = ?self.pile_head,
            "derived reference elevations from subassemblies"
        );
        Ok(())
    }

    /// Use `properties` for the elastic constants of the can tables
    pub fn with_section_properties(mut self, properties: SectionProperties) -> Self {
        self.section_properties = properties;
        self
    }

    pub fn materials(&self) -> &[Arc<Material>] {
        &self.materials
    }

    pub fn sub_assemblies(&self) -> &BTreeMap<SubAssemblyType, SubAssembly> {
        &self.sub_assemblies
    }

    pub fn sub_assembly(&self, kind: SubAssemblyType) -> Option<&SubAssembly> {
        self.sub_assemblies.get(&kind)
    }

    /// Building-block table of one subassembly, highest block first
    pub fn block_table(&self, kind: SubAssemblyType) -> Option<&[BlockRow]> {
        self.block_tables.get(&kind).map(Vec::as_slice)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// All derived tables regardless of stage
    pub fn tables(&self) -> &DerivedTables {
        &self.tables
    }

    fn advance(&mut self, stage: Stage) {
        self.stage = self.stage.max(stage);
    }

    fn require_table(&self, kind: SubAssemblyType) -> Result<&[BlockRow]> {
        self.block_table(kind).ok_or_else(|| {
            GeometryError::missing(format!("{} subassembly data not found", kind.name()))
        })
    }

    fn require_tower_base(&self) -> Result<f64> {
        self.tower_base
            .ok_or_else(|| GeometryError::missing("tower base elevation is not set"))
    }

    fn require_pile_head(&self) -> Result<f64> {
        self.pile_head
            .ok_or_else(|| GeometryError::missing("pile head elevation is not set"))
    }

    fn require_pile_toe(&self, step: &str) -> Result<f64> {
        self.tables
            .pile_toe
            .ok_or_else(|| GeometryError::sequencing(step, "Monopile structure (pile toe)"))
    }

    /// Bottom of the transition-piece can stack, mLAT
    fn tp_bottom(&self) -> Result<f64> {
        let tower_base = self.require_tower_base()?;
        let height: f64 = self
            .require_table(SubAssemblyType::Tp)?
            .iter()
            .filter(|row| row.kind == BlockKind::TubularSection && !row.is_grout())
            .filter_map(|row| row.height)
            .sum();
        Ok(tower_base - height * MM_TO_M)
    }

    /// Cans of one stack with elevations in mLAT
    ///
    /// The tower hangs from the tower base, the transition piece ends at the
    /// tower base, the monopile ends at the pile head. The monopile toe found
    /// here is stored as the pile toe.
    pub fn set_df_structure(&mut self, idx: StructureIndex) -> Result<Vec<StructureRow>> {
        let kind = idx.kind();
        let cans: Vec<&BlockRow> = self
            .require_table(kind)?
            .iter()
            .filter(|row| row.kind == BlockKind::TubularSection)
            .filter(|row| idx != StructureIndex::Tp || !row.is_grout())
            .collect();
        let total_height: f64 = cans.iter().filter_map(|row| row.height).sum::<f64>() * MM_TO_M;

        let datum = match idx {
            StructureIndex::Tw => self.require_tower_base()?,
            StructureIndex::Tp => self.require_tower_base()? - total_height,
            StructureIndex::Mp => self.require_pile_head()? - total_height,
        };

        let rows: Vec<StructureRow> = cans
            .into_iter()
            .map(|row| {
                let height = row.height.unwrap_or_default();
                let elevation_to = datum + row.z * MM_TO_M;
                let elevation_from = elevation_to + height * MM_TO_M;
                StructureRow {
                    title: row.title.clone(),
                    od: row.od.clone(),
                    height,
                    mass: row.mass,
                    volume: row.volume.unwrap_or_default(),
                    wall_thickness: row.wall_thickness.unwrap_or_default(),
                    material: row.material,
                    x: row.x,
                    y: row.y,
                    z: row.z,
                    elevation_from: round_to(elevation_from, 3),
                    elevation_to: round_to(elevation_to, 3),
                }
            })
            .collect();

        if idx == StructureIndex::Mp {
            self.tables.pile_toe = Some(round_to(datum, 3));
        }
        Ok(rows)
    }

    fn elastic_constants(&self, row: &StructureRow) -> Result<(f64, f64)> {
        match self.section_properties {
            SectionProperties::Fixed {
                youngs_modulus_gpa,
                poissons_ratio,
            } => Ok((youngs_modulus_gpa, poissons_ratio)),
            SectionProperties::FromMaterial => {
                let material = row
                    .material
                    .and_then(|id| self.materials.iter().find(|m| m.id == id))
                    .ok_or_else(|| {
                        GeometryError::missing(format!("material data is missing for can '{}'", row.title))
                    })?;
                match (material.young_modulus_gpa(), material.poisson_ratio) {
                    (Some(e), Some(nu)) => Ok((e, nu)),
                    _ => Err(GeometryError::missing(format!(
                        "material '{}' has no elastic constants",
                        material.title
                    ))),
                }
            }
        }
    }

    /// Can table of one stack in engineering units
    pub fn process_structure_geometry(&mut self, idx: StructureIndex) -> Result<Vec<TubularRow>> {
        let rows = self.set_df_structure(idx)?;
        rows.iter()
            .map(|row| {
                let (diameter_to, diameter_from) = split_diameters(&row.od)?;
                let (youngs_modulus, poissons_ratio) = self.elastic_constants(row)?;
                Ok(TubularRow {
                    title: row.title.clone(),
                    elevation_from: row.elevation_from,
                    elevation_to: row.elevation_to,
                    height: row.height * MM_TO_M,
                    diameter_from: diameter_from * MM_TO_M,
                    diameter_to: diameter_to * MM_TO_M,
                    volume: row.volume,
                    wall_thickness: row.wall_thickness,
                    youngs_modulus,
                    poissons_ratio,
                    mass: row.mass * KG_TO_T,
                    rho: row.mass / row.height,
                    subassembly: None,
                })
            })
            .collect()
    }

    /// Rotor-nacelle assembly: tower lumped masses titled "RNA"
    pub fn process_rna(&mut self) -> Result<()> {
        let tower_base = self.require_tower_base()?;
        let rna = self
            .require_table(SubAssemblyType::Tw)?
            .iter()
            .filter(|row| is_rna(&row.title))
            .map(|row| RnaRow {
                title: row.title.clone(),
                x: row.x * MM_TO_M,
                y: row.y * MM_TO_M,
                z: tower_base + row.z * MM_TO_M,
                mass: row.mass * KG_TO_T,
                ixx: row.moment_of_inertia.x.map(|i| i * KG_TO_T),
                iyy: row.moment_of_inertia.y.map(|i| i * KG_TO_T),
                izz: row.moment_of_inertia.z.map(|i| i * KG_TO_T),
                description: row.description.clone(),
                subassembly: None,
            })
            .collect();
        self.tables.rna = Some(rna);
        Ok(())
    }

    /// Lumped masses of one subassembly with their mLAT elevation
    ///
    /// Tower masses hang from the tower base, transition-piece masses from the
    /// subassembly position and monopile masses from the pile toe. The RNA is
    /// reported separately by [`Owt::process_rna`].
    pub fn set_df_appurtenances(&self, kind: SubAssemblyType) -> Result<Vec<AppurtenanceRow>> {
        let table = self.require_table(kind)?;
        let datum = match kind {
            SubAssemblyType::Tw => self.require_tower_base()?,
            SubAssemblyType::Tp => {
                let tp = self
                    .sub_assemblies
                    .get(&SubAssemblyType::Tp)
                    .ok_or_else(|| GeometryError::missing("Transition piece subassembly data not found"))?;
                tp.position.z * MM_TO_M
            }
            SubAssemblyType::Mp => self.require_pile_toe("set_df_appurtenances(MP)")?,
        };

        Ok(table
            .iter()
            .filter(|row| row.kind == BlockKind::LumpedMass)
            .filter(|row| kind != SubAssemblyType::Tw || !is_rna(&row.title))
            .map(|row| appurtenance(row, datum))
            .collect())
    }

    /// Point masses of one subassembly in engineering units
    pub fn process_lumped_masses(&self, kind: SubAssemblyType) -> Result<Vec<LumpedMassRow>> {
        Ok(self
            .set_df_appurtenances(kind)?
            .into_iter()
            .map(|a| LumpedMassRow {
                title: a.title,
                x: a.x * MM_TO_M,
                y: a.y * MM_TO_M,
                z: a.z_lat,
                mass: a.mass * KG_TO_T,
                description: a.description,
                subassembly: None,
            })
            .collect())
    }

    /// Distributed masses of one group with their mLAT elevation
    ///
    /// Transition-piece masses and grout are placed from the bottom of the
    /// transition-piece can stack, monopile masses from the pile toe.
    pub fn set_df_distributed_appurtenances(&self, group: DistributedGroup) -> Result<Vec<AppurtenanceRow>> {
        let (kind, datum) = match group {
            DistributedGroup::Tp | DistributedGroup::Grout => (SubAssemblyType::Tp, self.tp_bottom()?),
            DistributedGroup::Mp => (
                SubAssemblyType::Mp,
                self.require_pile_toe("set_df_distributed_appurtenances(MP)")?,
            ),
        };

        Ok(self
            .require_table(kind)?
            .iter()
            .filter(|row| row.kind == BlockKind::DistributedMass)
            .filter(|row| match group {
                DistributedGroup::Tp => !row.is_grout(),
                DistributedGroup::Grout => row.is_grout(),
                DistributedGroup::Mp => true,
            })
            .map(|row| appurtenance(row, datum))
            .collect())
    }

    /// Distributed masses of one group in engineering units
    pub fn process_distributed_lumped_masses(&self, group: DistributedGroup) -> Result<Vec<DistributedMassRow>> {
        Ok(self
            .set_df_distributed_appurtenances(group)?
            .into_iter()
            .map(|a| DistributedMassRow {
                title: a.title,
                x: a.x * MM_TO_M,
                y: a.y * MM_TO_M,
                z: a.z_lat,
                height: a.height.unwrap_or_default() * MM_TO_M,
                mass: a.mass * KG_TO_T,
                volume: a.volume,
                description: a.description,
                subassembly: None,
            })
            .collect())
    }

    /// Derive the can, RNA and appurtenance tables
    pub fn process_structure(&mut self, option: ProcessOption) -> Result<()> {
        info!(option = %option, "processing turbine structure");
        match option {
            ProcessOption::Full => {
                self.process_rna()?;
                self.tables.tower = Some(self.process_structure_geometry(StructureIndex::Tw)?);
                self.tables.transition_piece = Some(self.process_structure_geometry(StructureIndex::Tp)?);
                self.tables.monopile = Some(self.process_structure_geometry(StructureIndex::Mp)?);
                self.tables.tw_lumped_mass = Some(self.process_lumped_masses(SubAssemblyType::Tw)?);
                self.tables.tp_lumped_mass = Some(self.process_lumped_masses(SubAssemblyType::Tp)?);
                self.tables.mp_lumped_mass = Some(self.process_lumped_masses(SubAssemblyType::Mp)?);
                self.tables.tp_distributed_mass =
                    Some(self.process_distributed_lumped_masses(DistributedGroup::Tp)?);
                self.tables.mp_distributed_mass =
                    Some(self.process_distributed_lumped_masses(DistributedGroup::Mp)?);
                self.tables.grout = Some(self.process_distributed_lumped_masses(DistributedGroup::Grout)?);
            }
            ProcessOption::Only(SubAssemblyType::Tw) => {
                self.process_rna()?;
                self.tables.tower = Some(self.process_structure_geometry(StructureIndex::Tw)?);
                self.tables.tw_lumped_mass = Some(self.process_lumped_masses(SubAssemblyType::Tw)?);
            }
            ProcessOption::Only(SubAssemblyType::Tp) => {
                self.tables.transition_piece = Some(self.process_structure_geometry(StructureIndex::Tp)?);
                self.tables.tp_lumped_mass = Some(self.process_lumped_masses(SubAssemblyType::Tp)?);
                self.tables.tp_distributed_mass =
                    Some(self.process_distributed_lumped_masses(DistributedGroup::Tp)?);
                self.tables.grout = Some(self.process_distributed_lumped_masses(DistributedGroup::Grout)?);
            }
            ProcessOption::Only(SubAssemblyType::Mp) => {
                self.tables.monopile = Some(self.process_structure_geometry(StructureIndex::Mp)?);
                self.tables.mp_lumped_mass = Some(self.process_lumped_masses(SubAssemblyType::Mp)?);
                self.tables.mp_distributed_mass =
                    Some(self.process_distributed_lumped_masses(DistributedGroup::Mp)?);
            }
        }
        self.advance(Stage::Processed);
        Ok(())
    }

    /// Join the transition piece to the monopile at the pile head
    ///
    /// A can ending exactly at the pile head is a bolted flange and is kept
    /// as is. Otherwise the can crossing the pile head is cut there. The cans
    /// below the pile head form the skirt, cut at the same elevation from above.
    pub fn assembly_tp_mp(&mut self) -> Result<()> {
        let (tp, mp) = match (&self.tables.transition_piece, &self.tables.monopile) {
            (Some(tp), Some(mp)) => (tp, mp),
            _ => {
                return Err(GeometryError::sequencing(
                    "assembly_tp_mp",
                    "Transition piece and monopile",
                ))
            }
        };
        let head = self.require_pile_head()?;

        let above: Vec<TubularRow> = tp.iter().filter(|r| r.elevation_from > head).cloned().collect();
        let mut substructure = match above.last() {
            Some(boundary) if boundary.elevation_to == head => {
                debug!(pile_head = head, "bolted transition piece joint");
                above
            }
            Some(_) => {
                debug!(pile_head = head, "cutting transition piece at pile head");
                can_modification(above, head, CanEnd::Bottom)?
            }
            None => above,
        };
        substructure.extend(mp.iter().cloned());

        let below: Vec<TubularRow> = tp.iter().filter(|r| r.elevation_to < head).cloned().collect();
        let tp_skirt = if below.is_empty() {
            None
        } else {
            Some(can_modification(below, head, CanEnd::Top)?)
        };

        self.tables.substructure = Some(substructure);
        self.tables.tp_skirt = tp_skirt;
        self.advance(Stage::JointAssembled);
        Ok(())
    }

    /// Stack the tower on the substructure
    pub fn assembly_full_structure(&mut self) -> Result<()> {
        let substructure = self
            .tables
            .substructure
            .as_ref()
            .ok_or_else(|| GeometryError::sequencing("assembly_full_structure", "Substructure"))?;
        let tower = self
            .tables
            .tower
            .as_ref()
            .ok_or_else(|| GeometryError::sequencing("assembly_full_structure", "Tower"))?;

        let mut full = tower.clone();
        full.extend(substructure.iter().cloned());
        self.tables.full_structure = Some(full);
        self.advance(Stage::Assembled);
        Ok(())
    }

    /// Tag every table with its subassembly and assemble what is present
    pub fn extend_dfs(&mut self) -> Result<()> {
        let t = &mut self.tables;
        if let Some(rows) = &mut t.rna {
            tag_rows(rows, SubAssemblyType::Tw);
        }
        for (rows, kind) in [
            (&mut t.tower, SubAssemblyType::Tw),
            (&mut t.transition_piece, SubAssemblyType::Tp),
            (&mut t.monopile, SubAssemblyType::Mp),
        ] {
            if let Some(rows) = rows {
                tag_rows(rows, kind);
            }
        }
        for (rows, kind) in [
            (&mut t.tw_lumped_mass, SubAssemblyType::Tw),
            (&mut t.tp_lumped_mass, SubAssemblyType::Tp),
            (&mut t.mp_lumped_mass, SubAssemblyType::Mp),
        ] {
            if let Some(rows) = rows {
                tag_rows(rows, kind);
            }
        }
        for (rows, kind) in [
            (&mut t.tp_distributed_mass, SubAssemblyType::Tp),
            (&mut t.grout, SubAssemblyType::Tp),
            (&mut t.mp_distributed_mass, SubAssemblyType::Mp),
        ] {
            if let Some(rows) = rows {
                tag_rows(rows, kind);
            }
        }

        let has_tw = self.sub_assemblies.contains_key(&SubAssemblyType::Tw);
        let has_tp = self.sub_assemblies.contains_key(&SubAssemblyType::Tp);
        let has_mp = self.sub_assemblies.contains_key(&SubAssemblyType::Mp);
        if has_tp && has_mp {
            self.assembly_tp_mp()?;
        } else {
            self.tables.tp_skirt = None;
        }
        if has_tw && self.tables.substructure.is_some() {
            self.assembly_full_structure()?;
        } else {
            self.tables.full_structure = None;
        }
        self.advance(Stage::Assembled);
        Ok(())
    }

    /// Monopile cans measured from the mudline, positive downwards
    ///
    /// Each can spans from the bottom of the can above it to its own bottom;
    /// the top can only bounds the one below it. With a cutoff, cans ending
    /// above it are dropped and the first remaining can starts at the cutoff.
    pub fn transform_monopile_geometry(&self, cutoff: Option<f64>) -> Result<Vec<PileRow>> {
        let mp = self
            .sub_assemblies
            .get(&SubAssemblyType::Mp)
            .ok_or_else(|| GeometryError::missing("Monopile subassembly data not found"))?;
        let table = self.require_table(SubAssemblyType::Mp)?;
        let material = mp
            .building_blocks()?
            .iter()
            .find_map(|bb| bb.material.clone())
            .ok_or_else(|| GeometryError::missing("monopile has no material"))?;

        let penetration = -(mp.position.z * MM_TO_M - self.water_depth);
        let cans: Vec<&BlockRow> = table
            .iter()
            .filter(|row| row.kind == BlockKind::TubularSection)
            .collect();

        let mut pile = Vec::with_capacity(cans.len());
        for pair in cans.windows(2) {
            let (above, row) = (pair[0], pair[1]);
            let (bottom, top) = split_diameters(&row.od)?;
            pile.push(PileRow {
                elevation_from: penetration - above.z * MM_TO_M,
                elevation_to: penetration - row.z * MM_TO_M,
                material: material.title.clone(),
                submerged_unit_weight: material.submerged_unit_weight(),
                wall_thickness: row.wall_thickness,
                diameter: MM_TO_M * 0.5 * (bottom + top),
                youngs_modulus: material.young_modulus_gpa(),
                poissons_ratio: material.poisson_ratio,
            });
        }

        if let Some(cutoff) = cutoff {
            pile.retain(|row| row.elevation_to > cutoff);
            if let Some(first) = pile.first_mut() {
                first.elevation_from = cutoff;
            }
        }
        Ok(pile)
    }

    pub fn pile_toe(&self) -> Staged<Option<f64>> {
        Staged::check("pile_toe", self.stage, Stage::Processed, self.tables.pile_toe)
    }

    pub fn rna(&self) -> Staged<Option<&[RnaRow]>> {
        Staged::check("rna", self.stage, Stage::Processed, self.tables.rna.as_deref())
    }

    pub fn tower(&self) -> Staged<Option<&[TubularRow]>> {
        Staged::check("tower", self.stage, Stage::Processed, self.tables.tower.as_deref())
    }

    pub fn transition_piece(&self) -> Staged<Option<&[TubularRow]>> {
        Staged::check(
            "transition_piece",
            self.stage,
            Stage::Processed,
            self.tables.transition_piece.as_deref(),
        )
    }

    pub fn monopile(&self) -> Staged<Option<&[TubularRow]>> {
        Staged::check("monopile", self.stage, Stage::Processed, self.tables.monopile.as_deref())
    }

    pub fn tw_lumped_mass(&self) -> Staged<Option<&[LumpedMassRow]>> {
        Staged::check(
            "tw_lumped_mass",
            self.stage,
            Stage::Processed,
            self.tables.tw_lumped_mass.as_deref(),
        )
    }

    pub fn tp_lumped_mass(&self) -> Staged<Option<&[LumpedMassRow]>> {
        Staged::check(
            "tp_lumped_mass",
            self.stage,
            Stage::Processed,
            self.tables.tp_lumped_mass.as_deref(),
        )
    }

    pub fn mp_lumped_mass(&self) -> Staged<Option<&[LumpedMassRow]>> {
        Staged::check(
            "mp_lumped_mass",
            self.stage,
            Stage::Processed,
            self.tables.mp_lumped_mass.as_deref(),
        )
    }

    pub fn tp_distributed_mass(&self) -> Staged<Option<&[DistributedMassRow]>> {
        Staged::check(
            "tp_distributed_mass",
            self.stage,
            Stage::Processed,
            self.tables.tp_distributed_mass.as_deref(),
        )
    }

    pub fn mp_distributed_mass(&self) -> Staged<Option<&[DistributedMassRow]>> {
        Staged::check(
            "mp_distributed_mass",
            self.stage,
            Stage::Processed,
            self.tables.mp_distributed_mass.as_deref(),
        )
    }

    pub fn grout(&self) -> Staged<Option<&[DistributedMassRow]>> {
        Staged::check("grout", self.stage, Stage::Processed, self.tables.grout.as_deref())
    }

    pub fn substructure(&self) -> Staged<Option<&[TubularRow]>> {
        Staged::check(
            "substructure",
            self.stage,
            Stage::JointAssembled,
            self.tables.substructure.as_deref(),
        )
    }

    pub fn tp_skirt(&self) -> Staged<Option<&[TubularRow]>> {
        Staged::check("tp_skirt", self.stage, Stage::JointAssembled, self.tables.tp_skirt.as_deref())
    }

    pub fn full_structure(&self) -> Staged<Option<&[TubularRow]>> {
        Staged::check(
            "full_structure",
            self.stage,
            Stage::Assembled,
            self.tables.full_structure.as_deref(),
        )
    }
}

fn is_rna(title: &str) -> bool {
    title.contains("RNA")
}

fn appurtenance(row: &BlockRow, datum: f64) -> AppurtenanceRow {
    AppurtenanceRow {
        title: row.title.clone(),
        mass: row.mass,
        x: row.x,
        y: row.y,
        z: row.z,
        height: row.height,
        volume: row.volume,
        description: row.description.clone(),
        z_lat: datum + row.z * MM_TO_M,
    }
}

/// Split a "bottom/top" diameter string into (bottom, top) mm
fn split_diameters(od: &str) -> Result<(f64, f64)> {
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| GeometryError::unit_consistency(od))
    };
    match od.split_once('/') {
        Some((bottom, top)) => Ok((parse(bottom)?, parse(top)?)),
        None => {
            let d = parse(od)?;
            Ok((d, d))
        }
    }
}
