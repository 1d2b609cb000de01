//! Subassembly - tower, transition piece or monopile
//!
//! Building blocks are fetched from the configured source on first access and
//! kept for the lifetime of the subassembly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::core::error::{GeometryError, Result};
use crate::core::source::BuildingBlockSource;
use crate::core::units::round_to;
use crate::entities::building_block::{BlockRow, BuildingBlock, BuildingBlockRecord};
use crate::entities::material::Material;
use crate::entities::position::Position;

/// Structural kind of a subassembly
///
/// Ordered bottom-up in the assembly sense used for tables: tower first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubAssemblyType {
    Tw,
    Tp,
    Mp,
}

impl SubAssemblyType {
    pub const ALL: [SubAssemblyType; 3] =
        [SubAssemblyType::Tw, SubAssemblyType::Tp, SubAssemblyType::Mp];

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            SubAssemblyType::Tw => "Tower",
            SubAssemblyType::Tp => "Transition piece",
            SubAssemblyType::Mp => "Monopile",
        }
    }
}

impl fmt::Display for SubAssemblyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubAssemblyType::Tw => write!(f, "TW"),
            SubAssemblyType::Tp => write!(f, "TP"),
            SubAssemblyType::Mp => write!(f, "MP"),
        }
    }
}

impl std::str::FromStr for SubAssemblyType {
    type Err = GeometryError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tw" | "tower" => Ok(SubAssemblyType::Tw),
            "tp" | "transition_piece" | "transition-piece" => Ok(SubAssemblyType::Tp),
            "mp" | "monopile" => Ok(SubAssemblyType::Mp),
            _ => Err(GeometryError::classification(format!(
                "unknown subassembly type '{}', use TW, TP or MP",
                s
            ))),
        }
    }
}

/// Raw subassembly record as supplied by the metadata source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAssemblyRecord {
    pub id: i64,
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub x_position: Option<f64>,
    #[serde(default)]
    pub y_position: Option<f64>,
    #[serde(default)]
    pub z_position: Option<f64>,
    #[serde(default)]
    pub vertical_position_reference_system: Option<String>,

    pub subassembly_type: SubAssemblyType,

    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub asset: Option<i64>,
    #[serde(default)]
    pub model_definition: Option<i64>,
}

/// Mass (kg) and height (mm) of a subassembly
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubAssemblyProperties {
    pub mass: f64,
    pub height: f64,
}

/// Closed profile polygon in absolute z (mm)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileTrace {
    pub x: Vec<f64>,
    pub z: Vec<f64>,
}

pub struct SubAssembly {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub kind: SubAssemblyType,
    pub position: Position,
    pub source: Option<String>,
    pub asset: Option<i64>,
    pub model_definition: Option<i64>,
    materials: Vec<Arc<Material>>,
    fetcher: Option<Arc<dyn BuildingBlockSource>>,
    blocks: OnceLock<Vec<BuildingBlock>>,
}

impl SubAssembly {
    /// Create a subassembly whose blocks come from `fetcher` on first access
    pub fn new(
        record: SubAssemblyRecord,
        materials: Vec<Arc<Material>>,
        fetcher: Option<Arc<dyn BuildingBlockSource>>,
    ) -> Self {
        let position = Position::from_raw(
            [record.x_position, record.y_position, record.z_position],
            [None, None, None],
            record.vertical_position_reference_system.as_deref(),
        );
        Self {
            id: record.id,
            title: record.title,
            description: record.description.unwrap_or_default(),
            kind: record.subassembly_type,
            position,
            source: record.source,
            asset: record.asset,
            model_definition: record.model_definition,
            materials,
            fetcher,
            blocks: OnceLock::new(),
        }
    }

    /// Create a subassembly from records already at hand
    pub fn with_building_blocks(
        record: SubAssemblyRecord,
        materials: Vec<Arc<Material>>,
        blocks: Vec<BuildingBlockRecord>,
    ) -> Result<Self> {
        let sa = Self::new(record, materials, None);
        let built = sa.build_blocks(blocks)?;
        let _ = sa.blocks.set(built);
        Ok(sa)
    }

    pub fn materials(&self) -> &[Arc<Material>] {
        &self.materials
    }

    fn build_blocks(&self, records: Vec<BuildingBlockRecord>) -> Result<Vec<BuildingBlock>> {
        if records.is_empty() {
            return Err(GeometryError::missing(format!(
                "no building blocks found for subassembly '{}'",
                self.title
            )));
        }
        records
            .into_iter()
            .map(|r| BuildingBlock::new(r, &self.materials))
            .collect()
    }

    /// Building blocks, fetched once and cached
    pub fn building_blocks(&self) -> Result<&[BuildingBlock]> {
        if let Some(blocks) = self.blocks.get() {
            return Ok(blocks);
        }
        let fetcher = self.fetcher.as_ref().ok_or_else(|| {
            GeometryError::missing(format!(
                "no building-block source configured for subassembly '{}'",
                self.title
            ))
        })?;
        let records = fetcher.building_blocks(self.id)?;
        debug!(subassembly = %self.title, count = records.len(), "fetched building blocks");
        let built = self.build_blocks(records)?;
        Ok(self.blocks.get_or_init(|| built))
    }

    /// Sum of tubular heights in mm, grout excluded
    pub fn height(&self) -> Result<f64> {
        Ok(self
            .building_blocks()?
            .iter()
            .filter(|bb| bb.is_tubular() && !bb.is_grout())
            .filter_map(|bb| bb.height())
            .sum())
    }

    /// Sum of block masses in kg
    pub fn mass(&self) -> Result<f64> {
        let mut total = 0.0;
        for bb in self.building_blocks()? {
            let m = bb.mass()?;
            if !m.is_nan() {
                total += m;
            }
        }
        Ok(total)
    }

    pub fn properties(&self) -> Result<SubAssemblyProperties> {
        Ok(SubAssemblyProperties {
            mass: self.mass()?,
            height: self.height()?,
        })
    }

    /// Closed outline of all cans, offset to absolute z
    ///
    /// Runs up the bottom corners of each can then back down the top corners.
    pub fn outline(&self) -> Result<ProfileTrace> {
        let mut outlines: Vec<_> = self
            .building_blocks()?
            .iter()
            .filter_map(|bb| bb.outline().map(|o| (bb.position.z, o)))
            .collect();
        outlines.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut trace = ProfileTrace::default();
        for (_, ol) in &outlines {
            trace.x.extend([ol.x[0], ol.x[3]]);
            trace.z.extend([ol.z[0], ol.z[3]]);
        }
        for (_, ol) in outlines.iter().rev() {
            trace.x.extend([ol.x[2], ol.x[1]]);
            trace.z.extend([ol.z[2], ol.z[1]]);
        }
        for z in trace.z.iter_mut() {
            *z += self.position.z;
        }
        Ok(trace)
    }

    /// Block table sorted by local z, highest first
    pub fn as_table(&self, include_absolute: bool) -> Result<Vec<BlockRow>> {
        let mut rows = self
            .building_blocks()?
            .iter()
            .map(BuildingBlock::as_row)
            .collect::<Result<Vec<_>>>()?;
        rows.sort_by(|a, b| b.z.total_cmp(&a.z));
        if include_absolute {
            for row in rows.iter_mut() {
                row.absolute_position = Some((row.z + self.position.z) / 1000.0);
            }
        }
        Ok(rows)
    }

    /// Absolute elevation of the lowest block, m
    pub fn absolute_bottom(&self) -> Result<f64> {
        self.as_table(true)?
            .last()
            .and_then(|row| row.absolute_position)
            .ok_or_else(|| GeometryError::missing(format!("subassembly '{}' is empty", self.title)))
    }

    /// Absolute elevation of the top of the highest can, m
    pub fn absolute_top(&self) -> Result<f64> {
        self.as_table(true)?
            .iter()
            .find_map(|row| match (row.absolute_position, row.height, row.wall_thickness) {
                (Some(abs), Some(h), Some(_)) => Some(round_to(abs + h / 1000.0, 3)),
                _ => None,
            })
            .ok_or_else(|| {
                GeometryError::missing(format!(
                    "subassembly '{}' has no complete tubular section",
                    self.title
                ))
            })
    }
}

impl fmt::Debug for SubAssembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubAssembly")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("kind", &self.kind)
            .field("position", &self.position)
            .field("fetched", &self.blocks.get().is_some())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for SubAssembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} subassembly", self.title)
    }
}
