//! Dataset bundle of raw records
//!
//! A dataset holds everything the metadata source would otherwise supply:
//! the material table, all building blocks (each naming its subassembly)
//! and, per turbine, its location and subassembly records.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::error::{GeometryError, Result};
use crate::core::source::{BuildingBlockSource, InMemorySource};
use crate::entities::building_block::BuildingBlockRecord;
use crate::entities::location::LocationRecord;
use crate::entities::material::MaterialRecord;
use crate::entities::subassembly::SubAssemblyRecord;
use crate::processing::owt::{Anchors, Owt, SectionProperties};
use crate::processing::owts::Owts;

/// One turbine of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurbineEntry {
    pub title: String,

    pub location: LocationRecord,

    #[serde(default)]
    pub subassemblies: Vec<SubAssemblyRecord>,

    /// Tower base elevation in mLAT, derived when absent
    #[serde(default)]
    pub tower_base: Option<f64>,

    /// Pile head elevation in mLAT, derived when absent
    #[serde(default)]
    pub pile_head: Option<f64>,
}

impl TurbineEntry {
    pub fn anchors(&self) -> Anchors {
        Anchors {
            tower_base: self.tower_base,
            pile_head: self.pile_head,
        }
    }
}

/// Raw records of a set of turbines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub materials: Vec<MaterialRecord>,
    pub building_blocks: Vec<BuildingBlockRecord>,
    pub turbines: Vec<TurbineEntry>,
}

impl Dataset {
    /// Building-block source over this dataset's blocks
    pub fn source(&self) -> InMemorySource {
        InMemorySource::from_records(self.building_blocks.iter().cloned())
    }

    pub fn turbine(&self, title: &str) -> Option<&TurbineEntry> {
        self.turbines.iter().find(|t| t.title == title)
    }

    /// Build the engine of one turbine
    pub fn build_owt(
        &self,
        entry: &TurbineEntry,
        source: Arc<dyn BuildingBlockSource>,
        section_properties: SectionProperties,
    ) -> Result<Owt> {
        if self.materials.is_empty() {
            return Err(GeometryError::missing("no materials found in the dataset"));
        }
        if entry.subassemblies.is_empty() {
            return Err(GeometryError::missing(format!(
                "no subassemblies found for turbine {}",
                entry.title
            )));
        }
        let owt = Owt::new(
            self.materials.clone(),
            entry.subassemblies.clone(),
            entry.location,
            source,
            entry.anchors(),
        )?;
        Ok(owt.with_section_properties(section_properties))
    }

    /// Build the fleet engine of every turbine in the dataset
    ///
    /// Turbines that fail to build are skipped with a warning as long as one
    /// succeeds. When none does, the error lists every failure.
    pub fn build_fleet(&self, section_properties: SectionProperties) -> Result<Owts> {
        if self.turbines.is_empty() {
            return Err(GeometryError::missing("no turbines found in the dataset"));
        }
        let source: Arc<dyn BuildingBlockSource> = Arc::new(self.source());

        let mut titles = Vec::new();
        let mut owts = Vec::new();
        let mut errors = Vec::new();
        for entry in &self.turbines {
            match self.build_owt(entry, source.clone(), section_properties) {
                Ok(owt) => {
                    titles.push(entry.title.clone());
                    owts.push(owt);
                }
                Err(err) => errors.push(format!("{}: {}", entry.title, err)),
            }
        }

        if !errors.is_empty() {
            if titles.is_empty() {
                return Err(GeometryError::missing(errors.join("\n")));
            }
            warn!(
                built = %titles.join(", "),
                errors = %errors.join("; "),
                "some turbines could not be built and were skipped"
            );
        }
        info!(turbines = titles.len(), "built fleet");
        Owts::new(titles, owts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::subassembly::SubAssemblyType;

    fn sa(id: i64, kind: SubAssemblyType, z: f64) -> SubAssemblyRecord {
        SubAssemblyRecord {
            id,
            title: format!("{}_{}", kind, id),
            description: None,
            x_position: None,
            y_position: None,
            z_position: Some(z),
            vertical_position_reference_system: None,
            subassembly_type: kind,
            source: None,
            asset: None,
            model_definition: None,
        }
    }

    fn can(owner: i64, title: &str, z: f64) -> BuildingBlockRecord {
        BuildingBlockRecord {
            title: title.to_string(),
            sub_assembly: Some(owner),
            z_position: Some(z),
            height: Some(10000.0),
            bottom_outer_diameter: Some(6000.0),
            wall_thickness: Some(50.0),
            material: Some(1),
            ..Default::default()
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            materials: vec![MaterialRecord {
                id: 1,
                title: "Steel".to_string(),
                description: None,
                young_modulus: Some(210000.0),
                density: Some(7850.0),
                poisson_ratio: Some(0.3),
            }],
            building_blocks: vec![can(1, "tw_can", 0.0), can(2, "tp_can", 0.0)],
            turbines: vec![
                TurbineEntry {
                    title: "T01".to_string(),
                    location: LocationRecord { elevation: -25.0 },
                    subassemblies: vec![sa(1, SubAssemblyType::Tw, 20000.0), sa(2, SubAssemblyType::Tp, 10000.0)],
                    tower_base: None,
                    pile_head: None,
                },
                TurbineEntry {
                    title: "T02".to_string(),
                    location: LocationRecord { elevation: -26.0 },
                    // subassembly 3 has no building blocks
                    subassemblies: vec![sa(3, SubAssemblyType::Tw, 20000.0)],
                    tower_base: None,
                    pile_head: None,
                },
            ],
        }
    }

    #[test]
    fn test_build_fleet_skips_failing_turbines() {
        let owts = dataset().build_fleet(SectionProperties::default()).unwrap();
        assert_eq!(owts.turbines().collect::<Vec<_>>(), vec!["T01"]);
        assert_eq!(owts.tower_base["T01"], Some(20.0));
    }

    #[test]
    fn test_build_fleet_all_failing() {
        let mut data = dataset();
        data.turbines.remove(0);
        let err = data.build_fleet(SectionProperties::default()).unwrap_err();
        assert!(matches!(err, GeometryError::MissingData(ref msg) if msg.starts_with("T02:")));
    }

    #[test]
    fn test_build_owt_requires_subassemblies_and_materials() {
        let mut data = dataset();
        let source: Arc<dyn BuildingBlockSource> = Arc::new(data.source());
        let mut entry = data.turbines[0].clone();
        entry.subassemblies.clear();
        assert!(data.build_owt(&entry, source.clone(), SectionProperties::default()).is_err());

        data.materials.clear();
        let entry = data.turbines[0].clone();
        assert!(matches!(
            data.build_owt(&entry, source, SectionProperties::default()),
            Err(GeometryError::MissingData(_))
        ));
    }

    #[test]
    fn test_duplicate_kinds_are_rejected() {
        let mut data = dataset();
        data.turbines[0].subassemblies.push(sa(1, SubAssemblyType::Tw, 20000.0));
        data.turbines.truncate(1);
        let err = data.build_fleet(SectionProperties::default()).unwrap_err();
        assert!(format!("{err}").contains("more than one TW subassembly"));
    }
}
