//! Shared test turbine
//!
//! Tower base at 20 mLAT, pile head at 5 mLAT (bolted flange), water depth
//! -30 mLAT, monopile toe at -60 mLAT.

use std::sync::Arc;

use crate::entities::building_block::BuildingBlockRecord;
use crate::entities::material::{Material, MaterialRecord};
use crate::entities::subassembly::{SubAssembly, SubAssemblyRecord, SubAssemblyType};
use crate::processing::owt::{Anchors, Owt};

pub fn steel() -> Vec<Arc<Material>> {
    vec![Arc::new(Material::from(MaterialRecord {
        id: 1,
        title: "Steel".to_string(),
        description: None,
        young_modulus: Some(210000.0),
        density: Some(7850.0),
        poisson_ratio: Some(0.3),
    }))]
}

pub fn sa_record(id: i64, kind: SubAssemblyType, z: f64) -> SubAssemblyRecord {
    SubAssemblyRecord {
        id,
        title: format!("{}_01", kind),
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

pub fn can(title: &str, z: f64, height: f64, bottom: f64, top: f64, wall: f64) -> BuildingBlockRecord {
    BuildingBlockRecord {
        title: title.to_string(),
        z_position: Some(z),
        height: Some(height),
        bottom_outer_diameter: Some(bottom),
        top_outer_diameter: Some(top),
        wall_thickness: Some(wall),
        material: Some(1),
        ..Default::default()
    }
}

pub fn lumped(title: &str, z: f64, mass: f64) -> BuildingBlockRecord {
    BuildingBlockRecord {
        title: title.to_string(),
        z_position: Some(z),
        mass: Some(mass),
        ..Default::default()
    }
}

pub fn distributed(title: &str, z: f64, height: f64, md: f64) -> BuildingBlockRecord {
    BuildingBlockRecord {
        title: title.to_string(),
        z_position: Some(z),
        height: Some(height),
        mass_distribution: Some(md),
        ..Default::default()
    }
}

pub fn tower() -> SubAssembly {
    let mut rna = lumped("RNA", 20000.0, 300000.0);
    rna.moment_of_inertia_x = Some(1e6);
    rna.moment_of_inertia_y = Some(2e6);
    rna.moment_of_inertia_z = Some(3e6);
    SubAssembly::with_building_blocks(
        sa_record(10, SubAssemblyType::Tw, 20000.0),
        steel(),
        vec![
            can("tw_can_1", 0.0, 10000.0, 6000.0, 5000.0, 40.0),
            can("tw_can_2", 10000.0, 10000.0, 5000.0, 4000.0, 30.0),
            rna,
            lumped("TW_platform", 5000.0, 2000.0),
        ],
    )
    .unwrap()
}

pub fn transition_piece() -> SubAssembly {
    let mut grout = distributed("TP_grout", 0.0, 4000.0, 500.0);
    grout.volume_distribution = Some(0.2);
    SubAssembly::with_building_blocks(
        sa_record(20, SubAssemblyType::Tp, 5000.0),
        steel(),
        vec![
            can("tp_can_1", 0.0, 10000.0, 6500.0, 6500.0, 50.0),
            can("tp_can_2", 10000.0, 5000.0, 6500.0, 6500.0, 50.0),
            lumped("TP_boat_landing", 3000.0, 10000.0),
            grout,
            distributed("TP_anodes", 1000.0, 2000.0, 100.0),
        ],
    )
    .unwrap()
}

pub fn monopile() -> SubAssembly {
    SubAssembly::with_building_blocks(
        sa_record(30, SubAssemblyType::Mp, -60000.0),
        steel(),
        vec![
            can("mp_can_1", 0.0, 40000.0, 6000.0, 6000.0, 60.0),
            can("mp_can_2", 40000.0, 25000.0, 6000.0, 6500.0, 60.0),
            lumped("MP_anode", 30000.0, 500.0),
        ],
    )
    .unwrap()
}

pub fn turbine(anchors: Anchors) -> Owt {
    Owt::from_subassemblies(steel(), vec![tower(), transition_piece(), monopile()], -30.0, anchors).unwrap()
}
