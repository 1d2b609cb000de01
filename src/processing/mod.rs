//! Geometry processing: single-turbine and fleet engines

pub mod can;
pub mod owt;
pub mod owts;
pub mod stage;
pub mod tables;

#[cfg(test)]
pub(crate) mod fixtures;

pub use can::{can_adjust_properties, can_modification, CanEnd, CanProperties};
pub use owt::{Anchors, DerivedTables, Owt, ProcessOption, SectionProperties, StructureIndex};
pub use owts::{FleetTables, Owts, TurbineRef};
pub use stage::{Stage, Staged};
pub use tables::{FleetRow, TableRow};
