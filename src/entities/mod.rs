//! Domain model of a support structure
//!
//! - [`Material`] - immutable physical properties
//! - [`Position`] - 6-DOF placement with a vertical datum
//! - [`BuildingBlock`] - a can, lumped mass or distributed mass
//! - [`SubAssembly`] - tower, transition piece or monopile

pub mod building_block;
pub mod location;
pub mod material;
pub mod position;
pub mod subassembly;

pub use building_block::{BlockKind, BlockRow, BuildingBlock, BuildingBlockRecord, MomentOfInertia, Outline};
pub use location::LocationRecord;
pub use material::{Material, MaterialRecord};
pub use position::Position;
pub use subassembly::{ProfileTrace, SubAssembly, SubAssemblyProperties, SubAssemblyRecord, SubAssemblyType};
