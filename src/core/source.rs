//! Building-block sources
//!
//! The engine never talks to a metadata service directly. A subassembly asks
//! its [`BuildingBlockSource`] once for the raw block records and keeps the
//! result.

use std::collections::HashMap;
use tracing::warn;

use crate::core::error::Result;
use crate::entities::building_block::BuildingBlockRecord;

/// Supplier of raw building-block records keyed by subassembly id
pub trait BuildingBlockSource: Send + Sync {
    /// Fetch all building-block records of one subassembly
    ///
    /// An empty list means the subassembly has no blocks. Transport or
    /// lookup failures are reported as
    /// [`GeometryError::Fetch`](crate::core::error::GeometryError::Fetch).
    fn building_blocks(&self, subassembly_id: i64) -> Result<Vec<BuildingBlockRecord>>;
}

/// Source backed by records already held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    blocks: HashMap<i64, Vec<BuildingBlockRecord>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group records by their owning subassembly id
    ///
    /// Records without an owner are dropped with a warning.
    pub fn from_records(records: impl IntoIterator<Item = BuildingBlockRecord>) -> Self {
        let mut source = Self::new();
        for record in records {
            match record.sub_assembly {
                Some(id) => source.blocks.entry(id).or_default().push(record),
                None => warn!(block = %record.title, "building block has no subassembly, skipped"),
            }
        }
        source
    }

    /// Register the blocks of one subassembly, replacing any previous entry
    pub fn insert(&mut self, subassembly_id: i64, records: Vec<BuildingBlockRecord>) {
        self.blocks.insert(subassembly_id, records);
    }
}

impl BuildingBlockSource for InMemorySource {
    fn building_blocks(&self, subassembly_id: i64) -> Result<Vec<BuildingBlockRecord>> {
        Ok(self.blocks.get(&subassembly_id).cloned().unwrap_or_default())
    }
}
