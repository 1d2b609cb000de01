//! Core module - errors, configuration, data input and numeric helpers

pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod source;
pub mod units;

pub use config::Config;
pub use dataset::{Dataset, TurbineEntry};
pub use error::{GeometryError, Result};
pub use loader::{load_dataset, DatasetSyntaxError};
pub use source::{BuildingBlockSource, InMemorySource};
