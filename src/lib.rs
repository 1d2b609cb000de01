//! owtgeo: offshore wind turbine support-structure geometry
//!
//! Loads tower, transition piece and monopile building blocks, re-references
//! them to mLAT, joins them into substructure and full-structure tables and
//! summarises fleets of turbines.

pub mod cli;
pub mod core;
pub mod entities;
pub mod processing;
