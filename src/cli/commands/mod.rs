//! CLI command implementations

pub mod inspect;
pub mod pile;
pub mod process;
