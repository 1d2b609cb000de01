//! Error types for geometry processing

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for geometry operations.
pub type Result<T> = std::result::Result<T, GeometryError>;

/// Errors raised while building or processing turbine geometry.
#[derive(Debug, Error, Diagnostic)]
pub enum GeometryError {
    /// Required input data is absent.
    #[error("missing data: {0}")]
    #[diagnostic(code(owtgeo::missing_data))]
    MissingData(String),

    /// A processing step was invoked before the step it depends on.
    #[error("{step} requires {prerequisite} to be processed first")]
    #[diagnostic(
        code(owtgeo::sequencing),
        help("run process_structure() and extend_dfs() in order")
    )]
    Sequencing {
        step: String,
        prerequisite: String,
    },

    /// Raw fields or an index string match none of the recognised kinds.
    #[error("classification failed: {0}")]
    #[diagnostic(code(owtgeo::classification))]
    Classification(String),

    /// A "bottom/top" diameter string could not be read as millimetres.
    #[error("malformed diameter '{value}'")]
    #[diagnostic(
        code(owtgeo::unit_consistency),
        help("diameters are written as '<bottom>/<top>' or a single value, in mm")
    )]
    UnitConsistency { value: String },

    /// The source returned several subassemblies of the same kind for one turbine.
    #[error("more than one {kind} subassembly for a single turbine")]
    #[diagnostic(
        code(owtgeo::duplicate_subassembly),
        help("select a model definition so each turbine has one subassembly per kind")
    )]
    DuplicateSubAssembly { kind: String },

    /// The building-block source failed.
    ///
    /// Raised by external [`BuildingBlockSource`](crate::core::source::BuildingBlockSource)
    /// implementations; the in-memory source never fails.
    #[error("failed to fetch building blocks for subassembly {subassembly_id}: {reason}")]
    #[diagnostic(code(owtgeo::fetch))]
    Fetch { subassembly_id: i64, reason: String },

    /// No turbine matches the given title or index.
    #[error("unknown turbine: {0}")]
    #[diagnostic(
        code(owtgeo::unknown_turbine),
        help("use a turbine title or its position in the input list")
    )]
    UnknownTurbine(String),

    /// Two turbines of a fleet share a title.
    #[error("duplicate turbine title '{0}'")]
    #[diagnostic(code(owtgeo::duplicate_turbine))]
    DuplicateTurbine(String),
}

impl GeometryError {
    /// Create a missing data error.
    #[must_use]
    pub fn missing(details: impl Into<String>) -> Self {
        Self::MissingData(details.into())
    }

    /// Create a sequencing error naming the prerequisite.
    #[must_use]
    pub fn sequencing(step: impl Into<String>, prerequisite: impl Into<String>) -> Self {
        Self::Sequencing {
            step: step.into(),
            prerequisite: prerequisite.into(),
        }
    }

    /// Create a classification error.
    #[must_use]
    pub fn classification(details: impl Into<String>) -> Self {
        Self::Classification(details.into())
    }

    /// Create a unit consistency error for a malformed diameter string.
    #[must_use]
    pub fn unit_consistency(value: impl Into<String>) -> Self {
        Self::UnitConsistency {
            value: value.into(),
        }
    }

    /// Create a fetch error.
    #[must_use]
    pub fn fetch(subassembly_id: i64, reason: impl Into<String>) -> Self {
        Self::Fetch {
            subassembly_id,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GeometryError::missing("no building blocks");
        assert!(format!("{err}").contains("no building blocks"));

        let err = GeometryError::sequencing("assembly_full_structure", "Substructure");
        let msg = format!("{err}");
        assert!(msg.contains("assembly_full_structure"));
        assert!(msg.contains("Substructure"));

        let err = GeometryError::unit_consistency("6000/abc");
        assert!(format!("{err}").contains("6000/abc"));
    }

    #[test]
    fn test_error_codes() {
        let err = GeometryError::classification("unknown index 'xx'");
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("owtgeo::classification"));
    }
}
