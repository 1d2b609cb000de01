//! Processing stages of a turbine engine

use std::fmt;
use tracing::warn;

/// How far a turbine has been processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Stage {
    #[default]
    Unprocessed,
    /// `process_structure` has run
    Processed,
    /// The transition piece / monopile joint has been resolved
    JointAssembled,
    /// `extend_dfs` has run
    Assembled,
}

impl Stage {
    /// The call that moves an engine into this stage
    pub fn operation(&self) -> &'static str {
        match self {
            Stage::Unprocessed => "nothing",
            Stage::Processed => "process_structure()",
            Stage::JointAssembled => "assembly_tp_mp()",
            Stage::Assembled => "extend_dfs()",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Unprocessed => write!(f, "unprocessed"),
            Stage::Processed => write!(f, "processed"),
            Stage::JointAssembled => write!(f, "joint assembled"),
            Stage::Assembled => write!(f, "assembled"),
        }
    }
}

/// A derived value read before or after the stage that produces it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Staged<T> {
    /// The producing stage has not run; this is whatever is stored now
    NotYetProcessed(T),
    Value(T),
}

impl<T> Staged<T> {
    /// Tag `value` against the stage that produces it, warning when it has not run
    pub fn check(name: &str, current: Stage, required: Stage, value: T) -> Self {
        Self::guard(name, current >= required, required.operation(), value)
    }

    /// Tag `value` as processed when `ready`, otherwise warn that `operation` must run first
    pub fn guard(name: &str, ready: bool, operation: &str, value: T) -> Self {
        if ready {
            Staged::Value(value)
        } else {
            warn!(
                attribute = name,
                "attribute accessed before processing, run {} first", operation
            );
            Staged::NotYetProcessed(value)
        }
    }

    /// The stored value, processed or not
    pub fn into_inner(self) -> T {
        match self {
            Staged::NotYetProcessed(v) | Staged::Value(v) => v,
        }
    }

    /// The value only if its stage has run
    pub fn processed(self) -> Option<T> {
        match self {
            Staged::Value(v) => Some(v),
            Staged::NotYetProcessed(_) => None,
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self, Staged::Value(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert!(Stage::Unprocessed < Stage::Processed);
        assert!(Stage::JointAssembled < Stage::Assembled);
    }

    #[test]
    fn test_staged_check() {
        let early = Staged::check("tower", Stage::Unprocessed, Stage::Processed, None::<u8>);
        assert!(!early.is_processed());
        assert_eq!(early.into_inner(), None);

        let ready = Staged::check("tower", Stage::Assembled, Stage::Processed, Some(1));
        assert_eq!(ready.processed(), Some(Some(1)));
    }
}
