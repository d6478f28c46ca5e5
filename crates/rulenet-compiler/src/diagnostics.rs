//! Structured compile failures.
//!
//! `compile` stops at the first semantic error and returns it as a
//! `Diagnostic`. Rendering for the rule author is left to the caller; the
//! `Display` impls give a plain one-line form.

use std::fmt;

use rulenet_core::Violation;
use serde::Serialize;

/// Why a match-handle name cannot be bound by a pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum HandleConflict {
    /// An earlier pattern already uses the name as its match handle.
    AlreadyMatchHandle,
    /// The name was already bound as a field variable inside a pattern.
    BoundInPattern,
}

impl fmt::Display for HandleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleConflict::AlreadyMatchHandle => f.write_str("duplicate match handle"),
            HandleConflict::BoundInPattern => {
                f.write_str("match handle was previously bound within a pattern")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum DiagnosticKind {
    #[error("variable referenced before being defined")]
    UnboundVariableReference,

    #[error("{0}")]
    DuplicateOrIllegalMatchHandle(HandleConflict),

    #[error("variable used as both a single and a sequence variable")]
    VariableKindMixing,

    #[error("literal restriction value violates the {0} restriction")]
    LiteralConstraintViolation(Violation),

    #[error("constraints can never be satisfied")]
    UnmatchableConstraint,

    /// Expression deeper than `Config::max_depth`.
    #[error("expression nested too deeply")]
    NestingTooDeep,
}

/// Where in the LHS a diagnostic was raised.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    /// 1-based condition element index.
    pub pattern: u32,
    /// 1-based field index within the pattern.
    pub field: Option<u32>,
    pub slot: Option<String>,
    pub variable: Option<String>,
    /// Innermost function call enclosing the offending reference.
    pub function: Option<String>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(var) = &self.variable {
            write!(f, "?{var} ")?;
        }
        if let Some(func) = &self.function {
            write!(f, "in ({func} ...) ")?;
        }
        write!(f, "at CE #{}", self.pattern)?;
        match (&self.slot, self.field) {
            (Some(slot), _) => write!(f, " slot {slot}"),
            (None, Some(field)) => write!(f, " field #{field}"),
            (None, None) => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind}: {location}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub location: Location,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, pattern: u32) -> Self {
        Self {
            kind,
            location: Location {
                pattern,
                ..Location::default()
            },
        }
    }

    pub fn at(kind: DiagnosticKind, location: Location) -> Self {
        Self { kind, location }
    }

    pub fn variable(mut self, name: impl Into<String>) -> Self {
        self.location.variable = Some(name.into());
        self
    }

    pub fn function(mut self, name: impl Into<String>) -> Self {
        self.location.function = Some(name.into());
        self
    }
}
