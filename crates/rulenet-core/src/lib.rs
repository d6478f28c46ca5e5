//! Core data structures shared by the rulenet condition compiler.
//!
//! - `interner`: name interning (`Symbol`, `Interner`)
//! - `value`: literal values and variable arity
//! - `constraint`: constraint records and their intersection
//! - `expr`: compiled test expressions and value fetches

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod constraint;
mod expr;
mod interner;
mod value;

pub use constraint::{ConstraintRecord, Range, TypeSet, Violation};
pub use expr::{DisplayExpr, Expr, Fetch, Op, PatternKind, Segment, Side, SlotAddr};
pub use interner::{Interner, Symbol};
pub use value::{Arity, Literal};

#[cfg(test)]
mod interner_tests;
