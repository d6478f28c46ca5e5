//! Rule LHS compiler: variable binding analysis and network test generation.
//!
//! Given the condition elements of one rule, `compile` resolves every
//! variable reference to its binding occurrence, narrows constraint records
//! across occurrences, and emits the boolean tests each matching stage must
//! run:
//! - `lhs` - the node arena and `LhsBuilder`
//! - `pattern_type` - entity-kind capabilities (facts, objects)
//! - `analyze` - binding analysis, propagation and checks
//! - `generate` - field tests, staging and hash hints
//! - `collapse` - deferred tests of negated groups
//! - `driver` - the `Compiler` pass and `compile`
//! - `diagnostics` - failure values

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod analyze;
mod collapse;
pub mod config;
pub mod diagnostics;
mod driver;
pub mod environment;
mod generate;
mod invariants;
pub mod lhs;
pub mod pattern_type;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod collapse_tests;
#[cfg(test)]
mod compile_tests;

pub use config::Config;
pub use diagnostics::{Diagnostic, DiagnosticKind, HandleConflict, Location};
pub use driver::{CompiledTree, Compiler, compile};
pub use environment::{Environment, FunctionSignature};
pub use lhs::{LhsBuilder, LhsNode, LhsTree, NodeId, NodeKind, NodeOutputs};
