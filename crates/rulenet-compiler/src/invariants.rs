//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use rulenet_core::PatternKind;

use crate::lhs::{LhsNode, LhsTree, NodeId, NodeKind};

/// Binding origin of a reference that analysis has already resolved.
pub(crate) fn origin(tree: &LhsTree, id: NodeId) -> NodeId {
    tree.node(id).referring.unwrap_or_else(|| {
        panic!(
            "LhsTree: node {} reached code generation without an origin \
             (unbound references must be rejected first)",
            id.index()
        )
    })
}

/// Entity kind of a node that lives inside a pattern.
pub(crate) fn pattern_kind(node: &LhsNode) -> PatternKind {
    node.pattern_kind.unwrap_or_else(|| {
        panic!(
            "LhsTree: node in CE #{} has no pattern kind \
             (only pattern fields and handles are addressable)",
            node.pattern
        )
    })
}

/// Only calls, variables, literals and globals appear in expressions.
pub(crate) fn not_an_expression(id: NodeId, kind: NodeKind) -> ! {
    panic!(
        "LhsTree: node {} of kind {kind:?} found inside an expression",
        id.index()
    )
}
