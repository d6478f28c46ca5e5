//! Variable substitution in sub-expressions.
//!
//! Recursion here follows expression nesting, which `check_expression`
//! bounds before any substitution runs.

use rulenet_core::{Expr, Op};

use crate::driver::Compiler;
use crate::invariants;
use crate::lhs::{NodeId, NodeKind};
use crate::pattern_type::{FieldSite, Role, descriptor};

impl Compiler<'_> {
    /// Expression with variables read from a join.
    ///
    /// Inside a deferred test, references deeper than their origin read the
    /// partial match and the rest read the nested entity. Otherwise origins
    /// entering at the same join read the joining entity.
    pub(crate) fn getvar_replace(&self, id: NodeId, deferred: bool) -> Expr {
        let node = self.node(id);
        match node.kind {
            NodeKind::Variable { .. } => {
                let origin = self.node(invariants::origin(&self.tree, id));
                let role = match deferred {
                    true if node.begin_depth > origin.begin_depth => Role::Lhs,
                    true => Role::NestedRhs,
                    false if node.join_depth != origin.join_depth => Role::Lhs,
                    false => Role::Rhs,
                };
                let site = FieldSite::of(origin);
                descriptor(site.kind).replace_with_join_value(&site, role)
            }
            NodeKind::Call(function) => Expr::new(
                Op::Call(function),
                self.tree
                    .args(id)
                    .map(|arg| self.getvar_replace(arg, deferred))
                    .collect(),
            ),
            _ => self.expression_leaf(id),
        }
    }

    /// Expression with variables read from the candidate entity.
    pub(crate) fn getfield_replace(&self, id: NodeId) -> Expr {
        let node = self.node(id);
        match node.kind {
            NodeKind::Variable { .. } => {
                let origin = self.node(invariants::origin(&self.tree, id));
                let site = FieldSite::of(origin);
                descriptor(site.kind).replace_with_local_value(&site)
            }
            NodeKind::Call(function) => Expr::new(
                Op::Call(function),
                self.tree
                    .args(id)
                    .map(|arg| self.getfield_replace(arg))
                    .collect(),
            ),
            _ => self.expression_leaf(id),
        }
    }

    fn expression_leaf(&self, id: NodeId) -> Expr {
        match self.node(id).kind {
            NodeKind::Literal(value) => Expr::constant(value),
            NodeKind::Global(name) => Expr::leaf(Op::Global(name)),
            kind => invariants::not_an_expression(id, kind),
        }
    }

    /// Some variable in the expression is deeper than its origin.
    pub(crate) fn is_deferred_expression(&self, root: NodeId) -> bool {
        self.expression_variables(root)
            .into_iter()
            .any(|id| self.is_deeper_than_origin(id))
    }

    /// Every variable in the expression is bound in `pattern`.
    pub(crate) fn all_variables_in_expression(&self, root: NodeId, pattern: u32) -> bool {
        self.expression_variables(root)
            .into_iter()
            .all(|id| self.origin_pattern(id) == pattern)
    }

    /// Every reference in every alternative of `field` is bound in
    /// `pattern`.
    pub(crate) fn all_variables_in_pattern(&self, field: NodeId, pattern: u32) -> bool {
        self.tree.alternatives(field).all(|alternative| {
            self.tree
                .conjuncts(alternative)
                .all(|conjunct| match self.node(conjunct) {
                    n if n.variable().is_some() => self.origin_pattern(conjunct) == pattern,
                    n => n
                        .subexpr
                        .is_none_or(|root| self.all_variables_in_expression(root, pattern)),
                })
        })
    }

    /// Some reference of `field`, including its own variable, must be
    /// tested in the enclosing negated group's join.
    pub(crate) fn field_is_deferred(&self, field: NodeId) -> bool {
        let node = self.node(field);
        if node.variable().is_some() && node.referring.is_some() && self.is_deeper_than_origin(field)
        {
            return true;
        }
        self.tree.alternatives(field).any(|alternative| {
            self.tree
                .conjuncts(alternative)
                .any(|conjunct| match self.node(conjunct) {
                    n if n.variable().is_some() => self.is_deeper_than_origin(conjunct),
                    n => n
                        .subexpr
                        .is_some_and(|root| self.is_deferred_expression(root)),
                })
        })
    }

    fn is_deeper_than_origin(&self, id: NodeId) -> bool {
        let origin = invariants::origin(&self.tree, id);
        self.node(id).begin_depth > self.node(origin).begin_depth
    }

    fn origin_pattern(&self, id: NodeId) -> u32 {
        self.node(invariants::origin(&self.tree, id)).pattern
    }

    fn expression_variables(&self, root: NodeId) -> Vec<NodeId> {
        let mut variables = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            match node.kind {
                NodeKind::Variable { .. } => variables.push(id),
                NodeKind::Call(_) => stack.extend(self.tree.args(id)),
                _ => {}
            }
        }
        variables
    }
}
