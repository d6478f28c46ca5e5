//! Reference and satisfiability checks.

use rulenet_core::{Arity, ConstraintRecord, Symbol};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::driver::Compiler;
use crate::lhs::{NodeId, NodeKind};

impl Compiler<'_> {
    /// Every conjunct variable of `field` has an origin, sub-expressions
    /// are well formed, and literals fit the field's record.
    pub(crate) fn check_unbound_in_field(&self, field: NodeId) -> Result<(), Diagnostic> {
        let record = self.node(field).constraints.clone().unwrap_or_default();

        for alternative in self.tree.alternatives(field) {
            for conjunct in self.tree.conjuncts(alternative) {
                let node = self.node(conjunct);
                match node.kind {
                    NodeKind::Variable { name, .. } if node.referring.is_none() => {
                        return Err(self
                            .error(DiagnosticKind::UnboundVariableReference, field)
                            .variable(self.env.name(name)));
                    }
                    NodeKind::Predicate | NodeKind::ReturnValue => {
                        if let Some(root) = node.subexpr {
                            self.check_expression(root, field)?;
                        }
                    }
                    NodeKind::Literal(value) if self.config.checks_static_constraints() => {
                        if let Err(violation) = record.check_value(&value) {
                            return Err(self.error(
                                DiagnosticKind::LiteralConstraintViolation(violation),
                                field,
                            ));
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Check the expression rooted at `root`; errors are located at `at`.
    pub(crate) fn check_expression(&self, root: NodeId, at: NodeId) -> Result<(), Diagnostic> {
        self.check_expression_node(root, None, at, 1)
    }

    fn check_expression_node(
        &self,
        id: NodeId,
        enclosing: Option<Symbol>,
        at: NodeId,
        depth: usize,
    ) -> Result<(), Diagnostic> {
        if depth > self.config.depth_limit() {
            return Err(self.reference_error(DiagnosticKind::NestingTooDeep, at, None, enclosing));
        }

        let node = self.node(id);
        match node.kind {
            NodeKind::Variable { name, arity } => {
                if node.referring.is_none() {
                    return Err(self.reference_error(
                        DiagnosticKind::UnboundVariableReference,
                        at,
                        Some(self.env.name(name).to_owned()),
                        enclosing,
                    ));
                }
                let unmatchable = node
                    .constraints
                    .as_ref()
                    .is_some_and(ConstraintRecord::is_unmatchable);
                let checked = self.config.checks_static_constraints();
                if arity == Arity::Single && unmatchable && checked {
                    return Err(self.reference_error(
                        DiagnosticKind::UnmatchableConstraint,
                        at,
                        Some(self.env.name(name).to_owned()),
                        enclosing,
                    ));
                }
            }
            NodeKind::Global(name) if !self.env.is_global(name) => {
                return Err(self.reference_error(
                    DiagnosticKind::UnboundVariableReference,
                    at,
                    Some(format!("*{}*", self.env.name(name))),
                    enclosing,
                ));
            }
            NodeKind::Call(function) => {
                for arg in self.tree.args(id) {
                    self.check_expression_node(arg, Some(function), at, depth + 1)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// A field whose variable, or every alternative, admits no value.
    pub(crate) fn check_connected_constraints(&self, field: NodeId) -> Result<(), Diagnostic> {
        let node = self.node(field);
        let unmatchable = node
            .constraints
            .as_ref()
            .is_some_and(ConstraintRecord::is_unmatchable);
        if let Some((name, _)) = node.variable()
            && unmatchable
        {
            return Err(self
                .error(DiagnosticKind::UnmatchableConstraint, field)
                .variable(self.env.name(name)));
        }

        let base = node.constraints.clone().unwrap_or_default();
        let mut alternatives = self.tree.alternatives(field).peekable();
        if alternatives.peek().is_none() {
            return Ok(());
        }
        let satisfiable = alternatives.any(|alternative| {
            let record = self
                .tree
                .conjuncts(alternative)
                .map(|c| self.node(c))
                .filter(|c| c.variable().is_some() && !c.negated)
                .filter_map(|c| c.constraints.as_ref())
                .fold(base.clone(), |acc, r| acc.intersect(r));
            !record.is_unmatchable()
        });
        if satisfiable {
            return Ok(());
        }
        Err(self.error(DiagnosticKind::UnmatchableConstraint, field))
    }

    fn reference_error(
        &self,
        kind: DiagnosticKind,
        at: NodeId,
        variable: Option<String>,
        enclosing: Option<Symbol>,
    ) -> Diagnostic {
        let mut diag = self.error(kind, at);
        diag.location.variable = variable;
        diag.location.function = enclosing.map(|f| self.env.name(f).to_owned());
        diag
    }
}
