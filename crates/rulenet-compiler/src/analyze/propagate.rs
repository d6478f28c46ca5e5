//! Spreading a binding to same-named occurrences in scope.

use rulenet_core::{Arity, ConstraintRecord, Symbol};

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::driver::Compiler;
use crate::lhs::{NodeId, NodeKind};

/// A variable occurrence whose name, arity and constraints are spread.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Binding {
    pub name: Symbol,
    pub arity: Arity,
    /// Binding occurrence to record as the origin. `None` spreads
    /// constraints only.
    pub origin: Option<NodeId>,
    pub constraints: Option<ConstraintRecord>,
}

impl Compiler<'_> {
    /// Spread `binding`, found at `node`, to the rest of its slot, the rest
    /// of its pattern, and the elements after `head` that can see it.
    pub(crate) fn propagate_driver(
        &mut self,
        head: NodeId,
        node: NodeId,
        slot: Option<NodeId>,
        binding: &Binding,
    ) -> Result<(), Diagnostic> {
        let floor = self.node(head).begin_depth;

        if let Some(next) = slot.and_then(|s| self.node(s).next) {
            self.propagate_to_nodes(next, binding, floor, false)?;
        }
        if let Some(next) = self.node(node).next {
            self.propagate_to_nodes(next, binding, floor, false)?;
        }

        let h = self.node(head);
        let escapes = h.is_ce() && !h.negated && !h.exists && h.begin_depth <= h.end_depth;
        if escapes && let Some(child) = h.child {
            let from_test = h.kind == NodeKind::Test;
            self.propagate_to_nodes(child, binding, floor, from_test)?;
        }
        Ok(())
    }

    /// Visit every node reachable from `start`. Descent past a condition
    /// element stops once its end depth drops below `floor`.
    pub(crate) fn propagate_to_nodes(
        &mut self,
        start: NodeId,
        binding: &Binding,
        floor: u32,
        ignore_arity: bool,
    ) -> Result<(), Diagnostic> {
        let mut stack = vec![(start, ignore_arity)];

        while let Some((id, ignore_arity)) = stack.pop() {
            let node = self.node(id);
            if let Some(child) = node.child
                && (!node.is_ce() || node.end_depth >= floor)
            {
                stack.push((child, ignore_arity));
            }
            if let Some(next) = node.next {
                stack.push((next, ignore_arity));
            }
            if let Some(subexpr) = node.subexpr {
                stack.push((subexpr, true));
                continue;
            }

            let (kind, pattern) = (node.kind, node.pattern);
            match kind {
                NodeKind::Variable { name, arity } if name == binding.name => {
                    if !ignore_arity && arity != binding.arity {
                        return Err(self.mixing(id));
                    }
                    self.narrow(id, binding);
                    self.assign_origin(id, binding);
                }
                NodeKind::Pattern {
                    handle: Some(name),
                } if name == binding.name => {
                    if let Some(origin) = binding.origin {
                        if binding.arity.is_sequence() {
                            return Err(self.mixing(id));
                        }
                        tracing::trace!(ce = pattern, "handle name already bound");
                        self.node_mut(id).referring = Some(origin);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn narrow(&mut self, id: NodeId, binding: &Binding) {
        let Some(record) = &binding.constraints else {
            return;
        };
        let node = self.node_mut(id);
        if node.negated {
            return;
        }
        node.constraints = ConstraintRecord::intersect_opt(Some(record), node.constraints.as_ref());
    }

    /// Record `binding.origin` unless a closer origin is already set.
    fn assign_origin(&mut self, id: NodeId, binding: &Binding) {
        let Some(origin) = binding.origin else {
            return;
        };
        let node = self.node(id);
        let candidate = self.node(origin);
        let replace = match node.referring {
            None => true,
            Some(_) => {
                candidate.pattern == node.pattern || candidate.pattern_kind == node.pattern_kind
            }
        };
        if replace {
            tracing::trace!(
                ce = node.pattern,
                field = node.field,
                origin_ce = candidate.pattern,
                origin_field = candidate.field,
                "origin assigned"
            );
            self.node_mut(id).referring = Some(origin);
        }
    }

    fn mixing(&self, id: NodeId) -> Diagnostic {
        let node = self.node(id);
        let name = match node.kind {
            NodeKind::Variable { name, .. } => Some(name),
            _ => node.handle(),
        };
        let diag = self.error(DiagnosticKind::VariableKindMixing, id);
        match name {
            Some(name) => diag.variable(self.env.name(name)),
            None => diag,
        }
    }
}
