//! Variable binding analysis.
//!
//! Patterns are visited in order. Every variable field is a binding
//! occurrence for the occurrences after it: its name, arity and constraint
//! record are spread forward (`propagate`), then the field's own
//! constraints are checked (`check`) and compiled. Constraints implied by
//! literals and function arguments are spread the same way without
//! changing any origin (`derive`).

mod check;
mod derive;
mod propagate;


use rulenet_core::{Arity, ConstraintRecord};

use crate::diagnostics::Diagnostic;
use crate::driver::Compiler;
use crate::lhs::{NodeId, NodeKind};

pub(crate) use propagate::Binding;

impl Compiler<'_> {
    /// Handle first, then fields in order. Sub-fields of a multifield slot
    /// are visited in place of the slot.
    pub(crate) fn analyze_pattern(&mut self, ce: NodeId) -> Result<(), Diagnostic> {
        if self.node(ce).handle().is_some() {
            self.process_variable(ce, None, ce)?;
        }

        let fields: Vec<NodeId> = self.tree.fields(ce).collect();
        for field in fields {
            if self.node(field).kind == NodeKind::MultifieldSlot {
                let subfields: Vec<NodeId> = self.tree.subfields(field).collect();
                for sub in subfields {
                    self.visit_field(sub, Some(field), ce)?;
                }
            } else {
                self.visit_field(field, None, ce)?;
            }
        }
        Ok(())
    }

    pub(crate) fn analyze_test(&mut self, ce: NodeId) -> Result<(), Diagnostic> {
        let Some(root) = self.node(ce).subexpr else {
            return Ok(());
        };
        self.check_expression(root, ce)?;
        for binding in self.expression_constraints(root) {
            self.propagate_driver(ce, ce, None, &binding)?;
        }
        self.assemble_test(ce, root);
        Ok(())
    }

    fn visit_field(
        &mut self,
        field: NodeId,
        slot: Option<NodeId>,
        head: NodeId,
    ) -> Result<(), Diagnostic> {
        if self.node(field).variable().is_some() {
            self.process_variable(field, slot, head)
        } else {
            self.process_field(field, slot, head)
        }
    }

    fn process_variable(
        &mut self,
        id: NodeId,
        slot: Option<NodeId>,
        head: NodeId,
    ) -> Result<(), Diagnostic> {
        let kind = self.node(id).kind;
        match kind {
            NodeKind::Pattern {
                handle: Some(name),
            } => {
                let address = ConstraintRecord::address();
                self.node_mut(id).constraints = Some(address.clone());
                let binding = Binding {
                    name,
                    arity: Arity::Single,
                    origin: Some(id),
                    constraints: Some(address),
                };
                self.propagate_driver(head, id, None, &binding)
            }
            NodeKind::Variable { name, arity } => {
                let node = self.node(id);
                let binding = Binding {
                    name,
                    arity,
                    origin: Some(id),
                    constraints: node.constraints.clone(),
                };
                if let Some(child) = node.child {
                    let floor = self.node(head).begin_depth;
                    self.propagate_to_nodes(child, &binding, floor, false)?;
                }
                self.process_field(id, slot, head)?;
                self.propagate_driver(head, id, slot, &binding)
            }
            _ => Ok(()),
        }
    }

    fn process_field(
        &mut self,
        field: NodeId,
        slot: Option<NodeId>,
        head: NodeId,
    ) -> Result<(), Diagnostic> {
        for binding in self.derive_field_constraints(field) {
            self.propagate_driver(head, field, slot, &binding)?;
        }
        self.check_unbound_in_field(field)?;
        self.check_connected_constraints(field)?;
        self.field_conversion(field, head);
        Ok(())
    }
}
