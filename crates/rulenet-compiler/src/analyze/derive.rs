//! Constraints implied by a field's literals and by function arguments.

use indexmap::IndexMap;
use indexmap::map::Entry;
use rulenet_core::{Arity, ConstraintRecord, Symbol};

use super::Binding;
use crate::driver::Compiler;
use crate::lhs::{NodeId, NodeKind};

impl Compiler<'_> {
    /// Records a single-alternative field places on its variables.
    ///
    /// Positive literals restrict the variables conjoined with them;
    /// predicate and return-value calls restrict their arguments.
    pub(crate) fn derive_field_constraints(&self, field: NodeId) -> Vec<Binding> {
        let mut alternatives = self.tree.alternatives(field);
        let (Some(alternative), None) = (alternatives.next(), alternatives.next()) else {
            return Vec::new();
        };

        let literals = self
            .tree
            .conjuncts(alternative)
            .map(|c| self.node(c))
            .filter(|c| !c.negated)
            .filter_map(|c| match c.kind {
                NodeKind::Literal(value) => Some(ConstraintRecord::values([value])),
                _ => None,
            })
            .reduce(|acc, r| acc.intersect(&r));

        let mut derived = IndexMap::new();
        for conjunct in self.tree.conjuncts(alternative) {
            let node = self.node(conjunct);
            match node.kind {
                NodeKind::Variable { name, arity } if !node.negated => {
                    if let Some(record) = &literals {
                        merge(&mut derived, name, arity, record.clone());
                    }
                }
                NodeKind::Predicate | NodeKind::ReturnValue => {
                    let Some(root) = node.subexpr else { continue };
                    for binding in self.expression_constraints(root) {
                        if let Some(record) = binding.constraints {
                            merge(&mut derived, binding.name, binding.arity, record);
                        }
                    }
                }
                _ => {}
            }
        }
        derived.into_values().collect()
    }

    /// Argument restrictions of every known function called in the
    /// expression, keyed by the variables passed to them.
    pub(crate) fn expression_constraints(&self, root: NodeId) -> Vec<Binding> {
        let mut derived = IndexMap::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            let NodeKind::Call(function) = self.node(id).kind else {
                continue;
            };
            let signature = self.env.signature(function);
            let args: Vec<NodeId> = self.tree.args(id).collect();
            for (i, &arg) in args.iter().enumerate() {
                let restriction = signature.and_then(|s| s.arg(i));
                if let (Some((name, arity)), Some(record)) = (self.node(arg).variable(), restriction)
                {
                    merge(&mut derived, name, arity, record.clone());
                }
            }
            stack.extend(args.into_iter().rev());
        }
        derived.into_values().collect()
    }
}

fn merge(
    derived: &mut IndexMap<Symbol, Binding>,
    name: Symbol,
    arity: Arity,
    record: ConstraintRecord,
) {
    match derived.entry(name) {
        Entry::Occupied(mut entry) => {
            let binding = entry.get_mut();
            binding.constraints =
                ConstraintRecord::intersect_opt(binding.constraints.as_ref(), Some(&record));
        }
        Entry::Vacant(entry) => {
            entry.insert(Binding {
                name,
                arity,
                origin: None,
                constraints: Some(record),
            });
        }
    }
}
