//! Per-field merging of alternative tests.

use rulenet_core::Expr;

use super::Stage;
use crate::driver::Compiler;
use crate::lhs::NodeId;
use crate::pattern_type::{FieldSite, Role, descriptor};

impl Compiler<'_> {
    /// Compile `field` and attach its tests: the local test to the field,
    /// join and deferred tests (with hash hints) to `head`.
    pub(crate) fn field_conversion(&mut self, field: NodeId, head: NodeId) {
        let pattern = self.node(field).pattern;
        let alternatives: Vec<NodeId> = self.tree.alternatives(field).collect();

        // An alternated field that reaches outside the pattern is tested at
        // the join as a whole.
        let in_pattern = alternatives.len() < 2 || self.all_variables_in_pattern(field, pattern);
        let deferred = self.field_is_deferred(field);

        let mut local = Vec::new();
        let mut join = Vec::new();
        let mut nested = Vec::new();
        let mut hint = None;
        for &alternative in &alternatives {
            let mut tests = self.extract_alternative(alternative, in_pattern, deferred);
            if alternatives.len() == 1 && tests.hints.len() == 1 {
                hint = tests.hints.pop();
            }
            local.extend(tests.local);
            join.extend(tests.join);
            nested.extend(tests.deferred);
        }
        let mut local = Expr::any_of(local);
        let mut join = Expr::any_of(join);
        let mut nested = Expr::any_of(nested);

        let mut hashes = Hashes::default();
        let node = self.node(field);
        if let (Some(_), Some(origin)) = (node.variable(), node.referring) {
            let origin_node = self.node(origin);
            if origin_node.pattern == node.pattern {
                local = Expr::conjoin(self.compare_local(field, origin), local);
            } else {
                let site = FieldSite::of(node);
                let origin_site = FieldSite::of(origin_node);
                // The hoisted variable routes on its own depth, not the field's.
                let deeper = node.begin_depth > origin_node.begin_depth;
                let comparison = self.compare_join(field, origin, deeper);
                let left = descriptor(origin_site.kind).join_value(&origin_site, Role::Lhs);
                if deeper {
                    nested = Expr::conjoin(comparison, nested);
                    hashes.external_right = Some(descriptor(site.kind).join_value(&site, Role::Lhs));
                    hashes.external_left = Some(left);
                } else {
                    join = Expr::conjoin(comparison, join);
                    hashes.right = Some(descriptor(site.kind).local_value(&site));
                    hashes.left = Some(left);
                }
            }
        }

        tracing::trace!(
            ce = pattern,
            field = self.node(field).field,
            local = local.is_some(),
            join = join.is_some(),
            deferred = nested.is_some(),
            "field compiled"
        );

        let out = &mut self.node_mut(field).out;
        out.local_test = local;
        if let Some((selector, value)) = hint {
            out.constant_selector = Some(selector);
            out.constant_value = Some(value);
        }

        let out = &mut self.node_mut(head).out;
        out.network_test = Expr::conjoin(out.network_test.take(), join);
        out.external_network_test = Expr::conjoin(out.external_network_test.take(), nested);
        out.left_hash.extend(hashes.left);
        out.right_hash.extend(hashes.right);
        out.external_left_hash.extend(hashes.external_left);
        out.external_right_hash.extend(hashes.external_right);
    }

    /// Compile a test element's expression onto the element itself.
    pub(crate) fn assemble_test(&mut self, ce: NodeId, root: NodeId) {
        let deferred = self.is_deferred_expression(root);
        let test = self.getvar_replace(root, deferred);
        let stage = Stage::join(deferred);
        tracing::trace!(ce = self.node(ce).pattern, ?stage, "test compiled");

        let out = &mut self.node_mut(ce).out;
        match stage {
            Stage::Deferred => out.external_network_test = Some(test),
            _ => out.network_test = Some(test),
        }
    }
}

/// Hash-index expressions produced by one field.
#[derive(Default)]
struct Hashes {
    left: Option<Expr>,
    right: Option<Expr>,
    external_left: Option<Expr>,
    external_right: Option<Expr>,
}
