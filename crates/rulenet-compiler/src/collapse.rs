//! Negated-group test collapsing.
//!
//! Interior patterns of a negated group are not materialized on their own
//! in the network, so their deferred tests move to the group's first
//! pattern.

use rulenet_core::Expr;

use crate::driver::Compiler;
use crate::lhs::NodeId;

impl Compiler<'_> {
    /// For each run of elements opening a new negated depth, AND the
    /// members' deferred tests and hash lists onto the run's first element.
    ///
    /// A run starts at an element whose begin depth is above the outermost
    /// level and differs from the preceding element's end depth. Members
    /// are the elements at exactly that depth until one closes below it.
    pub(crate) fn collapse_negated_runs(&mut self) {
        let ces: Vec<NodeId> = self.tree.ces().collect();

        for (i, &start) in ces.iter().enumerate() {
            let depth = self.node(start).begin_depth;
            let prev_end = i
                .checked_sub(1)
                .map_or(0, |p| self.node(ces[p]).end_depth);
            if depth == 0 || depth == prev_end {
                continue;
            }

            let mut test: Option<Expr> = None;
            let mut left = Vec::new();
            let mut right = Vec::new();
            let mut members = 0;
            for &member in &ces[i..] {
                let node = self.node_mut(member);
                if node.begin_depth == depth {
                    test = Expr::conjoin(test, node.out.external_network_test.take());
                    left.append(&mut node.out.external_left_hash);
                    right.append(&mut node.out.external_right_hash);
                    members += 1;
                }
                if node.end_depth < depth {
                    break;
                }
            }

            tracing::trace!(ce = self.node(start).pattern, depth, members, "negated run collapsed");
            let out = &mut self.node_mut(start).out;
            out.external_network_test = test;
            out.external_left_hash = left;
            out.external_right_hash = right;
        }
    }
}
