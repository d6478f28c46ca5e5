//! Conjunct-level test extraction.

use rulenet_core::Expr;
use smallvec::SmallVec;

use crate::driver::Compiler;
use crate::invariants;
use crate::lhs::{NodeId, NodeKind};
use crate::pattern_type::{FieldSite, Role, descriptor};

/// Where a test runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stage {
    /// Against a single candidate entity.
    Local,
    /// In the pattern's join.
    Join,
    /// In the join of the enclosing negated group.
    Deferred,
}

impl Stage {
    pub(crate) fn join(deferred: bool) -> Self {
        if deferred { Stage::Deferred } else { Stage::Join }
    }
}

/// Tests produced by one alternative of a field.
#[derive(Debug, Default)]
pub(crate) struct StageTests {
    pub local: Option<Expr>,
    pub join: Option<Expr>,
    pub deferred: Option<Expr>,
    /// (selector, value) pairs of positive literals tested locally.
    pub hints: SmallVec<[(Expr, Expr); 1]>,
}

impl StageTests {
    fn add(&mut self, stage: Stage, test: Option<Expr>) {
        let slot = match stage {
            Stage::Local => &mut self.local,
            Stage::Join => &mut self.join,
            Stage::Deferred => &mut self.deferred,
        };
        *slot = Expr::conjoin(slot.take(), test);
    }
}

fn negate_if(negated: bool, expr: Expr) -> Expr {
    if negated { Expr::not(expr) } else { expr }
}

impl Compiler<'_> {
    /// Tests of every conjunct of one alternative.
    ///
    /// `in_pattern` is false when the field must be tested at the join as a
    /// whole; `deferred` routes join tests to the negated group's join.
    pub(crate) fn extract_alternative(
        &self,
        alternative: NodeId,
        in_pattern: bool,
        deferred: bool,
    ) -> StageTests {
        let mut tests = StageTests::default();
        for conjunct in self.tree.conjuncts(alternative) {
            self.extract_conjunct(conjunct, in_pattern, deferred, &mut tests);
        }
        tests
    }

    fn extract_conjunct(
        &self,
        id: NodeId,
        in_pattern: bool,
        deferred: bool,
        tests: &mut StageTests,
    ) {
        let node = self.node(id);
        let site = FieldSite::of(node);
        let ops = descriptor(site.kind);
        let join_stage = Stage::join(deferred);
        let role = if deferred { Role::NestedRhs } else { Role::Rhs };

        match node.kind {
            NodeKind::Literal(value) => {
                if in_pattern {
                    let test = ops.gen_local_constant_test(&site, value).unwrap_or_else(|| {
                        Expr::equality(site.negated, ops.local_value(&site), Expr::constant(value))
                    });
                    tests.add(Stage::Local, Some(test));
                    if !node.negated {
                        tests
                            .hints
                            .push((ops.local_value(&site), Expr::constant(value)));
                    }
                } else {
                    let test = ops.gen_join_constant_test(&site, value, role).unwrap_or_else(|| {
                        Expr::equality(
                            site.negated,
                            ops.join_value(&site, role),
                            Expr::constant(value),
                        )
                    });
                    tests.add(join_stage, Some(test));
                }
            }
            NodeKind::Predicate => {
                let Some(root) = node.subexpr else { return };
                if in_pattern && self.all_variables_in_expression(root, node.pattern) {
                    let test = negate_if(node.negated, self.getfield_replace(root));
                    tests.add(Stage::Local, Some(test));
                } else {
                    let test = negate_if(node.negated, self.getvar_replace(root, deferred));
                    tests.add(join_stage, Some(test));
                }
            }
            NodeKind::ReturnValue => {
                let Some(root) = node.subexpr else { return };
                if in_pattern && self.all_variables_in_expression(root, node.pattern) {
                    let test = Expr::equality(
                        node.negated,
                        ops.local_value(&site),
                        self.getfield_replace(root),
                    );
                    tests.add(Stage::Local, Some(test));
                } else {
                    let test = Expr::equality(
                        node.negated,
                        ops.join_value(&site, role),
                        self.getvar_replace(root, deferred),
                    );
                    tests.add(join_stage, Some(test));
                }
            }
            NodeKind::Variable { .. } => {
                let origin = invariants::origin(&self.tree, id);
                if in_pattern && self.node(origin).pattern == node.pattern {
                    tests.add(Stage::Local, self.compare_local(id, origin));
                } else {
                    tests.add(join_stage, self.compare_join(id, origin, deferred));
                }
            }
            _ => {}
        }
    }

    /// Comparison of two occurrences inside one pattern.
    pub(crate) fn compare_local(&self, id: NodeId, origin: NodeId) -> Option<Expr> {
        let site = FieldSite::of(self.node(id));
        let origin = FieldSite::of(self.node(origin));
        descriptor(site.kind).compare_local_values(&site, &origin)
    }

    /// Comparison of an occurrence against an origin in another pattern.
    ///
    /// Same-kind pairs use the kind's comparator; mixed pairs fall back to
    /// `eq`/`neq` over both extractions.
    pub(crate) fn compare_join(&self, id: NodeId, origin: NodeId, deferred: bool) -> Option<Expr> {
        let (site_role, origin_role) = self.join_roles(id, origin, deferred);
        let site = FieldSite::of(self.node(id));
        let origin = FieldSite::of(self.node(origin));
        if site.kind == origin.kind {
            return descriptor(site.kind).compare_join_values(&site, &origin, site_role, origin_role);
        }
        Some(Expr::equality(
            site.negated,
            descriptor(site.kind).join_value(&site, site_role),
            descriptor(origin.kind).join_value(&origin, origin_role),
        ))
    }

    /// Sides a join comparison reads. In a negated group's join, an origin
    /// bound at the reference's own depth is a member of that group.
    fn join_roles(&self, id: NodeId, origin: NodeId, deferred: bool) -> (Role, Role) {
        if !deferred {
            return (Role::Rhs, Role::Lhs);
        }
        if self.node(id).begin_depth == self.node(origin).begin_depth {
            (Role::NestedRhs, Role::NestedRhs)
        } else {
            (Role::NestedRhs, Role::Lhs)
        }
    }
}
