use rulenet_core::{Expr, Literal, Op, PatternKind, Segment, Side};

use super::{FieldSite, PatternType, Role};

/// Facts: fields addressed by position.
#[derive(Clone, Copy, Debug, Default)]
pub struct FactPattern;

impl FactPattern {
    fn constant_test(site: &FieldSite, value: Literal, side: Side) -> Option<Expr> {
        // Sequence segments have no fixed width.
        if let Some(Segment { sequence: true, .. }) = site.segment {
            return None;
        }
        Some(Expr::new(
            Op::TestConstant {
                fetch: site.positional(side),
                negated: site.negated,
            },
            vec![Expr::constant(value)],
        ))
    }
}

impl PatternType for FactPattern {
    fn gen_local_constant_test(&self, site: &FieldSite, value: Literal) -> Option<Expr> {
        Self::constant_test(site, value, Side::Local)
    }

    fn gen_join_constant_test(
        &self,
        site: &FieldSite,
        value: Literal,
        role: Role,
    ) -> Option<Expr> {
        Self::constant_test(site, value, site.side(role))
    }

    fn local_value(&self, site: &FieldSite) -> Expr {
        Expr::get(site.positional(Side::Local))
    }

    fn join_value(&self, site: &FieldSite, role: Role) -> Expr {
        Expr::get(site.positional(site.side(role)))
    }

    fn replace_with_join_value(&self, origin: &FieldSite, role: Role) -> Expr {
        self.join_value(origin, role)
    }

    fn replace_with_local_value(&self, origin: &FieldSite) -> Expr {
        self.local_value(origin)
    }

    fn compare_local_values(&self, site: &FieldSite, origin: &FieldSite) -> Option<Expr> {
        Some(Expr::leaf(Op::Compare {
            kind: PatternKind::Fact,
            left: site.positional(Side::Local),
            right: origin.positional(Side::Local),
            negated: site.negated,
        }))
    }

    fn compare_join_values(
        &self,
        site: &FieldSite,
        origin: &FieldSite,
        site_role: Role,
        origin_role: Role,
    ) -> Option<Expr> {
        Some(Expr::leaf(Op::Compare {
            kind: PatternKind::Fact,
            left: site.positional(site.side(site_role)),
            right: origin.positional(origin.side(origin_role)),
            negated: site.negated,
        }))
    }
}
