use rulenet_core::{Expr, Literal, Op, PatternKind, Side};

use super::{FieldSite, PatternType, Role};

/// Object instances: slots addressed by name.
#[derive(Clone, Copy, Debug, Default)]
pub struct ObjectPattern;

impl PatternType for ObjectPattern {
    fn gen_local_constant_test(&self, _site: &FieldSite, _value: Literal) -> Option<Expr> {
        None
    }

    fn gen_join_constant_test(
        &self,
        _site: &FieldSite,
        _value: Literal,
        _role: Role,
    ) -> Option<Expr> {
        None
    }

    fn local_value(&self, site: &FieldSite) -> Expr {
        Expr::get(site.named(Side::Local))
    }

    fn join_value(&self, site: &FieldSite, role: Role) -> Expr {
        Expr::get(site.named(site.side(role)))
    }

    fn replace_with_join_value(&self, origin: &FieldSite, role: Role) -> Expr {
        self.join_value(origin, role)
    }

    fn replace_with_local_value(&self, origin: &FieldSite) -> Expr {
        self.local_value(origin)
    }

    fn compare_local_values(&self, site: &FieldSite, origin: &FieldSite) -> Option<Expr> {
        Some(Expr::leaf(Op::Compare {
            kind: PatternKind::Object,
            left: site.named(Side::Local),
            right: origin.named(Side::Local),
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
            kind: PatternKind::Object,
            left: site.named(site.side(site_role)),
            right: origin.named(origin.side(origin_role)),
            negated: site.negated,
        }))
    }
}
