//! Entity-shape capabilities.
//!
//! Each matchable entity kind knows how to address its fields and which
//! specialized tests it can emit. The analyzer only talks to entities
//! through `PatternType`, so supporting a new kind means adding a variant
//! to `PatternKind` and one implementation here.
//!
//! - `fact`: positional fields, specialized constant tests
//! - `object`: slots addressed by name, generic constant tests

mod fact;
mod object;

#[cfg(test)]
mod pattern_type_tests;

use rulenet_core::{Expr, Fetch, Literal, PatternKind, Segment, Side, SlotAddr, Symbol};

use crate::invariants;
use crate::lhs::{LhsNode, NodeKind};

pub use fact::FactPattern;
pub use object::ObjectPattern;

/// Which side of a join a value is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// The partial match, at the site's own join depth.
    Lhs,
    /// The entity entering the join.
    Rhs,
    /// The entity entering a join inside a negated group.
    NestedRhs,
}

/// Addressing information of one field occurrence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSite {
    pub kind: PatternKind,
    /// 0 for the entity itself.
    pub index: u32,
    pub name: Option<Symbol>,
    pub segment: Option<Segment>,
    pub join_depth: u32,
    pub negated: bool,
}

impl FieldSite {
    pub fn of(node: &LhsNode) -> Self {
        let index = match node.kind {
            NodeKind::Pattern { .. } => 0,
            _ => node.field,
        };
        Self {
            kind: invariants::pattern_kind(node),
            index,
            name: node.slot,
            segment: node.segment,
            join_depth: node.join_depth,
            negated: node.negated,
        }
    }

    pub fn side(&self, role: Role) -> Side {
        match role {
            Role::Lhs => Side::Lhs(self.join_depth),
            Role::Rhs => Side::Rhs,
            Role::NestedRhs => Side::NestedRhs(self.join_depth),
        }
    }

    /// Fetch addressing fields by position only.
    pub(crate) fn positional(&self, side: Side) -> Fetch {
        self.fetch(side, None)
    }

    /// Fetch addressing fields by slot name when one is known.
    pub(crate) fn named(&self, side: Side) -> Fetch {
        self.fetch(side, self.name)
    }

    fn fetch(&self, side: Side, name: Option<Symbol>) -> Fetch {
        let slot = if self.index == 0 {
            SlotAddr::Entity
        } else {
            SlotAddr::Field {
                index: self.index,
                name,
                segment: self.segment,
            }
        };
        Fetch {
            kind: self.kind,
            side,
            slot,
        }
    }
}

/// The eight operations an entity kind supplies to the compiler.
///
/// Generators returning `Option` may decline; the compiler then falls back
/// to a generic `eq`/`neq` over value extractions.
pub trait PatternType {
    /// Specialized constant test on a single candidate entity.
    fn gen_local_constant_test(&self, site: &FieldSite, value: Literal) -> Option<Expr>;

    /// Specialized constant test evaluated in a join.
    fn gen_join_constant_test(&self, site: &FieldSite, value: Literal, role: Role)
    -> Option<Expr>;

    /// Extract the field's value from the candidate entity.
    fn local_value(&self, site: &FieldSite) -> Expr;

    /// Extract the field's value from one side of a join.
    fn join_value(&self, site: &FieldSite, role: Role) -> Expr;

    /// Value of a variable bound at `origin`, read in a join.
    fn replace_with_join_value(&self, origin: &FieldSite, role: Role) -> Expr;

    /// Value of a variable bound at `origin`, read from the candidate entity.
    fn replace_with_local_value(&self, origin: &FieldSite) -> Expr;

    /// Compare two occurrences within one entity.
    fn compare_local_values(&self, site: &FieldSite, origin: &FieldSite) -> Option<Expr>;

    /// Compare an occurrence against an origin in an earlier pattern.
    ///
    /// `site_role` is `Rhs`, or `NestedRhs` in a negated group's join.
    /// `origin_role` is `Lhs`, or `NestedRhs` for an origin that is itself a
    /// member of that group.
    fn compare_join_values(
        &self,
        site: &FieldSite,
        origin: &FieldSite,
        site_role: Role,
        origin_role: Role,
    ) -> Option<Expr>;
}

static FACT: FactPattern = FactPattern;
static OBJECT: ObjectPattern = ObjectPattern;

/// The capability set of an entity kind.
pub fn descriptor(kind: PatternKind) -> &'static dyn PatternType {
    match kind {
        PatternKind::Fact => &FACT,
        PatternKind::Object => &OBJECT,
    }
}
