//! Arena representation of a rule's left-hand side.
//!
//! Nodes are addressed by `NodeId` and linked through two named links:
//!
//! - A condition element's `next` is its first field; its `child` is the
//!   following condition element.
//! - A field's `next` is the following field; its `child` is its first
//!   alternative. A multifield slot's `child` is its first sub-field
//!   instead.
//! - An alternative's `next` is the following conjunct (`&`); its `child`
//!   is the following alternative (`|`).
//! - Inside an expression (`subexpr`), `next` is the following argument and
//!   a call's `child` is its first argument.
//!
//! Analysis fills `constraints`, `referring` and `out` in place. Everything
//! else is set by `LhsBuilder` and never changes.

mod builder;


pub use builder::{ConstraintSpec, ExprSpec, FieldSpec, LhsBuilder, LitSpec, PatternSpec};

use rulenet_core::{Arity, ConstraintRecord, Expr, Literal, PatternKind, Segment, Symbol};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum NodeKind {
    /// Pattern condition element, optionally binding a match handle.
    Pattern { handle: Option<Symbol> },
    /// Boolean test condition element; the expression is in `subexpr`.
    Test,
    Variable { name: Symbol, arity: Arity },
    /// Field without a variable (`?` or `$?`).
    Wildcard { arity: Arity },
    /// Multifield slot header; sub-fields hang off `child`.
    MultifieldSlot,
    Literal(Literal),
    /// `:(expr)`: the expression must hold.
    Predicate,
    /// `=(expr)`: the field must equal the expression's value.
    ReturnValue,
    Call(Symbol),
    Global(Symbol),
}

/// Per-node outputs consumed by the network builder.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NodeOutputs {
    /// Field test run against a single candidate entity.
    pub local_test: Option<Expr>,
    /// Pattern join test.
    pub network_test: Option<Expr>,
    /// Pattern join test deferred to the enclosing negated group.
    pub external_network_test: Option<Expr>,
    pub left_hash: Vec<Expr>,
    pub right_hash: Vec<Expr>,
    pub external_left_hash: Vec<Expr>,
    pub external_right_hash: Vec<Expr>,
    /// Value extraction for a constant-indexed local lookup.
    pub constant_selector: Option<Expr>,
    pub constant_value: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LhsNode {
    pub kind: NodeKind,
    pub next: Option<NodeId>,
    pub child: Option<NodeId>,
    /// Expression root of a predicate, return-value or test node.
    pub subexpr: Option<NodeId>,
    /// 1-based index of the owning condition element.
    pub pattern: u32,
    /// Ordinal of the pattern whose join evaluates this node.
    pub join_depth: u32,
    /// 1-based field index; 0 on condition elements.
    pub field: u32,
    pub slot: Option<Symbol>,
    pub segment: Option<Segment>,
    pub begin_depth: u32,
    pub end_depth: u32,
    pub negated: bool,
    pub exists: bool,
    /// Entity kind of the owning pattern. `None` inside test elements.
    pub pattern_kind: Option<PatternKind>,
    /// Restriction known before analysis (e.g. from a slot definition).
    pub declared: Option<ConstraintRecord>,
    pub constraints: Option<ConstraintRecord>,
    /// Binding occurrence this node refers to.
    pub referring: Option<NodeId>,
    pub out: NodeOutputs,
}

impl LhsNode {
    pub fn is_ce(&self) -> bool {
        matches!(self.kind, NodeKind::Pattern { .. } | NodeKind::Test)
    }

    /// Name and arity, for variable nodes.
    pub fn variable(&self) -> Option<(Symbol, Arity)> {
        match self.kind {
            NodeKind::Variable { name, arity } => Some((name, arity)),
            _ => None,
        }
    }

    pub fn handle(&self) -> Option<Symbol> {
        match self.kind {
            NodeKind::Pattern { handle } => handle,
            _ => None,
        }
    }

    /// Reset everything analysis derives.
    fn reset(&mut self) {
        self.constraints = self.declared.clone();
        self.referring = None;
        self.out = NodeOutputs::default();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LhsTree {
    nodes: Vec<LhsNode>,
    first: Option<NodeId>,
}

impl LhsTree {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.first
    }

    /// # Panics
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &LhsNode {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut LhsNode {
        &mut self.nodes[id.index()]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &LhsNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Condition elements in LHS order.
    pub fn ces(&self) -> Chain<'_> {
        Chain::new(self, self.first, Link::Child)
    }

    /// Condition element by 1-based index.
    pub fn ce(&self, index: u32) -> Option<NodeId> {
        self.ces().find(|&id| self.node(id).pattern == index)
    }

    /// Top-level fields of a pattern. Multifield slots appear as one entry.
    pub fn fields(&self, ce: NodeId) -> Chain<'_> {
        Chain::new(self, self.node(ce).next, Link::Next)
    }

    /// Field of a pattern by 1-based index.
    pub fn field(&self, ce: NodeId, index: u32) -> Option<NodeId> {
        self.fields(ce).find(|&id| self.node(id).field == index)
    }

    /// Sub-fields of a multifield slot.
    pub fn subfields(&self, slot: NodeId) -> Chain<'_> {
        Chain::new(self, self.node(slot).child, Link::Next)
    }

    /// First conjunct of every alternative of a field.
    pub fn alternatives(&self, field: NodeId) -> Chain<'_> {
        Chain::new(self, self.node(field).child, Link::Child)
    }

    /// Conjuncts of one alternative, starting at the alternative itself.
    pub fn conjuncts(&self, alternative: NodeId) -> Chain<'_> {
        Chain::new(self, Some(alternative), Link::Next)
    }

    /// Arguments of an expression call node.
    pub fn args(&self, call: NodeId) -> Chain<'_> {
        Chain::new(self, self.node(call).child, Link::Next)
    }

    pub(crate) fn reset(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Link {
    Next,
    Child,
}

/// Iterator following one link kind.
pub struct Chain<'a> {
    tree: &'a LhsTree,
    cur: Option<NodeId>,
    link: Link,
}

impl<'a> Chain<'a> {
    fn new(tree: &'a LhsTree, start: Option<NodeId>, link: Link) -> Self {
        Self {
            tree,
            cur: start,
            link,
        }
    }
}

impl Iterator for Chain<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cur?;
        let node = self.tree.node(id);
        self.cur = match self.link {
            Link::Next => node.next,
            Link::Child => node.child,
        };
        Some(id)
    }
}
