//! Construction of `LhsTree`s.
//!
//! The parser and the reorderer describe a rule's LHS with the `*Spec`
//! values below and hand them to `LhsBuilder::build`, which numbers
//! condition elements and fields, interns names, and links the arena.
//!
//! Negation depth 0 is the outermost level. `not_pattern` places a single
//! pattern one level deeper and closes back on the same element;
//! `not_group` places every member one level deeper and closes on the last
//! member.

use rulenet_core::{Arity, ConstraintRecord, Interner, Literal, PatternKind, Segment, Symbol};

use super::{LhsNode, LhsTree, NodeId, NodeKind, NodeOutputs};

#[derive(Clone, Debug, PartialEq)]
pub enum LitSpec {
    Integer(i64),
    Float(f64),
    Symbol(String),
    String(String),
    InstanceName(String),
}

impl LitSpec {
    pub fn int(value: i64) -> Self {
        LitSpec::Integer(value)
    }

    pub fn float(value: f64) -> Self {
        LitSpec::Float(value)
    }

    pub fn sym(name: &str) -> Self {
        LitSpec::Symbol(name.to_owned())
    }

    pub fn string(text: &str) -> Self {
        LitSpec::String(text.to_owned())
    }

    pub fn instance(name: &str) -> Self {
        LitSpec::InstanceName(name.to_owned())
    }

    fn lower(&self, interner: &mut Interner) -> Literal {
        match self {
            LitSpec::Integer(i) => Literal::Integer(*i),
            LitSpec::Float(f) => Literal::Float(*f),
            LitSpec::Symbol(s) => Literal::Symbol(interner.intern(s)),
            LitSpec::String(s) => Literal::String(interner.intern(s)),
            LitSpec::InstanceName(s) => Literal::InstanceName(interner.intern(s)),
        }
    }
}

/// Sub-expression of a test element or of a predicate / return-value
/// constraint.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprSpec {
    Call(String, Vec<ExprSpec>),
    Var(String, Arity),
    Lit(LitSpec),
    /// Global variable, by bare name (`?*limit*` is `limit`).
    Global(String),
}

impl ExprSpec {
    pub fn call(name: &str, args: impl IntoIterator<Item = ExprSpec>) -> Self {
        ExprSpec::Call(name.to_owned(), args.into_iter().collect())
    }

    pub fn var(name: &str) -> Self {
        ExprSpec::Var(name.to_owned(), Arity::Single)
    }

    pub fn seq(name: &str) -> Self {
        ExprSpec::Var(name.to_owned(), Arity::Sequence)
    }

    pub fn int(value: i64) -> Self {
        ExprSpec::Lit(LitSpec::Integer(value))
    }

    pub fn sym(name: &str) -> Self {
        ExprSpec::Lit(LitSpec::sym(name))
    }

    pub fn lit(value: LitSpec) -> Self {
        ExprSpec::Lit(value)
    }

    pub fn global(name: &str) -> Self {
        ExprSpec::Global(name.to_owned())
    }
}

#[derive(Clone, Debug, PartialEq)]
enum ConstraintShape {
    Literal(LitSpec),
    Variable(String, Arity),
    Predicate(ExprSpec),
    ReturnValue(ExprSpec),
}

/// One conjunct of a field alternative.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintSpec {
    shape: ConstraintShape,
    negated: bool,
}

impl ConstraintSpec {
    fn new(shape: ConstraintShape) -> Self {
        Self {
            shape,
            negated: false,
        }
    }

    pub fn lit(value: LitSpec) -> Self {
        Self::new(ConstraintShape::Literal(value))
    }

    /// Reference to a single-value variable.
    pub fn var(name: &str) -> Self {
        Self::new(ConstraintShape::Variable(name.to_owned(), Arity::Single))
    }

    /// Reference to a sequence variable.
    pub fn seq(name: &str) -> Self {
        Self::new(ConstraintShape::Variable(name.to_owned(), Arity::Sequence))
    }

    pub fn predicate(expr: ExprSpec) -> Self {
        Self::new(ConstraintShape::Predicate(expr))
    }

    pub fn return_value(expr: ExprSpec) -> Self {
        Self::new(ConstraintShape::ReturnValue(expr))
    }

    /// `~` connective.
    pub fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
enum FieldShape {
    Variable(String, Arity),
    Wildcard(Arity),
    Multi(Vec<FieldSpec>),
}

impl FieldShape {
    fn arity(&self) -> Arity {
        match self {
            FieldShape::Variable(_, arity) | FieldShape::Wildcard(arity) => *arity,
            FieldShape::Multi(_) => Arity::Sequence,
        }
    }
}

/// A pattern field: an optional binding variable plus alternatives of
/// conjoined constraints.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    shape: FieldShape,
    slot: Option<String>,
    alternatives: Vec<Vec<ConstraintSpec>>,
    declared: Option<ConstraintRecord>,
}

impl FieldSpec {
    fn new(shape: FieldShape) -> Self {
        Self {
            shape,
            slot: None,
            alternatives: Vec::new(),
            declared: None,
        }
    }

    /// Field binding a single-value variable (`?x`).
    pub fn var(name: &str) -> Self {
        Self::new(FieldShape::Variable(name.to_owned(), Arity::Single))
    }

    /// Field binding a sequence variable (`$?x`).
    pub fn seq(name: &str) -> Self {
        Self::new(FieldShape::Variable(name.to_owned(), Arity::Sequence))
    }

    /// Single-value field without a variable.
    pub fn any() -> Self {
        Self::new(FieldShape::Wildcard(Arity::Single))
    }

    pub fn any_seq() -> Self {
        Self::new(FieldShape::Wildcard(Arity::Sequence))
    }

    /// Field restricted to one constant.
    pub fn lit(value: LitSpec) -> Self {
        Self::any().and(ConstraintSpec::lit(value))
    }

    /// Multifield slot matched by positioned sub-fields.
    pub fn multislot(subfields: impl IntoIterator<Item = FieldSpec>) -> Self {
        Self::new(FieldShape::Multi(subfields.into_iter().collect()))
    }

    /// Add a conjunct to the current alternative.
    pub fn and(mut self, constraint: ConstraintSpec) -> Self {
        match self.alternatives.last_mut() {
            Some(alt) => alt.push(constraint),
            None => self.alternatives.push(vec![constraint]),
        }
        self
    }

    /// Start a new alternative.
    pub fn or(mut self, constraint: ConstraintSpec) -> Self {
        self.alternatives.push(vec![constraint]);
        self
    }

    /// Restriction declared for the slot.
    pub fn declared(mut self, record: ConstraintRecord) -> Self {
        self.declared = Some(record);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PatternSpec {
    kind: PatternKind,
    handle: Option<String>,
    fields: Vec<FieldSpec>,
}

impl PatternSpec {
    pub fn new(kind: PatternKind) -> Self {
        Self {
            kind,
            handle: None,
            fields: Vec::new(),
        }
    }

    pub fn fact() -> Self {
        Self::new(PatternKind::Fact)
    }

    pub fn object() -> Self {
        Self::new(PatternKind::Object)
    }

    /// Bind the matched entity's address (`?name <- (...)`).
    pub fn handle(mut self, name: &str) -> Self {
        self.handle = Some(name.to_owned());
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn slot(mut self, name: &str, mut field: FieldSpec) -> Self {
        field.slot = Some(name.to_owned());
        self.fields.push(field);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
enum CeShape {
    Pattern(PatternSpec),
    Test(ExprSpec),
}

#[derive(Clone, Debug, PartialEq)]
struct CeSpec {
    shape: CeShape,
    begin: u32,
    end: u32,
    negated: bool,
    exists: bool,
}

impl CeSpec {
    fn new(shape: CeShape) -> Self {
        Self {
            shape,
            begin: 0,
            end: 0,
            negated: false,
            exists: false,
        }
    }
}

/// Ordered list of condition elements, lowered into an `LhsTree`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LhsBuilder {
    ces: Vec<CeSpec>,
}

impl LhsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pattern(mut self, pattern: PatternSpec) -> Self {
        self.ces.push(CeSpec::new(CeShape::Pattern(pattern)));
        self
    }

    pub fn test(mut self, expr: ExprSpec) -> Self {
        self.ces.push(CeSpec::new(CeShape::Test(expr)));
        self
    }

    /// `(not <pattern>)`.
    pub fn not_pattern(mut self, pattern: PatternSpec) -> Self {
        let mut ce = CeSpec::new(CeShape::Pattern(pattern));
        ce.begin = 1;
        ce.negated = true;
        self.ces.push(ce);
        self
    }

    /// `(exists <pattern>)`. Bindings inside do not escape the element.
    pub fn exists_pattern(mut self, pattern: PatternSpec) -> Self {
        let mut ce = CeSpec::new(CeShape::Pattern(pattern));
        ce.exists = true;
        self.ces.push(ce);
        self
    }

    /// `(not (and ...))` over the members of `group`.
    pub fn not_group(mut self, group: LhsBuilder) -> Self {
        let count = group.ces.len();
        for (i, mut ce) in group.ces.into_iter().enumerate() {
            ce.begin += 1;
            if i + 1 < count {
                ce.end += 1;
            }
            self.ces.push(ce);
        }
        self
    }

    /// Override the negation depths of the last element.
    pub fn depths(mut self, begin: u32, end: u32) -> Self {
        if let Some(ce) = self.ces.last_mut() {
            ce.begin = begin;
            ce.end = end;
        }
        self
    }

    pub fn build(self, interner: &mut Interner) -> LhsTree {
        let mut lowering = Lowering {
            interner,
            nodes: Vec::new(),
        };
        let mut first = None;
        let mut prev: Option<NodeId> = None;
        let mut ordinal = 0;

        for (i, ce) in self.ces.into_iter().enumerate() {
            let mut site = Site {
                pattern: i as u32 + 1,
                join_depth: ordinal,
                field: 0,
                slot: None,
                segment: None,
                begin: ce.begin,
                end: ce.end,
                kind: None,
            };
            let id = match ce.shape {
                CeShape::Pattern(pattern) => {
                    ordinal += 1;
                    site.join_depth = ordinal;
                    site.kind = Some(pattern.kind);
                    let handle = pattern.handle.as_deref().map(|h| lowering.interner.intern(h));
                    let id = lowering.push(NodeKind::Pattern { handle }, &site);
                    let fields = pattern
                        .fields
                        .iter()
                        .enumerate()
                        .map(|(j, f)| {
                            let mut field_site = site.clone();
                            field_site.field = j as u32 + 1;
                            lowering.field(f, field_site)
                        })
                        .collect::<Vec<_>>();
                    lowering.node(id).next = lowering.link_next(&fields);
                    id
                }
                CeShape::Test(expr) => {
                    let id = lowering.push(NodeKind::Test, &site);
                    let root = lowering.expr(&expr, &site);
                    lowering.node(id).subexpr = Some(root);
                    id
                }
            };
            let node = lowering.node(id);
            node.negated = ce.negated;
            node.exists = ce.exists;

            match prev {
                Some(p) => lowering.node(p).child = Some(id),
                None => first = Some(id),
            }
            prev = Some(id);
        }

        LhsTree {
            nodes: lowering.nodes,
            first,
        }
    }
}

/// Attributes shared by every node lowered at one position.
#[derive(Clone)]
struct Site {
    pattern: u32,
    join_depth: u32,
    field: u32,
    slot: Option<Symbol>,
    segment: Option<Segment>,
    begin: u32,
    end: u32,
    kind: Option<PatternKind>,
}

struct Lowering<'a> {
    interner: &'a mut Interner,
    nodes: Vec<LhsNode>,
}

impl Lowering<'_> {
    fn push(&mut self, kind: NodeKind, site: &Site) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(LhsNode {
            kind,
            next: None,
            child: None,
            subexpr: None,
            pattern: site.pattern,
            join_depth: site.join_depth,
            field: site.field,
            slot: site.slot,
            segment: site.segment,
            begin_depth: site.begin,
            end_depth: site.end,
            negated: false,
            exists: false,
            pattern_kind: site.kind,
            declared: None,
            constraints: None,
            referring: None,
            out: NodeOutputs::default(),
        });
        id
    }

    fn node(&mut self, id: NodeId) -> &mut LhsNode {
        &mut self.nodes[id.index()]
    }

    /// Chain `ids` through `next`, returning the head.
    fn link_next(&mut self, ids: &[NodeId]) -> Option<NodeId> {
        for pair in ids.windows(2) {
            self.node(pair[0]).next = Some(pair[1]);
        }
        ids.first().copied()
    }

    fn field(&mut self, spec: &FieldSpec, mut site: Site) -> NodeId {
        if let Some(slot) = &spec.slot {
            site.slot = Some(self.interner.intern(slot));
        }
        let kind = match &spec.shape {
            FieldShape::Variable(name, arity) => NodeKind::Variable {
                name: self.interner.intern(name),
                arity: *arity,
            },
            FieldShape::Wildcard(arity) => NodeKind::Wildcard { arity: *arity },
            FieldShape::Multi(_) => NodeKind::MultifieldSlot,
        };
        let id = self.push(kind, &site);
        self.node(id).declared = spec.declared.clone();

        if let FieldShape::Multi(subfields) = &spec.shape {
            let subs = subfields
                .iter()
                .enumerate()
                .map(|(k, sub)| {
                    let mut sub_site = site.clone();
                    sub_site.segment = Some(Segment {
                        position: k as u32,
                        sequence: sub.shape.arity().is_sequence(),
                    });
                    self.field(sub, sub_site)
                })
                .collect::<Vec<_>>();
            self.node(id).child = self.link_next(&subs);
            return id;
        }

        let mut heads = Vec::new();
        for alternative in &spec.alternatives {
            let conjuncts = alternative
                .iter()
                .map(|c| self.constraint(c, &site))
                .collect::<Vec<_>>();
            if let Some(head) = self.link_next(&conjuncts) {
                heads.push(head);
            }
        }
        for pair in heads.windows(2) {
            self.node(pair[0]).child = Some(pair[1]);
        }
        self.node(id).child = heads.first().copied();
        id
    }

    fn constraint(&mut self, spec: &ConstraintSpec, site: &Site) -> NodeId {
        let id = match &spec.shape {
            ConstraintShape::Literal(lit) => {
                let value = lit.lower(self.interner);
                self.push(NodeKind::Literal(value), site)
            }
            ConstraintShape::Variable(name, arity) => {
                let name = self.interner.intern(name);
                self.push(
                    NodeKind::Variable {
                        name,
                        arity: *arity,
                    },
                    site,
                )
            }
            ConstraintShape::Predicate(expr) | ConstraintShape::ReturnValue(expr) => {
                let kind = match spec.shape {
                    ConstraintShape::Predicate(_) => NodeKind::Predicate,
                    _ => NodeKind::ReturnValue,
                };
                let id = self.push(kind, site);
                let root = self.expr(expr, site);
                self.node(id).subexpr = Some(root);
                id
            }
        };
        self.node(id).negated = spec.negated;
        id
    }

    fn expr(&mut self, spec: &ExprSpec, site: &Site) -> NodeId {
        match spec {
            ExprSpec::Call(name, args) => {
                let name = self.interner.intern(name);
                let id = self.push(NodeKind::Call(name), site);
                let args = args.iter().map(|a| self.expr(a, site)).collect::<Vec<_>>();
                self.node(id).child = self.link_next(&args);
                id
            }
            ExprSpec::Var(name, arity) => {
                let name = self.interner.intern(name);
                self.push(
                    NodeKind::Variable {
                        name,
                        arity: *arity,
                    },
                    site,
                )
            }
            ExprSpec::Lit(lit) => {
                let value = lit.lower(self.interner);
                self.push(NodeKind::Literal(value), site)
            }
            ExprSpec::Global(name) => {
                let name = self.interner.intern(name);
                self.push(NodeKind::Global(name), site)
            }
        }
    }
}
