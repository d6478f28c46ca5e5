//! Compiled test expressions.
//!
//! Every test the condition compiler emits is an `Expr`: an operator with an
//! ordered argument list. Value extraction from matched entities is an
//! explicit `Op::Get`, so the network builder can tell which memory a test
//! reads from without re-analyzing it.

use std::fmt;

use serde::Serialize;

use crate::{Interner, Literal, Symbol};

/// Closed set of matchable entity kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PatternKind {
    /// Facts: ordered or template facts, fields addressed by position.
    Fact,
    /// Object instances, slots addressed by name.
    Object,
}

impl PatternKind {
    pub fn name(self) -> &'static str {
        match self {
            PatternKind::Fact => "fact",
            PatternKind::Object => "object",
        }
    }
}

/// Where a value is fetched from when the test runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    /// The single entity under test, before any join.
    Local,
    /// The partial match, at the given join depth.
    Lhs(u32),
    /// The entity entering the current join.
    Rhs,
    /// The entity a negated group's join reads for the member pattern at
    /// the given join depth.
    NestedRhs(u32),
}

/// Position of a value inside a multifield slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Segment {
    /// Zero-based index among the slot's sub-fields.
    pub position: u32,
    /// The sub-field spans zero or more values.
    pub sequence: bool,
}

/// Which value of an entity is fetched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SlotAddr {
    /// The entity address itself (match handle).
    Entity,
    Field {
        /// One-based field index.
        index: u32,
        /// Slot name, for kinds that address slots by name.
        name: Option<Symbol>,
        segment: Option<Segment>,
    },
}

/// A value-extraction request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Fetch {
    pub kind: PatternKind,
    pub side: Side,
    pub slot: SlotAddr,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Op {
    Const(Literal),
    /// Named function call.
    Call(Symbol),
    /// Global variable value.
    Global(Symbol),
    And,
    Or,
    Not,
    Eq,
    Neq,
    Get(Fetch),
    /// Entity-specific constant test. Single argument: the constant.
    TestConstant { fetch: Fetch, negated: bool },
    /// Entity-specific comparison of two occurrences. No arguments.
    Compare {
        kind: PatternKind,
        left: Fetch,
        right: Fetch,
        negated: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Expr {
    pub op: Op,
    pub args: Vec<Expr>,
}

impl Expr {
    pub fn new(op: Op, args: Vec<Expr>) -> Self {
        Self { op, args }
    }

    pub fn leaf(op: Op) -> Self {
        Self::new(op, Vec::new())
    }

    pub fn constant(value: Literal) -> Self {
        Self::leaf(Op::Const(value))
    }

    pub fn get(fetch: Fetch) -> Self {
        Self::leaf(Op::Get(fetch))
    }

    pub fn not(arg: Expr) -> Self {
        Self::new(Op::Not, vec![arg])
    }

    /// `eq`, or `neq` when `negated`.
    pub fn equality(negated: bool, left: Expr, right: Expr) -> Self {
        let op = if negated { Op::Neq } else { Op::Eq };
        Self::new(op, vec![left, right])
    }

    /// Disjunction of the given tests. A single test is returned unwrapped.
    pub fn any_of(mut tests: Vec<Expr>) -> Option<Expr> {
        match tests.len() {
            0 => None,
            1 => tests.pop(),
            _ => Some(Self::new(Op::Or, tests)),
        }
    }

    /// Conjunction of two optional tests, flattening nested `and`s.
    pub fn conjoin(left: Option<Expr>, right: Option<Expr>) -> Option<Expr> {
        let (left, right) = match (left, right) {
            (None, e) | (e, None) => return e,
            (Some(l), Some(r)) => (l, r),
        };
        let mut args = Vec::new();
        for e in [left, right] {
            if e.op == Op::And {
                args.extend(e.args);
            } else {
                args.push(e);
            }
        }
        Some(Self::new(Op::And, args))
    }

    /// Visit every node, parents before children.
    pub fn walk(&self, f: &mut impl FnMut(&Expr)) {
        f(self);
        for arg in &self.args {
            arg.walk(f);
        }
    }

    /// Every fetch performed by this expression, in evaluation order.
    pub fn fetches(&self) -> Vec<Fetch> {
        let mut out = Vec::new();
        self.walk(&mut |e| match &e.op {
            Op::Get(f) | Op::TestConstant { fetch: f, .. } => out.push(*f),
            Op::Compare { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            _ => {}
        });
        out
    }

    /// Render with names resolved.
    pub fn display<'a>(&'a self, interner: &'a Interner) -> DisplayExpr<'a> {
        DisplayExpr {
            expr: self,
            interner,
        }
    }
}

/// S-expression rendering of an `Expr`.
pub struct DisplayExpr<'a> {
    expr: &'a Expr,
    interner: &'a Interner,
}

impl DisplayExpr<'_> {
    fn literal(&self, f: &mut fmt::Formatter<'_>, value: &Literal) -> fmt::Result {
        let name = |s: Symbol| self.interner.try_resolve(s).unwrap_or("<?>");
        match *value {
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Float(x) => write!(f, "{x:?}"),
            Literal::Symbol(s) => f.write_str(name(s)),
            Literal::String(s) => write!(f, "\"{}\"", name(s)),
            Literal::InstanceName(s) => write!(f, "[{}]", name(s)),
        }
    }

    fn fetch(&self, f: &mut fmt::Formatter<'_>, fetch: &Fetch) -> fmt::Result {
        write!(f, "{}:", fetch.kind.name())?;
        match fetch.side {
            Side::Local => f.write_str("local")?,
            Side::Lhs(depth) => write!(f, "lhs{depth}")?,
            Side::Rhs => f.write_str("rhs")?,
            Side::NestedRhs(depth) => write!(f, "nrhs{depth}")?,
        }
        f.write_str(":")?;
        match fetch.slot {
            SlotAddr::Entity => f.write_str("*"),
            SlotAddr::Field {
                index,
                name,
                segment,
            } => {
                match name.and_then(|s| self.interner.try_resolve(s)) {
                    Some(n) => f.write_str(n)?,
                    None => write!(f, "#{index}")?,
                }
                match segment {
                    Some(Segment {
                        position,
                        sequence: false,
                    }) => write!(f, "[{position}]"),
                    Some(Segment {
                        position,
                        sequence: true,
                    }) => write!(f, "[{position}..]"),
                    None => Ok(()),
                }
            }
        }
    }

    fn node(&self, f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
        let head = match &expr.op {
            Op::Const(v) => return self.literal(f, v),
            Op::Global(s) => {
                return write!(f, "?*{}*", self.interner.try_resolve(*s).unwrap_or("<?>"));
            }
            Op::Get(fetch) => return self.fetch(f, fetch),
            Op::Compare {
                kind,
                left,
                right,
                negated,
            } => {
                let cmp = if *negated { "neq" } else { "eq" };
                write!(f, "({}-{cmp} ", kind.name())?;
                self.fetch(f, left)?;
                f.write_str(" ")?;
                self.fetch(f, right)?;
                return f.write_str(")");
            }
            Op::TestConstant { fetch, negated } => {
                let cmp = if *negated { "neq" } else { "eq" };
                write!(f, "({}-const-{cmp} ", fetch.kind.name())?;
                self.fetch(f, fetch)?;
                for arg in &expr.args {
                    f.write_str(" ")?;
                    self.node(f, arg)?;
                }
                return f.write_str(")");
            }
            Op::Call(s) => self.interner.try_resolve(*s).unwrap_or("<?>"),
            Op::And => "and",
            Op::Or => "or",
            Op::Not => "not",
            Op::Eq => "eq",
            Op::Neq => "neq",
        };
        write!(f, "({head}")?;
        for arg in &expr.args {
            f.write_str(" ")?;
            self.node(f, arg)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for DisplayExpr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.node(f, self.expr)
    }
}
