//! Primitive literal values that may appear as constant restrictions.

use serde::Serialize;

use crate::Symbol;
use crate::constraint::TypeSet;

/// A constant restriction value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Symbol(Symbol),
    String(Symbol),
    InstanceName(Symbol),
}

impl Literal {
    /// The single type bit this literal belongs to.
    pub fn type_bit(&self) -> TypeSet {
        match self {
            Literal::Integer(_) => TypeSet::INTEGER,
            Literal::Float(_) => TypeSet::FLOAT,
            Literal::Symbol(_) => TypeSet::SYMBOL,
            Literal::String(_) => TypeSet::STRING,
            Literal::InstanceName(_) => TypeSet::INSTANCE_NAME,
        }
    }

    /// Numeric view used for range checks.
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Literal::Integer(i) => Some(i as f64),
            Literal::Float(f) => Some(f),
            _ => None,
        }
    }
}

/// Value arity of a variable or a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Arity {
    /// Exactly one value (`?x`).
    Single,
    /// Zero or more values (`$?x`).
    Sequence,
}

impl Arity {
    pub fn is_sequence(self) -> bool {
        matches!(self, Arity::Sequence)
    }
}
