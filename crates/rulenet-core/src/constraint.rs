//! Constraint records: the set of values a field or variable may take.
//!
//! Records only ever narrow. `intersect` never admits a value that either
//! operand rejects, and `is_unmatchable` reports records that admit nothing.

use std::fmt;

use bitflags::bitflags;
use serde::Serialize;

use crate::Literal;

bitflags! {
    /// Primitive value types admitted by a record.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
    pub struct TypeSet: u16 {
        const SYMBOL = 1 << 0;
        const STRING = 1 << 1;
        const INTEGER = 1 << 2;
        const FLOAT = 1 << 3;
        const INSTANCE_NAME = 1 << 4;
        const FACT_ADDRESS = 1 << 5;
        const INSTANCE_ADDRESS = 1 << 6;
        const EXTERNAL_ADDRESS = 1 << 7;

        const NUMBER = Self::INTEGER.bits() | Self::FLOAT.bits();
        const LEXEME = Self::SYMBOL.bits() | Self::STRING.bits();
        const ADDRESS = Self::FACT_ADDRESS.bits() | Self::INSTANCE_ADDRESS.bits();
    }
}

/// Reason a literal was rejected by a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Violation {
    /// The literal's type is not admitted.
    Type,
    /// The literal is not among the allowed values.
    AllowedValue,
    /// The literal lies outside the numeric range.
    Range,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Type => f.write_str("type"),
            Violation::AllowedValue => f.write_str("allowed value"),
            Violation::Range => f.write_str("range"),
        }
    }
}

/// Inclusive numeric bounds. `None` is unbounded on that side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Range {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Range {
    pub fn contains(&self, n: f64) -> bool {
        self.min.is_none_or(|min| n >= min) && self.max.is_none_or(|max| n <= max)
    }

    pub fn is_empty(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
    }

    fn intersect(&self, other: &Range) -> Range {
        let min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        let max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Range { min, max }
    }
}

/// Permitted types, values, numeric range and value arity.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConstraintRecord {
    pub types: TypeSet,
    /// Explicit value list. `None` means any value of an admitted type.
    pub allowed: Option<Vec<Literal>>,
    pub range: Range,
    /// A single value may be bound.
    pub single: bool,
    /// A sequence of values may be bound.
    pub sequence: bool,
}

impl Default for ConstraintRecord {
    fn default() -> Self {
        Self::any()
    }
}

impl ConstraintRecord {
    /// Admits everything.
    pub fn any() -> Self {
        Self {
            types: TypeSet::all(),
            allowed: None,
            range: Range::default(),
            single: true,
            sequence: true,
        }
    }

    pub fn of_types(types: TypeSet) -> Self {
        Self {
            types,
            ..Self::any()
        }
    }

    pub fn numeric() -> Self {
        Self::of_types(TypeSet::NUMBER)
    }

    pub fn lexeme() -> Self {
        Self::of_types(TypeSet::LEXEME)
    }

    /// Entity addresses only, single-valued. Used for match handles.
    pub fn address() -> Self {
        Self::of_types(TypeSet::ADDRESS).single_only()
    }

    /// Exactly the given values.
    pub fn values(values: impl IntoIterator<Item = Literal>) -> Self {
        let allowed: Vec<Literal> = values.into_iter().collect();
        let types = allowed
            .iter()
            .fold(TypeSet::empty(), |acc, v| acc | v.type_bit());
        Self {
            types,
            allowed: Some(allowed),
            ..Self::any()
        }
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.range = Range { min, max };
        self
    }

    pub fn single_only(mut self) -> Self {
        self.sequence = false;
        self
    }

    pub fn sequence_only(mut self) -> Self {
        self.single = false;
        self
    }

    /// Intersection of two records.
    pub fn intersect(&self, other: &ConstraintRecord) -> ConstraintRecord {
        let allowed = match (&self.allowed, &other.allowed) {
            (Some(a), Some(b)) => Some(a.iter().filter(|v| b.contains(v)).copied().collect()),
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (None, None) => None,
        };
        let mut rv = ConstraintRecord {
            types: self.types & other.types,
            allowed,
            range: self.range.intersect(&other.range),
            single: self.single && other.single,
            sequence: self.sequence && other.sequence,
        };
        rv.normalize();
        rv
    }

    /// Intersection where `None` stands for "no constraint".
    pub fn intersect_opt(
        a: Option<&ConstraintRecord>,
        b: Option<&ConstraintRecord>,
    ) -> Option<ConstraintRecord> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.intersect(b)),
            (Some(c), None) | (None, Some(c)) => Some(c.clone()),
            (None, None) => None,
        }
    }

    /// Whether no value at all satisfies the record.
    pub fn is_unmatchable(&self) -> bool {
        if !self.single && !self.sequence {
            return true;
        }
        if self.types.is_empty() {
            return true;
        }
        matches!(&self.allowed, Some(values) if values.is_empty())
    }

    /// Check a literal against the record.
    pub fn check_value(&self, value: &Literal) -> Result<(), Violation> {
        if !self.types.contains(value.type_bit()) {
            return Err(Violation::Type);
        }
        if let Some(allowed) = &self.allowed
            && !allowed.contains(value)
        {
            return Err(Violation::AllowedValue);
        }
        if let Some(n) = value.as_number()
            && !self.range.contains(n)
        {
            return Err(Violation::Range);
        }
        Ok(())
    }

    /// Drop types and values the remaining restrictions exclude.
    fn normalize(&mut self) {
        if self.range.is_empty() {
            self.types.remove(TypeSet::NUMBER);
        }
        if let Some(values) = &mut self.allowed {
            let types = self.types;
            let range = self.range;
            values.retain(|v| {
                types.contains(v.type_bit()) && v.as_number().is_none_or(|n| range.contains(n))
            });
            self.types &= values
                .iter()
                .fold(TypeSet::empty(), |acc, v| acc | v.type_bit());
        }
    }
}
