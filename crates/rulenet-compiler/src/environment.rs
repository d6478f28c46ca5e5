//! Read-only tables consulted during compilation.
//!
//! An `Environment` is built once, before rules are compiled, and only
//! borrowed by `compile`. It owns the interner so every `Symbol` in an LHS
//! tree resolves against the same table.

use indexmap::{IndexMap, IndexSet};
use rulenet_core::{ConstraintRecord, Interner, Symbol};

/// Argument restrictions of a callable function.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FunctionSignature {
    /// Restrictions for leading positional arguments.
    positional: Vec<Option<ConstraintRecord>>,
    /// Restriction for arguments past `positional`.
    rest: Option<ConstraintRecord>,
}

impl FunctionSignature {
    /// Every argument admits `record`.
    pub fn uniform(record: ConstraintRecord) -> Self {
        Self {
            positional: Vec::new(),
            rest: Some(record),
        }
    }

    /// Restrictions by position. Arguments past the list are unrestricted.
    pub fn positional(args: impl IntoIterator<Item = Option<ConstraintRecord>>) -> Self {
        Self {
            positional: args.into_iter().collect(),
            rest: None,
        }
    }

    /// Restriction of the `index`th (0-based) argument.
    pub fn arg(&self, index: usize) -> Option<&ConstraintRecord> {
        match self.positional.get(index) {
            Some(slot) => slot.as_ref(),
            None => self.rest.as_ref(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Environment {
    interner: Interner,
    functions: IndexMap<Symbol, FunctionSignature>,
    globals: IndexSet<Symbol>,
}

impl Environment {
    /// Empty environment: no functions, no globals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment with the arithmetic, comparison and string functions.
    pub fn with_builtins() -> Self {
        let mut env = Self::new();
        for name in ["+", "-", "*", "/", ">", "<", ">=", "<=", "=", "<>", "abs", "mod"] {
            env.define_function(name, FunctionSignature::uniform(ConstraintRecord::numeric()));
        }
        env.define_function(
            "str-length",
            FunctionSignature::positional([Some(ConstraintRecord::lexeme())]),
        );
        env.define_function(
            "sub-string",
            FunctionSignature::positional([
                Some(ConstraintRecord::numeric()),
                Some(ConstraintRecord::numeric()),
                Some(ConstraintRecord::lexeme()),
            ]),
        );
        env
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn interner_mut(&mut self) -> &mut Interner {
        &mut self.interner
    }

    pub fn define_function(&mut self, name: &str, signature: FunctionSignature) -> Symbol {
        let sym = self.interner.intern(name);
        self.functions.insert(sym, signature);
        sym
    }

    pub fn define_global(&mut self, name: &str) -> Symbol {
        let sym = self.interner.intern(name);
        self.globals.insert(sym);
        sym
    }

    pub fn signature(&self, function: Symbol) -> Option<&FunctionSignature> {
        self.functions.get(&function)
    }

    pub fn is_global(&self, name: Symbol) -> bool {
        self.globals.contains(&name)
    }

    pub fn name(&self, sym: Symbol) -> &str {
        self.interner.try_resolve(sym).unwrap_or("<unknown>")
    }
}
