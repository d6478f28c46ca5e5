use crate::{Interner, Symbol};

#[test]
fn intern_deduplicates() {
    let mut interner = Interner::new();
    let a = interner.intern("?x");
    let b = interner.intern("?x");
    assert_eq!(a, b);
    assert_eq!(interner.len(), 1);
}

#[test]
fn symbols_follow_insertion_order() {
    let mut interner = Interner::new();
    let z: Symbol = interner.intern("zeta");
    let a = interner.intern("alpha");
    assert!(z < a);
    assert_eq!(interner.resolve(a), "alpha");
}

#[test]
fn get_does_not_intern() {
    let mut interner = Interner::new();
    interner.intern("age");
    assert!(interner.get("age").is_some());
    assert!(interner.get("color").is_none());
    assert_eq!(interner.len(), 1);
}

#[test]
fn try_resolve_foreign_symbol() {
    let mut big = Interner::new();
    big.intern("a");
    let b = big.intern("b");
    let small = Interner::new();
    assert!(small.try_resolve(b).is_none());
    assert!(small.is_empty());
}
