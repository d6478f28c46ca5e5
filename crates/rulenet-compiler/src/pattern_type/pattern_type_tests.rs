use rulenet_core::{Expr, Interner, Literal, PatternKind, Segment};

use crate::pattern_type::{FieldSite, Role, descriptor};

fn site(kind: PatternKind, index: u32, join_depth: u32) -> FieldSite {
    FieldSite {
        kind,
        index,
        name: None,
        segment: None,
        join_depth,
        negated: false,
    }
}

fn render(interner: &Interner, expr: Option<Expr>) -> String {
    match expr {
        Some(e) => e.display(interner).to_string(),
        None => "-".to_owned(),
    }
}

#[test]
fn fact_constant_test_is_specialized() {
    let interner = Interner::new();
    let fact = descriptor(PatternKind::Fact);
    let field = site(PatternKind::Fact, 2, 1);

    let local = fact.gen_local_constant_test(&field, Literal::Integer(3));
    assert_eq!(render(&interner, local), "(fact-const-eq fact:local:#2 3)");

    let negated = FieldSite {
        negated: true,
        ..field
    };
    let join = fact.gen_join_constant_test(&negated, Literal::Integer(3), Role::NestedRhs);
    assert_eq!(render(&interner, join), "(fact-const-neq fact:nrhs1:#2 3)");
}

#[test]
fn fact_sequence_segment_declines_constant_test() {
    let fact = descriptor(PatternKind::Fact);
    let field = FieldSite {
        segment: Some(Segment {
            position: 1,
            sequence: true,
        }),
        ..site(PatternKind::Fact, 1, 1)
    };
    assert_eq!(fact.gen_local_constant_test(&field, Literal::Integer(1)), None);
}

#[test]
fn object_slots_are_addressed_by_name() {
    let mut interner = Interner::new();
    let color = interner.intern("color");
    let object = descriptor(PatternKind::Object);
    let slot = FieldSite {
        name: Some(color),
        ..site(PatternKind::Object, 3, 2)
    };

    assert_eq!(object.gen_local_constant_test(&slot, Literal::Integer(1)), None);
    assert_eq!(
        render(&interner, Some(object.local_value(&slot))),
        "object:local:color"
    );
    assert_eq!(
        render(&interner, Some(object.join_value(&slot, Role::Lhs))),
        "object:lhs2:color"
    );
}

#[test]
fn fact_ignores_slot_names() {
    let mut interner = Interner::new();
    let color = interner.intern("color");
    let fact = descriptor(PatternKind::Fact);
    let slot = FieldSite {
        name: Some(color),
        ..site(PatternKind::Fact, 3, 2)
    };
    assert_eq!(render(&interner, Some(fact.local_value(&slot))), "fact:local:#3");
}

#[test]
fn join_comparison_reads_origin_from_partial_match() {
    let interner = Interner::new();
    let fact = descriptor(PatternKind::Fact);
    let field = site(PatternKind::Fact, 1, 3);
    let origin = site(PatternKind::Fact, 2, 1);

    assert_eq!(
        render(&interner, fact.compare_join_values(&field, &origin, Role::Rhs, Role::Lhs)),
        "(fact-eq fact:rhs:#1 fact:lhs1:#2)"
    );
    assert_eq!(
        render(
            &interner,
            fact.compare_join_values(&field, &origin, Role::NestedRhs, Role::Lhs)
        ),
        "(fact-eq fact:nrhs3:#1 fact:lhs1:#2)"
    );
    // Origin inside the same negated group.
    assert_eq!(
        render(
            &interner,
            fact.compare_join_values(&field, &origin, Role::NestedRhs, Role::NestedRhs)
        ),
        "(fact-eq fact:nrhs3:#1 fact:nrhs1:#2)"
    );

    let negated = FieldSite {
        negated: true,
        ..field
    };
    assert_eq!(
        render(&interner, fact.compare_local_values(&negated, &origin)),
        "(fact-neq fact:local:#1 fact:local:#2)"
    );
}

#[test]
fn handle_site_fetches_the_entity() {
    let interner = Interner::new();
    let fact = descriptor(PatternKind::Fact);
    let handle = site(PatternKind::Fact, 0, 1);

    assert_eq!(
        render(&interner, Some(fact.replace_with_join_value(&handle, Role::Lhs))),
        "fact:lhs1:*"
    );
    assert_eq!(
        render(&interner, Some(fact.replace_with_local_value(&handle))),
        "fact:local:*"
    );
}
