use indoc::indoc;
use rulenet_core::{ConstraintRecord, Violation};

use crate::lhs::{ConstraintSpec, ExprSpec, FieldSpec, LhsBuilder, LitSpec, PatternSpec};
use crate::test_utils::{compile_error, compile_error_with, compile_lhs, compile_lhs_with};
use crate::{Config, DiagnosticKind, Environment, compile};

fn binds(name: &str) -> PatternSpec {
    PatternSpec::fact().field(FieldSpec::var(name))
}

fn gt(var: &str, n: i64) -> ExprSpec {
    ExprSpec::call(">", [ExprSpec::var(var), ExprSpec::int(n)])
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn empty_lhs_compiles() {
    let c = compile_lhs(LhsBuilder::new());
    assert!(c.tree.tree().is_empty());
    assert_eq!(c.dump(), "");
}

#[test]
fn join_and_test_element() {
    init_tracing();
    let c = compile_lhs(
        LhsBuilder::new()
            .pattern(
                PatternSpec::fact()
                    .field(FieldSpec::lit(LitSpec::sym("order")))
                    .field(FieldSpec::var("x")),
            )
            .pattern(
                PatternSpec::fact()
                    .field(FieldSpec::lit(LitSpec::sym("item")))
                    .field(FieldSpec::var("x"))
                    .field(FieldSpec::var("qty")),
            )
            .test(gt("qty", 3)),
    );

    assert_eq!(
        c.dump(),
        indoc! {"
            CE #1
              #1 local: (fact-const-eq fact:local:#1 order)
              #1 selector: fact:local:#1 = order
            CE #2
              network: (fact-eq fact:rhs:#2 fact:lhs1:#2)
              left-hash: fact:lhs1:#2
              right-hash: fact:local:#2
              #1 local: (fact-const-eq fact:local:#1 item)
              #1 selector: fact:local:#1 = item
            CE #3
              network: (> fact:rhs:#3 3)
        "}
    );
}

#[test]
fn negated_pattern_reference() {
    let c = compile_lhs(LhsBuilder::new().pattern(binds("x")).not_pattern(binds("x")));

    insta::assert_snapshot!(c.external(2), @"(fact-eq fact:nrhs2:#1 fact:lhs1:#1)");
    assert_eq!(c.network(2), "-");
    let out = c.tree.outputs(c.ce(2));
    assert_eq!(c.render(out.external_left_hash.first()), "fact:lhs1:#1");
    assert_eq!(c.render(out.external_right_hash.first()), "fact:lhs2:#1");
}

#[test]
fn unbound_reference_fails() {
    let diag = compile_error(LhsBuilder::new().pattern(binds("x")).test(gt("y", 1)));
    insta::assert_snapshot!(diag, @"variable referenced before being defined: ?y in (> ...) at CE #2");
}

#[test]
fn kind_mixing_fails() {
    let diag = compile_error(
        LhsBuilder::new()
            .pattern(binds("x"))
            .pattern(PatternSpec::fact().field(FieldSpec::seq("x"))),
    );
    insta::assert_snapshot!(diag, @"variable used as both a single and a sequence variable: ?x at CE #2 field #1");
}

#[test]
fn mixing_within_multifield_slot() {
    let diag = compile_error(LhsBuilder::new().pattern(
        PatternSpec::fact().field(FieldSpec::multislot([FieldSpec::var("x"), FieldSpec::seq("x")])),
    ));
    assert_eq!(diag.kind, DiagnosticKind::VariableKindMixing);
    assert_eq!((diag.location.pattern, diag.location.field), (1, Some(1)));
}

#[test]
fn literal_outside_derived_type() {
    let lhs = || {
        LhsBuilder::new()
            .pattern(
                PatternSpec::fact()
                    .field(FieldSpec::var("x").and(ConstraintSpec::predicate(gt("x", 1)))),
            )
            .pattern(
                PatternSpec::fact()
                    .field(FieldSpec::var("x").and(ConstraintSpec::lit(LitSpec::sym("red")))),
            )
    };

    let diag = compile_error(lhs());
    assert_eq!(diag.kind, DiagnosticKind::LiteralConstraintViolation(Violation::Type));
    assert_eq!((diag.location.pattern, diag.location.field), (2, Some(1)));

    let config = Config::new().static_constraint_checking(false);
    assert!(compile_lhs_with(lhs(), Environment::with_builtins(), &config).is_ok());
}

#[test]
fn literal_outside_declared_range() {
    let diag = compile_error(
        LhsBuilder::new().pattern(
            PatternSpec::fact().slot(
                "age",
                FieldSpec::lit(LitSpec::int(200))
                    .declared(ConstraintRecord::numeric().with_range(Some(0.0), Some(150.0))),
            ),
        ),
    );
    insta::assert_snapshot!(diag, @"literal restriction value violates the range restriction: at CE #1 slot age");
}

#[test]
fn conflicting_declared_types_are_unmatchable() {
    let diag = compile_error(
        LhsBuilder::new()
            .pattern(
                PatternSpec::fact().field(FieldSpec::var("x").declared(ConstraintRecord::numeric())),
            )
            .pattern(
                PatternSpec::fact().field(FieldSpec::var("x").declared(ConstraintRecord::lexeme())),
            ),
    );
    assert_eq!(diag.kind, DiagnosticKind::UnmatchableConstraint);
    assert_eq!((diag.location.pattern, diag.location.field), (2, Some(1)));
    assert_eq!(diag.location.variable.as_deref(), Some("x"));
}

#[test]
fn contradictory_alternative_is_unmatchable() {
    let diag = compile_error(
        LhsBuilder::new()
            .pattern(
                PatternSpec::fact().field(FieldSpec::var("x").declared(ConstraintRecord::numeric())),
            )
            .pattern(
                PatternSpec::fact().field(
                    FieldSpec::any()
                        .declared(ConstraintRecord::lexeme())
                        .and(ConstraintSpec::var("x")),
                ),
            ),
    );
    assert_eq!(diag.kind, DiagnosticKind::UnmatchableConstraint);
    assert_eq!((diag.location.pattern, diag.location.field), (2, Some(1)));
    assert_eq!(diag.location.variable, None);
}

#[test]
fn unmatchable_reference_in_test_element() {
    let lhs = || {
        LhsBuilder::new()
            .pattern(
                PatternSpec::fact().field(
                    FieldSpec::var("x")
                        .declared(ConstraintRecord::lexeme())
                        .and(ConstraintSpec::predicate(gt("x", 1))),
                ),
            )
            .test(ExprSpec::call("eq", [ExprSpec::var("x"), ExprSpec::sym("foo")]))
    };

    let diag = compile_error(lhs());
    insta::assert_snapshot!(diag, @"constraints can never be satisfied: ?x in (eq ...) at CE #2");

    let config = Config::new().static_constraint_checking(false);
    let c = compile_lhs_with(lhs(), Environment::with_builtins(), &config).unwrap();
    insta::assert_snapshot!(c.network(2), @"(eq fact:rhs:#1 foo)");
}

#[test]
fn nesting_limit() {
    let nested = ExprSpec::call(
        "+",
        [
            ExprSpec::call(
                "+",
                [
                    ExprSpec::call("+", [ExprSpec::int(1), ExprSpec::int(2)]),
                    ExprSpec::int(3),
                ],
            ),
            ExprSpec::int(4),
        ],
    );
    let config = Config::new().max_depth(2);
    let diag = compile_error_with(
        LhsBuilder::new().test(nested.clone()),
        Environment::with_builtins(),
        &config,
    );
    insta::assert_snapshot!(diag, @"expression nested too deeply: in (+ ...) at CE #1");

    let c = compile_lhs(LhsBuilder::new().test(nested));
    insta::assert_snapshot!(c.network(1), @"(+ (+ (+ 1 2) 3) 4)");
}

#[test]
fn recompiling_output_is_stable() {
    let lhs = LhsBuilder::new()
        .pattern(PatternSpec::fact().handle("f").field(FieldSpec::var("x")))
        .not_group(
            LhsBuilder::new()
                .pattern(binds("x"))
                .test(ExprSpec::call("neq", [ExprSpec::var("f"), ExprSpec::var("x")])),
        )
        .pattern(PatternSpec::object().slot("color", FieldSpec::var("x")));
    let first = compile_lhs(lhs);

    let second = compile(first.tree.clone().into_tree(), &first.env, &Config::default()).unwrap();
    assert_eq!(second, first.tree);
    assert_eq!(
        serde_json::to_string(&second).unwrap(),
        serde_json::to_string(&first.tree).unwrap()
    );
}
