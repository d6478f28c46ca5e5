use indoc::indoc;

use rulenet_core::Side;

use crate::lhs::{ExprSpec, FieldSpec, LhsBuilder, PatternSpec};
use crate::test_utils::compile_lhs;

fn binds(names: &[&str]) -> PatternSpec {
    names
        .iter()
        .fold(PatternSpec::fact(), |p, name| p.field(FieldSpec::var(name)))
}

#[test]
fn group_tests_move_to_first_member() {
    let c = compile_lhs(
        LhsBuilder::new().pattern(binds(&["x", "y"])).not_group(
            LhsBuilder::new()
                .pattern(binds(&["x"]))
                .pattern(binds(&["y"]))
                .pattern(binds(&["x"])),
        ),
    );

    assert_eq!(
        c.dump(),
        indoc! {"
            CE #1
            CE #2
              external: (and (fact-eq fact:nrhs2:#1 fact:lhs1:#1) (fact-eq fact:nrhs3:#1 fact:lhs1:#2))
              external-left-hash: fact:lhs1:#1, fact:lhs1:#2
              external-right-hash: fact:lhs2:#1, fact:lhs3:#1
            CE #3
            CE #4
              network: (fact-eq fact:rhs:#1 fact:lhs2:#1)
              left-hash: fact:lhs2:#1
              right-hash: fact:local:#1
        "}
    );
}

#[test]
fn deferred_test_element_moves_to_first_member() {
    let c = compile_lhs(
        LhsBuilder::new().pattern(binds(&["x"])).not_group(
            LhsBuilder::new()
                .pattern(binds(&["y"]))
                .test(ExprSpec::call(">", [ExprSpec::var("y"), ExprSpec::var("x")])),
        ),
    );

    insta::assert_snapshot!(c.external(2), @"(> fact:nrhs2:#1 fact:lhs1:#1)");
    assert_eq!(c.external(3), "-");
    assert_eq!(c.network(3), "-");
}

#[test]
fn single_negated_pattern_keeps_its_tests() {
    let c = compile_lhs(
        LhsBuilder::new()
            .pattern(binds(&["x"]))
            .not_pattern(binds(&["x"]))
            .pattern(binds(&["x"])),
    );

    assert_eq!(
        c.dump(),
        indoc! {"
            CE #1
            CE #2
              external: (fact-eq fact:nrhs2:#1 fact:lhs1:#1)
              external-left-hash: fact:lhs1:#1
              external-right-hash: fact:lhs2:#1
            CE #3
              network: (fact-eq fact:rhs:#1 fact:lhs1:#1)
              left-hash: fact:lhs1:#1
              right-hash: fact:local:#1
        "}
    );
}

#[test]
fn inner_group_is_collapsed_separately() {
    let c = compile_lhs(
        LhsBuilder::new().pattern(binds(&["x"])).not_group(
            LhsBuilder::new()
                .pattern(binds(&["y"]))
                .not_group(LhsBuilder::new().pattern(binds(&["x", "y"]))),
        ),
    );

    let depths: Vec<(u32, u32)> = c
        .tree
        .tree()
        .ces()
        .map(|id| {
            let node = c.tree.tree().node(id);
            (node.begin_depth, node.end_depth)
        })
        .collect();
    assert_eq!(depths, vec![(0, 0), (1, 1), (2, 0)]);

    assert_eq!(c.external(2), "-");
    insta::assert_snapshot!(
        c.external(3),
        @"(and (fact-eq fact:nrhs3:#1 fact:lhs1:#1) (fact-eq fact:nrhs3:#2 fact:lhs2:#1))"
    );
    let out = c.tree.outputs(c.ce(3));
    assert_eq!(out.external_left_hash.len(), 2);
    assert!(c.tree.outputs(c.ce(2)).external_right_hash.is_empty());
}

#[test]
fn collapsed_tests_keep_member_sides_apart() {
    let c = compile_lhs(
        LhsBuilder::new().pattern(binds(&["x", "y"])).not_group(
            LhsBuilder::new()
                .pattern(binds(&["x"]))
                .pattern(binds(&["y"]))
                .pattern(binds(&["x"])),
        ),
    );
    let external = c.tree.outputs(c.ce(2)).external_network_test.as_ref();
    let nested: Vec<Side> = external
        .map(|e| e.fetches())
        .unwrap_or_default()
        .into_iter()
        .map(|f| f.side)
        .filter(|side| matches!(side, Side::NestedRhs(_)))
        .collect();
    assert_eq!(nested, [Side::NestedRhs(2), Side::NestedRhs(3)]);
}
