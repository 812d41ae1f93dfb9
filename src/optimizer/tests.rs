use pretty_assertions::assert_eq;

use super::{optimize, CompileTimeError};
use crate::ast::{BinaryOp, Node};
use crate::evaluator::RuntimeError;
use crate::parser::parse;
use crate::visitor::reads_variable;

fn optimized(source: &str) -> Node {
    optimize(&parse(source).unwrap()).unwrap()
}

#[test]
fn arithmetic_constants_fold() {
    assert_eq!(optimized("1 + 2 * 3"), Node::Number(7.0));
    assert_eq!(optimized("2 ^ 3 ^ 2"), Node::Number(512.0));
    assert_eq!(optimized("-(1 + 1)"), Node::Number(-2.0));
    assert_eq!(optimized(r#""a" + "b""#), Node::string("ab"));
}

#[test]
fn folding_stops_at_variables() {
    assert_eq!(
        optimized("x + 2 * 3"),
        Node::binary(BinaryOp::Add, Node::identifier("x"), Node::Number(6.0))
    );
}

#[test]
fn constant_division_by_zero_is_a_compile_error() {
    assert_eq!(
        optimize(&parse("1 / 0").unwrap()),
        Err(CompileTimeError(RuntimeError::DivisionByZero))
    );
    assert_eq!(
        optimize(&parse("10 % (5 - 5)").unwrap()),
        Err(CompileTimeError(RuntimeError::ModuloByZero))
    );
}

#[test]
fn non_constant_division_is_left_alone() {
    assert!(optimize(&parse("1 / x").unwrap()).is_ok());
    assert!(optimize(&parse("x = 0; 1 / x").unwrap()).is_ok());
}

#[test]
fn constant_conditions_select_a_branch() {
    assert_eq!(optimized("true ? 1 : 2"), Node::Number(1.0));
    assert_eq!(optimized("false ? 1 : 2"), Node::Number(2.0));
    // The dead branch is dropped without being folded, so a statically
    // broken never-taken branch does not fail compilation.
    assert_eq!(optimized("true ? 1 : 1 / 0"), Node::Number(1.0));
}

#[test]
fn constant_non_boolean_condition_fails() {
    assert!(matches!(
        optimize(&parse("1 ? 2 : 3").unwrap()),
        Err(CompileTimeError(RuntimeError::TypeMismatch { .. }))
    ));
}

#[test]
fn logical_folding_respects_the_short_circuit() {
    assert_eq!(optimized("false && f()"), Node::Boolean(false));
    assert_eq!(optimized("true || f()"), Node::Boolean(true));
    // A non-deciding constant left cannot drop the right side.
    assert_eq!(
        optimized("true && b"),
        Node::binary(BinaryOp::And, Node::Boolean(true), Node::identifier("b"))
    );
    assert_eq!(optimized("true && false"), Node::Boolean(false));
    assert_eq!(optimized("false || true"), Node::Boolean(true));
}

#[test]
fn constant_non_boolean_logical_operand_fails() {
    assert!(optimize(&parse("1 && true").unwrap()).is_err());
    // Right side non-boolean is only reached when the left does not
    // decide, and the left here is not constant.
    assert!(optimize(&parse("x && 1").unwrap()).is_ok());
}

#[test]
fn maybe_skipped_positions_defer_constant_faults() {
    // The interpreter might never reach these subexpressions, so a
    // constant fault inside them cannot fail the whole compilation.
    assert!(optimize(&parse("flag ? 1 / 0 : 2").unwrap()).is_ok());
    assert!(optimize(&parse("flag ? 1 : 1 / 0").unwrap()).is_ok());
    assert!(optimize(&parse("flag && 1 == 1 / 0").unwrap()).is_ok());
    assert!(optimize(&parse("flag || !(1 / 0 == 1)").unwrap()).is_ok());
    // A selected branch is certain again.
    assert!(optimize(&parse("false ? 1 : 1 / 0").unwrap()).is_err());
}

#[test]
fn call_arguments_fold_but_calls_do_not() {
    assert_eq!(
        optimized("f(1 + 2, x)"),
        Node::call("f", vec![Node::Number(3.0), Node::identifier("x")])
    );
}

#[test]
fn constant_ranges_fold_to_array_literals() {
    assert_eq!(
        optimized("1..4"),
        Node::Array(vec![Node::Number(1.0), Node::Number(2.0), Node::Number(3.0)])
    );
    assert!(optimize(&parse("1.5 .. 3").unwrap()).is_err());
}

#[test]
fn dead_assignments_are_removed() {
    let ast = optimized("x = 10; y = 20; z = x + 5; z");
    assert!(!reads_variable(&ast, "y"));
    let Node::Program(statements) = &ast else {
        panic!("expected a program, got {ast:?}");
    };
    assert_eq!(statements.len(), 3);
}

#[test]
fn final_assignment_is_never_removed() {
    assert_eq!(
        optimized("x = 5"),
        Node::assignment("x", Node::Number(5.0))
    );
    let ast = optimized("y = 1; x = 5");
    // y is dead, the final assignment stays and the program unwraps.
    assert_eq!(ast, Node::assignment("x", Node::Number(5.0)));
}

#[test]
fn assignments_with_side_effects_survive() {
    let ast = optimized("x = f(); 1");
    let Node::Program(statements) = &ast else {
        panic!("expected a program, got {ast:?}");
    };
    assert_eq!(statements.len(), 2);
}

#[test]
fn read_assignments_survive() {
    let ast = optimized("x = 1; x + 1");
    assert!(reads_variable(&ast, "x"));
    assert_eq!(ast.statements().count(), 2);
}

#[test]
fn idempotent() {
    for source in [
        "1 + 2 * 3",
        "x = 10; y = 20; z = x + 5; z",
        "a ? b + 1 : c * 2",
        "false && f()",
        "f(1 + 2, x)",
    ] {
        let once = optimized(source);
        let twice = optimize(&once).unwrap();
        assert_eq!(once, twice, "{source}");
    }
}
