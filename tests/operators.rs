//! Operator behavior through the public API, interpreted and compiled.

use pretty_assertions::assert_eq;

use formulet::{compile, evaluate, Error, ExecutionContext, Value};

fn both(source: &str) -> Result<Value, Error> {
    let ctx = ExecutionContext::new();
    let interpreted = evaluate(source, &ctx);
    let executed = compile(source).and_then(|e| e.execute(&ctx));
    match (&interpreted, &executed) {
        (Ok(a), Ok(b)) => assert_eq!(a, b, "engines disagree on {source}"),
        (Err(_), Err(_)) => {}
        _ => panic!("one engine failed on {source}: {interpreted:?} vs {executed:?}"),
    }
    interpreted
}

fn num(n: f64) -> Value {
    Value::Number(n)
}

#[test]
fn arithmetic() {
    assert_eq!(both("1 + 2").unwrap(), num(3.0));
    assert_eq!(both("10 - 4 - 3").unwrap(), num(3.0));
    assert_eq!(both("6 / 4").unwrap(), num(1.5));
    assert_eq!(both("2 ^ 10").unwrap(), num(1024.0));
    assert_eq!(both("9 % 5").unwrap(), num(4.0));
    assert_eq!(both("2 ^ 0.5 * 2 ^ 0.5").unwrap(), num(2.0000000000000004));
}

#[test]
fn associativity() {
    assert_eq!(both("2 ^ 3 ^ 2").unwrap(), num(512.0));
    assert_eq!(both("2 - 3 - 2").unwrap(), num(-3.0));
    assert_eq!(both("100 / 10 / 2").unwrap(), num(5.0));
}

#[test]
fn unary_precedence() {
    assert_eq!(both("-2 ^ 2").unwrap(), num(-4.0));
    assert_eq!(both("(-2) ^ 2").unwrap(), num(4.0));
    assert_eq!(both("-2 + 3").unwrap(), num(1.0));
}

#[test]
fn string_concatenation() {
    assert_eq!(
        both(r#""for" + "mu" + "let""#).unwrap(),
        Value::string("formulet")
    );
}

#[test]
fn comparisons() {
    assert_eq!(both("1 < 2").unwrap(), Value::Boolean(true));
    assert_eq!(both("2 <= 2").unwrap(), Value::Boolean(true));
    assert_eq!(both("3 > 4").unwrap(), Value::Boolean(false));
    assert_eq!(both(r#""abc" < "abd""#).unwrap(), Value::Boolean(true));
}

#[test]
fn equality() {
    assert_eq!(both("1 + 1 == 2").unwrap(), Value::Boolean(true));
    assert_eq!(both(r#""a" != "b""#).unwrap(), Value::Boolean(true));
    assert_eq!(both("[1, 2] == [1, 2]").unwrap(), Value::Boolean(true));
    // Mismatched types compare unequal instead of erroring.
    assert_eq!(both(r#"1 == "1""#).unwrap(), Value::Boolean(false));
}

#[test]
fn mixed_type_operands_are_type_errors() {
    assert!(both(r#"1 + "2""#).is_err());
    assert!(both(r#"1 < "2""#).is_err());
    assert!(both("true + false").is_err());
    assert!(both("-true").is_err());
    assert!(both("!5").is_err());
}

#[test]
fn booleans_have_no_numeric_truthiness() {
    assert!(both("1 && true").is_err());
    assert!(both("0 || false").is_err());
    assert_eq!(both("true && !false").unwrap(), Value::Boolean(true));
}
