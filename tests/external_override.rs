//! The external-override rule: a host variable beats a script assignment
//! to the same name, and the assignment's right-hand side still runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;

use formulet::{compile, evaluate, evaluate_scope, ExecutionContext, NativeFunction, Value};

fn num(n: f64) -> Value {
    Value::Number(n)
}

fn counting_context(calls: &Arc<AtomicUsize>) -> ExecutionContext {
    let seen = calls.clone();
    ExecutionContext::new().with_function(
        "counter",
        NativeFunction::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(num(1.0))
        }),
    )
}

#[test]
fn override_with_side_effects_interpreted() {
    let calls = Arc::new(AtomicUsize::new(0));
    let ctx = counting_context(&calls).with_variable("x", num(100.0));
    assert_eq!(evaluate("x = counter(); x", &ctx).unwrap(), num(100.0));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn override_with_side_effects_compiled() {
    let calls = Arc::new(AtomicUsize::new(0));
    let ctx = counting_context(&calls).with_variable("x", num(100.0));
    let expr = compile("x = counter(); x").unwrap();
    assert_eq!(expr.execute(&ctx).unwrap(), num(100.0));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn configurable_default_pattern() {
    // The idiom the rule exists for: the script supplies a default, the
    // host optionally overrides it.
    let source = "rate = 0.05; price * (1 + rate)";
    let defaults = ExecutionContext::new().with_variable("price", num(100.0));
    let overridden = ExecutionContext::new()
        .with_variable("price", num(100.0))
        .with_variable("rate", num(0.10));

    assert_eq!(evaluate(source, &defaults).unwrap(), num(105.0));
    assert_eq!(
        evaluate(source, &overridden).unwrap(),
        num(100.0 * 1.10)
    );

    let expr = compile(source).unwrap();
    assert_eq!(expr.execute(&defaults).unwrap(), num(105.0));
    assert_eq!(expr.execute(&overridden).unwrap(), num(100.0 * 1.10));
}

#[test]
fn assignment_expression_yields_the_external_value() {
    let ctx = ExecutionContext::new().with_variable("x", num(7.0));
    assert_eq!(evaluate("y = (x = 99); y", &ctx).unwrap(), num(7.0));
}

#[test]
fn later_reads_see_the_external_value() {
    let ctx = ExecutionContext::new().with_variable("x", num(2.0));
    assert_eq!(evaluate("x = 10; x * x", &ctx).unwrap(), num(4.0));
    let expr = compile("x = 10; x * x").unwrap();
    assert_eq!(expr.execute(&ctx).unwrap(), num(4.0));
}

#[test]
fn without_an_override_the_script_value_sticks() {
    let ctx = ExecutionContext::new();
    assert_eq!(evaluate("x = 10; x * x", &ctx).unwrap(), num(100.0));
}

#[test]
fn scope_reports_final_values() {
    let ctx = ExecutionContext::new().with_variable("x", num(100.0));
    let scope = evaluate_scope("x = 5; y = x + 1; y", &ctx).unwrap();
    assert_eq!(scope.get("x"), Some(&num(100.0)));
    assert_eq!(scope.get("y"), Some(&num(101.0)));
}

#[test]
fn chained_assignments_propagate_the_override() {
    let ctx = ExecutionContext::new().with_variable("x", num(100.0));
    // x = 5 yields 100, which y then stores.
    let scope = evaluate_scope("y = x = 5; y", &ctx).unwrap();
    assert_eq!(scope.get("y"), Some(&num(100.0)));
}
