//! Optimizer guarantees observable from the public API: soundness,
//! idempotence, compile-time fault detection and dead-code elimination.

use pretty_assertions::assert_eq;

use formulet::{
    compile, evaluate, evaluate_ast, optimize, parse, Error, ExecutionContext, NativeFunction,
    Value,
};

fn num(n: f64) -> Value {
    Value::Number(n)
}

#[test]
fn optimized_and_plain_asts_evaluate_identically() {
    let sources = [
        "1 + 2 * 3",
        "2 ^ 3 ^ 2",
        "x = 10; y = 20; z = x + 5; z",
        "price * (1 + 0.05)",
        "true ? 1 + 1 : 2 + 2",
        "false && flag",
        "[1, 2] + [2 + 1, 2 + 2]",
        "n = 1; 1..=2 + 1",
    ];
    let ctx = ExecutionContext::new()
        .with_variable("price", num(100.0))
        .with_variable("x", num(42.0))
        .with_variable("flag", Value::Boolean(true));
    for source in sources {
        let ast = parse(source).unwrap();
        let optimized = optimize(&ast).unwrap();
        assert_eq!(
            evaluate_ast(&ast, &ctx).unwrap(),
            evaluate_ast(&optimized, &ctx).unwrap(),
            "{source}"
        );
    }
}

#[test]
fn idempotence() {
    for source in ["1 + 2", "x = 10; y = 20; x", "a ? 1 : 2 + 3", "f(1 + 1)"] {
        let once = optimize(&parse(source).unwrap()).unwrap();
        let twice = optimize(&once).unwrap();
        assert_eq!(once, twice, "{source}");
    }
}

#[test]
fn constant_division_by_zero_moves_to_compile_time() {
    let ctx = ExecutionContext::new();
    // Interpreted without optimization: a runtime error.
    assert!(matches!(evaluate("1 / 0", &ctx), Err(Error::Runtime(_))));
    // Compiled: the same fault is caught statically.
    assert!(matches!(compile("1 / 0"), Err(Error::CompileTime(_))));
    assert!(matches!(compile("2 + 6 % 0"), Err(Error::CompileTime(_))));
}

#[test]
fn non_constant_division_stays_a_runtime_error() {
    let expr = compile("10 / d").unwrap();
    let ctx = ExecutionContext::new().with_variable("d", num(0.0));
    assert!(matches!(expr.execute(&ctx), Err(Error::Runtime(_))));
    let ok = ExecutionContext::new().with_variable("d", num(4.0));
    assert_eq!(expr.execute(&ok).unwrap(), num(2.5));
}

#[test]
fn dead_assignments_disappear_from_the_compiled_form() {
    let expr = compile("x = 10; y = 20; z = x + 5; z").unwrap();
    assert!(expr.code().variables.iter().all(|v| v.name != "y"));
    assert!(!expr
        .code()
        .constants
        .contains(&num(20.0)));
    assert_eq!(expr.execute(&ExecutionContext::new()).unwrap(), num(15.0));
}

#[test]
fn side_effecting_dead_assignments_are_kept() {
    let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let seen = calls.clone();
    let ctx = ExecutionContext::new().with_function(
        "tick",
        NativeFunction::new(move |_| {
            seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(num(0.0))
        }),
    );
    let expr = compile("unused = tick(); 42").unwrap();
    assert_eq!(expr.execute(&ctx).unwrap(), num(42.0));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn never_taken_branches_do_not_fail_compilation() {
    let expr = compile("false ? 1 / 0 : 2").unwrap();
    assert_eq!(expr.execute(&ExecutionContext::new()).unwrap(), num(2.0));
}

#[test]
fn folding_never_assumes_script_values_beat_the_host() {
    // If the optimizer propagated x = 2 into x + 1 it would answer 3
    // even when the host overrides x.
    let expr = compile("x = 2; x + 1").unwrap();
    let ctx = ExecutionContext::new().with_variable("x", num(10.0));
    assert_eq!(expr.execute(&ctx).unwrap(), num(11.0));
}
