//! Public surface smoke tests: the pipeline entry points and the error
//! messages embedders show to end users.

use pretty_assertions::assert_eq;

use formulet::{
    compile, compile_ast, evaluate, evaluate_ast, optimize, parse, Error, ExecutionContext, Value,
};

#[test]
fn parse_then_reuse_the_ast() {
    let ast = parse("base * 2").unwrap();
    for n in [1.0, 2.0, 3.0] {
        let ctx = ExecutionContext::new().with_variable("base", Value::Number(n));
        assert_eq!(evaluate_ast(&ast, &ctx).unwrap(), Value::Number(n * 2.0));
    }
    let expr = compile_ast(&ast).unwrap();
    let ctx = ExecutionContext::new().with_variable("base", Value::Number(21.0));
    assert_eq!(expr.execute(&ctx).unwrap(), Value::Number(42.0));
}

#[test]
fn optimize_is_exposed_standalone() {
    let ast = parse("1 + 2").unwrap();
    let optimized = optimize(&ast).unwrap();
    assert_eq!(
        evaluate_ast(&optimized, &ExecutionContext::new()).unwrap(),
        Value::Number(3.0)
    );
}

#[test]
fn empty_context_is_the_default() {
    assert_eq!(
        evaluate("40 + 2", &ExecutionContext::new()).unwrap(),
        Value::Number(42.0)
    );
}

#[test]
fn parse_errors_carry_positions() {
    let Err(Error::Parse(err)) = parse("1 + $") else {
        panic!("expected a parse error");
    };
    let message = err.to_string();
    assert!(message.contains("offset 4"), "{message}");
}

#[test]
fn error_messages_name_the_offender() {
    let ctx = ExecutionContext::new();
    let message = evaluate("forgotten + 1", &ctx).unwrap_err().to_string();
    assert!(message.contains("forgotten"), "{message}");

    let message = evaluate("nope()", &ctx).unwrap_err().to_string();
    assert!(message.contains("nope"), "{message}");

    let message = evaluate("1 + true", &ctx).unwrap_err().to_string();
    assert!(message.contains("number"), "{message}");
    assert!(message.contains("boolean"), "{message}");
}

#[test]
fn compile_time_errors_read_differently_from_runtime_ones() {
    let compile_message = compile("1 / 0").unwrap_err().to_string();
    assert!(compile_message.contains("compile error"), "{compile_message}");
    let runtime_message = evaluate("1 / 0", &ExecutionContext::new())
        .unwrap_err()
        .to_string();
    assert!(runtime_message.contains("runtime error"), "{runtime_message}");
    assert!(runtime_message.contains("division by zero"), "{runtime_message}");
}

#[test]
fn shared_expression_across_threads() {
    let expr = std::sync::Arc::new(compile("x * 2").unwrap());
    let handles: Vec<_> = (1..=4)
        .map(|n| {
            let expr = expr.clone();
            std::thread::spawn(move || {
                let ctx = ExecutionContext::new().with_variable("x", Value::Number(n as f64));
                expr.execute(&ctx).unwrap()
            })
        })
        .collect();
    let mut results: Vec<Value> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    results.sort_by(|a, b| match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        _ => std::cmp::Ordering::Equal,
    });
    assert_eq!(
        results,
        vec![
            Value::Number(2.0),
            Value::Number(4.0),
            Value::Number(6.0),
            Value::Number(8.0)
        ]
    );
}
