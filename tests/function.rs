mod common;
use common::{status, stderr, stdout};

#[test]
fn function_can_be_called_and_returns_a_value() {
    assert_eq!(stdout("fun add(a, b) { return a + b; } print add(1, 2);"), "3\n");
}

#[test]
fn function_with_no_return_yields_nil() {
    assert_eq!(stdout("fun f() {} print f();"), "nil\n");
}

#[test]
fn bare_return_yields_nil() {
    assert_eq!(stdout("fun f() { return; } print f();"), "nil\n");
}

#[test]
fn function_value_prints_as_fn_name() {
    assert_eq!(stdout("fun f() {} print f;"), "<fn f>\n");
}

#[test]
fn calling_with_wrong_arity_is_a_runtime_error() {
    let source = "fun f(a, b) { return a + b; } f(1);";
    assert_eq!(status(source), 70);
    assert!(stderr(source).contains("Expected 2 arguments but got 1."));
}

#[test]
fn calling_a_non_callable_value_is_a_runtime_error() {
    let source = "var a = 1; a();";
    assert_eq!(status(source), 70);
    assert!(stderr(source).contains("Can only call functions and classes."));
}

#[test]
fn more_than_255_parameters_is_a_parse_error() {
    let params = (0..256).map(|i| format!("p{i}")).collect::<Vec<_>>().join(", ");
    let source = format!("fun f({params}) {{}}");
    assert_eq!(status(&source), 65);
}

#[test]
fn clock_is_a_zero_arity_native_function() {
    assert_eq!(stdout("print clock;"), "<native fn>\n");
}

#[test]
fn recursion_works() {
    let source = "
        fun fib(n) {
            if (n < 2) return n;
            return fib(n - 1) + fib(n - 2);
        }
        print fib(10);
    ";
    assert_eq!(stdout(source), "55\n");
}
