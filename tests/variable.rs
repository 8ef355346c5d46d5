mod common;
use common::{status, stderr, stdout};

#[test]
fn global_variable_is_visible_after_declaration() {
    assert_eq!(stdout("var a = \"before\"; print a; a = \"after\"; print a;"), "before\nafter\n");
}

#[test]
fn uninitialized_variable_is_nil() {
    assert_eq!(stdout("var a; print a;"), "nil\n");
}

#[test]
fn block_scoped_variable_shadows_outer() {
    assert_eq!(
        stdout("var a = \"global\"; { var a = \"local\"; print a; } print a;"),
        "local\nglobal\n"
    );
}

#[test]
fn undefined_variable_read_is_a_runtime_error() {
    assert_eq!(status("print notDefined;"), 70);
    assert!(stderr("print notDefined;").contains("Undefined variable 'notDefined'."));
}

#[test]
fn redeclaring_a_local_in_the_same_scope_is_a_resolve_error() {
    assert_eq!(status("{ var a = 1; var a = 2; }"), 65);
}

#[test]
fn self_referential_initializer_is_rejected() {
    let source = "var a = \"outer\"; { var a = a; }";
    assert_eq!(status(source), 65);
}
