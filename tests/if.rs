mod common;
use common::stdout;

#[test]
fn if_runs_then_branch_when_condition_is_truthy() {
    assert_eq!(stdout("if (true) print \"then\"; else print \"else\";"), "then\n");
}

#[test]
fn if_runs_else_branch_when_condition_is_falsy() {
    assert_eq!(stdout("if (false) print \"then\"; else print \"else\";"), "else\n");
}

#[test]
fn dangling_else_binds_to_the_nearest_if() {
    assert_eq!(stdout("if (true) if (false) print \"a\"; else print \"b\";"), "b\n");
}

#[test]
fn only_nil_and_false_are_falsy() {
    assert_eq!(stdout("if (0) print \"number truthy\";"), "number truthy\n");
    assert_eq!(stdout("if (\"\") print \"string truthy\";"), "string truthy\n");
    assert_eq!(stdout("if (nil) print \"unreachable\";"), "");
}
