mod common;
use common::{status, stderr, stdout};

#[test]
fn arithmetic_follows_standard_precedence() {
    assert_eq!(stdout("print 2 + 3 * 4;"), "14\n");
    assert_eq!(stdout("print (2 + 3) * 4;"), "20\n");
}

#[test]
fn plus_concatenates_two_strings() {
    assert_eq!(stdout("print \"foo\" + \"bar\";"), "foobar\n");
}

#[test]
fn plus_on_mixed_types_errors_and_cites_the_plus_token() {
    let source = "\"foo\" + 1;";
    assert_eq!(status(source), 70);
    assert!(stderr(source).contains("Operands must be two numbers or two strings."));
}

#[test]
fn comparison_operators_require_numbers() {
    assert_eq!(stdout("print 1 < 2;"), "true\n");
    assert_eq!(stdout("print 1 >= 2;"), "false\n");
    assert_eq!(status("print \"a\" < 1;"), 70);
}

#[test]
fn division_by_zero_yields_infinity() {
    assert_eq!(stdout("print 1 / 0;"), "inf\n");
}

#[test]
fn unary_minus_requires_a_number() {
    assert_eq!(stdout("print -3;"), "-3\n");
    assert_eq!(status("print -\"a\";"), 70);
}

#[test]
fn bang_negates_truthiness() {
    assert_eq!(stdout("print !true;"), "false\n");
    assert_eq!(stdout("print !nil;"), "true\n");
    assert_eq!(stdout("print !0;"), "false\n");
}

#[test]
fn equality_is_value_based_across_types() {
    assert_eq!(stdout("print 1 == 1;"), "true\n");
    assert_eq!(stdout("print 1 == \"1\";"), "false\n");
    assert_eq!(stdout("print nil == nil;"), "true\n");
    assert_eq!(stdout("print nil == false;"), "false\n");
}

#[test]
fn equality_on_classes_and_instances_is_identity_based() {
    let source = "
        class Cake {}
        var a = Cake();
        var b = Cake();
        print a == a;
        print a == b;
        print Cake == Cake;
    ";
    assert_eq!(stdout(source), "true\nfalse\ntrue\n");
}
