mod common;
use common::status;

#[test]
fn return_at_top_level_is_a_resolve_error() {
    assert_eq!(status("return 1;"), 65);
}

#[test]
fn returning_a_value_from_an_initializer_is_a_resolve_error() {
    let source = "class Cake { init() { return 1; } }";
    assert_eq!(status(source), 65);
}

#[test]
fn bare_return_from_an_initializer_is_allowed() {
    let source = "class Cake { init() { return; } } Cake();";
    assert_eq!(status(source), 0);
}
