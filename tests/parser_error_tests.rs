use treelox::parser::{Parsed, Parser};
use treelox::scanner;

fn parse(source: &str) -> Parsed {
    let tokens = scanner::scan(source).expect("scan should succeed");
    Parser::new(tokens).parse()
}

#[test]
fn valid_program_has_no_error() {
    let parsed = parse("var x = 1; print x;");
    assert!(parsed.error.is_none());
    assert_eq!(parsed.statements.len(), 2);
}

#[test]
fn malformed_expression_reports_one_error() {
    let parsed = parse("1 + ;");
    assert!(parsed.statements.is_empty());
    let error = parsed.error.expect("parse should fail");
    assert!(
        error.to_string().contains("expected expression"),
        "got: {error}"
    );
}

#[test]
fn parse_abandons_the_rest_of_the_program() {
    // The statements after the error are not parsed; there is no
    // statement-level resynchronization.
    let parsed = parse("print 1; print ; print 2;");
    assert_eq!(parsed.statements.len(), 1);
    assert!(parsed.error.is_some());
}

#[test]
fn statements_before_the_error_are_returned() {
    let parsed = parse("var x = 1;\nvar y = 2;\n)");
    assert_eq!(parsed.statements.len(), 2);
    let error = parsed.error.expect("parse should fail");
    assert!(error.to_string().contains("line 3"), "got: {error}");
}

#[test]
fn missing_semicolon_names_the_expectation() {
    let parsed = parse("var x = 1");
    let error = parsed.error.expect("parse should fail");
    assert!(error.to_string().contains("';'"), "got: {error}");
}

#[test]
fn swallowed_initializer_error_is_not_reported() {
    // `var x = ;` recovers with a nil default; the program parses clean.
    let parsed = parse("var x = ; print x;");
    assert!(parsed.error.is_none());
    assert_eq!(parsed.statements.len(), 2);
}
