use treelox::interpreter::Interpreter;
use treelox::parser::Parser;
use treelox::scanner;

fn run_fixture(source: &str) -> Vec<String> {
    let tokens = scanner::scan(source).expect("scan should succeed");
    let statements = Parser::new(tokens)
        .parse()
        .into_result()
        .expect("parse should succeed");
    let mut interp = Interpreter::new();
    interp
        .interpret(&statements)
        .expect("interpret should succeed");
    interp.output().to_vec()
}

#[test]
fn fixture_arithmetic() {
    let source = include_str!("../fixtures/arithmetic.lox");
    let expected = include_str!("../fixtures/arithmetic.expected");
    let output = run_fixture(source);
    let expected_lines: Vec<&str> = expected.lines().collect();
    assert_eq!(output, expected_lines);
}

#[test]
fn fixture_scoping() {
    let source = include_str!("../fixtures/scoping.lox");
    let expected = include_str!("../fixtures/scoping.expected");
    let output = run_fixture(source);
    let expected_lines: Vec<&str> = expected.lines().collect();
    assert_eq!(output, expected_lines);
}

#[test]
fn fixture_counter() {
    let source = include_str!("../fixtures/counter.lox");
    let expected = include_str!("../fixtures/counter.expected");
    let output = run_fixture(source);
    let expected_lines: Vec<&str> = expected.lines().collect();
    assert_eq!(output, expected_lines);
}

#[test]
fn fixture_fibonacci() {
    let source = include_str!("../fixtures/fib.lox");
    let expected = include_str!("../fixtures/fib.expected");
    let output = run_fixture(source);
    let expected_lines: Vec<&str> = expected.lines().collect();
    assert_eq!(output, expected_lines);
}

#[test]
fn fixture_forloop() {
    let source = include_str!("../fixtures/forloop.lox");
    let expected = include_str!("../fixtures/forloop.expected");
    let output = run_fixture(source);
    let expected_lines: Vec<&str> = expected.lines().collect();
    assert_eq!(output, expected_lines);
}
