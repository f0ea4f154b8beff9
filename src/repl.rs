use rustyline::Editor;
use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::history::MemHistory;

use crate::interpreter::Interpreter;
use crate::parser::Parser;
use crate::scanner;

/// Run the interactive REPL. Interpreter state persists across lines.
pub fn run_repl(short_circuit: bool) {
    let mut editor =
        match Editor::<(), MemHistory>::with_history(Config::builder().build(), MemHistory::new())
        {
            Ok(editor) => editor,
            Err(e) => {
                eprintln!("failed to start line editor: {e}");
                return;
            }
        };
    let mut interpreter = Interpreter::new().with_short_circuit(short_circuit);

    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("read error: {e}");
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(trimmed);

        // Auto-wrap bare expressions: if the line doesn't end with ';' or '}',
        // wrap it as `print <expr>;` so the user sees the result.
        let source = if is_bare_expression(trimmed) {
            format!("print {trimmed};")
        } else {
            trimmed.to_string()
        };

        let tokens = match scanner::scan(&source) {
            Ok(t) => t,
            Err(errors) => {
                for e in &errors {
                    eprintln!("{e}");
                }
                continue;
            }
        };

        let statements = match Parser::new(tokens).parse().into_result() {
            Ok(statements) => statements,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        if let Err(e) = interpreter.interpret(&statements) {
            eprintln!("Error: {e}");
        }
    }
}

/// Heuristic: treat the line as a bare expression if it doesn't end with
/// ';' or '}' and doesn't start with a keyword that begins a declaration
/// or statement.
fn is_bare_expression(line: &str) -> bool {
    if line.ends_with(';') || line.ends_with('}') {
        return false;
    }
    let first_word = line.split_whitespace().next().unwrap_or("");
    !matches!(
        first_word,
        "var" | "fun" | "if" | "while" | "for" | "print" | "return" | "{"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_expression_detection() {
        assert!(is_bare_expression("1 + 2"));
        assert!(is_bare_expression("x"));
        assert!(is_bare_expression("clock()"));
        assert!(!is_bare_expression("var x = 1;"));
        assert!(!is_bare_expression("print 1;"));
        assert!(!is_bare_expression("{ var x = 1; }"));
        assert!(!is_bare_expression("if (true) print 1;"));
        assert!(!is_bare_expression("fun foo() {}"));
    }
}
