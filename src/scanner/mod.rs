pub mod lexer;
pub mod token;

use crate::error::CompileError;
use token::{Token, TokenKind};

/// Scan source code into the token list the parser consumes: comments are
/// recognized but filtered out.
pub fn scan(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    let tokens = lexer::scan_all(source)?;
    Ok(tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Comment)
        .collect())
}

/// Scan source keeping `Comment` tokens, for token dumps.
pub fn scan_with_comments(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    lexer::scan_all(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_filters_comments() {
        let tokens = scan("1; // one\n2;").expect("scan should succeed");
        assert!(tokens.iter().all(|t| t.kind != TokenKind::Comment));
        assert_eq!(tokens.len(), 5); // 1 ; 2 ; EOF
    }

    #[test]
    fn scan_with_comments_keeps_them() {
        let tokens = scan_with_comments("1; // one\n2;").expect("scan should succeed");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Comment));
    }
}
