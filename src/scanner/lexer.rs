use winnow::combinator::alt;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::stream::{LocatingSlice, Location};
use winnow::token::{any, take_while};

use crate::error::CompileError;
use crate::scanner::token::{Literal, Span, Token, TokenKind, keyword_kind};

type Input<'a> = LocatingSlice<&'a str>;

fn whitespace<'a>(input: &mut Input<'a>) -> ModalResult<()> {
    take_while(0.., |c: char| {
        c == ' ' || c == '\t' || c == '\r' || c == '\n'
    })
    .void()
    .parse_next(input)
}

fn line_comment<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    "//".parse_next(input)?;
    let text: &str = take_while(0.., |c: char| c != '\n').parse_next(input)?;
    let end = input.current_token_start();
    Ok(Token::new(
        TokenKind::Comment,
        text,
        Span::new(start, end - start),
    ))
}

fn string_literal<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let c = any
            .parse_next(input)
            .map_err(|_: winnow::error::ErrMode<ContextError>| {
                winnow::error::ErrMode::Cut(ContextError::new())
            })?;
        match c {
            '"' => break,
            '\\' => {
                let esc =
                    any.parse_next(input)
                        .map_err(|_: winnow::error::ErrMode<ContextError>| {
                            winnow::error::ErrMode::Cut(ContextError::new())
                        })?;
                match esc {
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    '\\' => s.push('\\'),
                    '"' => s.push('"'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            other => s.push(other),
        }
    }
    let end = input.current_token_start();
    let span = Span::new(start, end - start);
    let literal = Literal::Str(s.clone());
    Ok(Token::new(TokenKind::String, s, span).with_literal(literal))
}

fn number_literal<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let whole: &str = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    let mut lexeme = whole.to_string();

    let checkpoint = input.checkpoint();
    let dot_result: Result<char, winnow::error::ErrMode<ContextError>> = '.'.parse_next(input);
    if dot_result.is_ok() {
        match take_while::<_, _, ContextError>(1.., |c: char| c.is_ascii_digit()).parse_next(input)
        {
            Ok(frac) => {
                lexeme.push('.');
                lexeme.push_str(frac);
            }
            Err(_) => {
                input.reset(&checkpoint);
            }
        }
    }

    let end = input.current_token_start();
    let value: f64 = lexeme.parse().expect("digit runs parse as f64");
    Ok(
        Token::new(TokenKind::Number, lexeme, Span::new(start, end - start))
            .with_literal(Literal::Number(value)),
    )
}

fn identifier_or_keyword<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let first: char = any
        .verify(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .parse_next(input)?;
    let rest: &str =
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)?;
    let end = input.current_token_start();
    let mut lexeme = String::with_capacity(1 + rest.len());
    lexeme.push(first);
    lexeme.push_str(rest);
    let kind = keyword_kind(&lexeme).unwrap_or(TokenKind::Identifier);
    Ok(Token::new(kind, lexeme, Span::new(start, end - start)))
}

fn two_char_token<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let (kind, lexeme) = alt((
        "!=".value((TokenKind::BangEqual, "!=")),
        "==".value((TokenKind::EqualEqual, "==")),
        ">=".value((TokenKind::GreaterEqual, ">=")),
        "<=".value((TokenKind::LessEqual, "<=")),
    ))
    .parse_next(input)?;
    Ok(Token::new(kind, lexeme, Span::new(start, 2)))
}

fn single_char_token<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    let start = input.current_token_start();
    let c = any
        .verify(|c: &char| "(){}.,;-+/*!=<>".contains(*c))
        .parse_next(input)?;
    let kind = match c {
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        '{' => TokenKind::LeftBrace,
        '}' => TokenKind::RightBrace,
        ',' => TokenKind::Comma,
        '.' => TokenKind::Dot,
        '-' => TokenKind::Minus,
        '+' => TokenKind::Plus,
        ';' => TokenKind::Semicolon,
        '/' => TokenKind::Slash,
        '*' => TokenKind::Star,
        '!' => TokenKind::Bang,
        '=' => TokenKind::Equal,
        '<' => TokenKind::Less,
        '>' => TokenKind::Greater,
        _ => unreachable!("verify guarantees valid char"),
    };
    Ok(Token::new(kind, c.to_string(), Span::new(start, 1)))
}

fn scan_token<'a>(input: &mut Input<'a>) -> ModalResult<Token> {
    alt((
        line_comment,
        string_literal,
        number_literal,
        identifier_or_keyword,
        two_char_token,
        single_char_token,
    ))
    .parse_next(input)
}

/// Byte offsets at which each line starts, for offset-to-line conversion.
fn line_starts(source: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, b) in source.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

fn line_at(starts: &[usize], offset: usize) -> usize {
    starts.partition_point(|&s| s <= offset)
}

/// Scan all tokens from source, returning either a token list or scan errors.
/// The token list always ends with `Eof` and still contains `Comment` tokens.
pub fn scan_all(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    let mut input = LocatingSlice::new(source);
    let starts = line_starts(source);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    loop {
        if whitespace(&mut input).is_err() {
            break;
        }
        if input.is_empty() {
            break;
        }
        match scan_token(&mut input) {
            Ok(mut token) => {
                token.line = line_at(&starts, token.span.offset);
                tokens.push(token);
            }
            Err(_) => {
                let offset = input.current_token_start();
                let c = any::<_, ContextError>.parse_next(&mut input).ok();
                let ch = c.unwrap_or('?');
                errors.push(CompileError::scan(
                    format!("unexpected character '{ch}'"),
                    line_at(&starts, offset),
                    offset,
                    1,
                ));
            }
        }
    }

    let eof_offset = source.len();
    let mut eof = Token::new(TokenKind::Eof, "", Span::new(eof_offset, 0));
    eof.line = line_at(&starts, eof_offset);
    tokens.push(eof);

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn scan_ok(source: &str) -> Vec<Token> {
        scan_all(source).expect("scan should succeed")
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn single_char_tokens() {
        let tokens = scan_ok("(){},.-+;/*");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Minus,
                TokenKind::Plus,
                TokenKind::Semicolon,
                TokenKind::Slash,
                TokenKind::Star,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn two_char_tokens() {
        let tokens = scan_ok("!= == >= <=");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::BangEqual,
                TokenKind::EqualEqual,
                TokenKind::GreaterEqual,
                TokenKind::LessEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn single_then_equal() {
        let tokens = scan_ok("! = < >");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Bang,
                TokenKind::Equal,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_literal_carries_decoded_value() {
        let tokens = scan_ok("\"hello world\"");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "hello world");
        assert_eq!(
            tokens[0].literal,
            Some(Literal::Str("hello world".to_string()))
        );
    }

    #[test]
    fn string_with_escapes() {
        let tokens = scan_ok("\"hello\\nworld\\t!\"");
        assert_eq!(tokens[0].lexeme, "hello\nworld\t!");
    }

    #[test]
    fn number_carries_decoded_value() {
        let tokens = scan_ok("3.14");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].literal, Some(Literal::Number(3.14)));
    }

    #[test]
    fn number_no_trailing_dot() {
        let tokens = scan_ok("42.foo");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[1].kind, TokenKind::Dot);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn identifiers_and_keywords() {
        let tokens = scan_ok("var x = true");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::True,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn all_keywords() {
        let source = "and else false fun for if nil or print return true var while";
        let tokens = scan_ok(source);
        let expected = vec![
            TokenKind::And,
            TokenKind::Else,
            TokenKind::False,
            TokenKind::Fun,
            TokenKind::For,
            TokenKind::If,
            TokenKind::Nil,
            TokenKind::Or,
            TokenKind::Print,
            TokenKind::Return,
            TokenKind::True,
            TokenKind::Var,
            TokenKind::While,
            TokenKind::Eof,
        ];
        assert_eq!(kinds(&tokens), expected);
    }

    #[test]
    fn comments_become_tokens() {
        let tokens = scan_ok("var x // trailing note\nvar y");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Comment,
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[2].lexeme, " trailing note");
    }

    #[rstest]
    #[case("var x = 1;", 0, 1)]
    #[case("var x = 1;\nvar y = 2;", 5, 2)]
    #[case("1;\n2;\n3;", 4, 3)]
    fn line_numbers(#[case] source: &str, #[case] index: usize, #[case] line: usize) {
        let tokens = scan_ok(source);
        assert_eq!(tokens[index].line, line);
    }

    #[test]
    fn spans_are_correct() {
        let tokens = scan_ok("var x = 42;");
        assert_eq!(tokens[0].span, Span::new(0, 3)); // var
        assert_eq!(tokens[1].span, Span::new(4, 1)); // x
        assert_eq!(tokens[2].span, Span::new(6, 1)); // =
        assert_eq!(tokens[3].span, Span::new(8, 2)); // 42
        assert_eq!(tokens[4].span, Span::new(10, 1)); // ;
    }

    #[test]
    fn unexpected_character_error() {
        let result = scan_all("var x = @;");
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains('@'));
    }

    #[test]
    fn error_reports_line() {
        let errors = scan_all("var ok = 1;\nvar bad = @;").unwrap_err();
        assert!(errors[0].to_string().contains("line 2"));
    }

    #[test]
    fn unterminated_string_error() {
        let result = scan_all("\"unterminated");
        assert!(result.is_err());
    }

    #[test]
    fn multiline_program() {
        let source = "var x = 1;\nvar y = 2;\nprint x + y;";
        let tokens = scan_ok(source);
        assert_eq!(tokens.len(), 16); // 15 tokens + EOF
    }
}
