use crate::ast::*;
use crate::error::CompileError;
use crate::scanner::token::{Literal, Token, TokenKind};

/// What a parse produced: the statements completed before any failure, plus
/// at most one diagnostic. A parse error abandons the rest of the token
/// stream rather than resynchronizing, so the statement list may cover only
/// a prefix of the program.
#[derive(Debug)]
pub struct Parsed {
    pub statements: Vec<Stmt>,
    pub error: Option<CompileError>,
}

impl Parsed {
    pub fn into_result(self) -> Result<Vec<Stmt>, CompileError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.statements),
        }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    pub fn parse(mut self) -> Parsed {
        let mut statements = Vec::new();
        let mut error = None;
        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(e) => {
                    error = Some(e);
                    break;
                }
            }
        }
        Parsed { statements, error }
    }

    fn declaration(&mut self) -> Result<Stmt, CompileError> {
        if self.match_token(TokenKind::Fun) {
            self.fun_declaration()
        } else if self.match_token(TokenKind::Var) {
            self.var_declaration()
        } else {
            self.statement()
        }
    }

    /// `fun` is already consumed. The name is optional in the grammar; a
    /// nameless declaration skips the parameter list too and then fails on
    /// the expected ')'.
    fn fun_declaration(&mut self) -> Result<Stmt, CompileError> {
        let line = self.previous().line;
        let mut name = None;
        let mut params = Vec::new();
        if self.match_token(TokenKind::Identifier) {
            name = Some(self.previous().lexeme.clone());
            self.consume(TokenKind::LeftParen, "'(' after function name")?;
            while !self.check(TokenKind::RightParen) {
                params.push(
                    self.consume(TokenKind::Identifier, "parameter name")?
                        .lexeme
                        .clone(),
                );
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "')' after parameters")?;
        self.consume(TokenKind::LeftBrace, "'{' before function body")?;
        let body = self.block_statements()?;
        Ok(Stmt::Function(FunctionStmt {
            name,
            params,
            body,
            line,
        }))
    }

    /// `var` is already consumed. A malformed or missing right-hand side does
    /// not abort the declaration; the binding defaults to nil and the
    /// semicolon is still required.
    fn var_declaration(&mut self) -> Result<Stmt, CompileError> {
        let line = self.previous().line;
        let mut name = None;
        let mut initializer = nil_literal(line);
        if self.match_token(TokenKind::Identifier) {
            name = Some(self.previous().lexeme.clone());
            if let Ok(expr) = self.initializer_expr() {
                initializer = expr;
            }
            self.consume(TokenKind::Semicolon, "';' after variable declaration")?;
        }
        Ok(Stmt::Var(VarStmt {
            name,
            initializer,
            line,
        }))
    }

    fn initializer_expr(&mut self) -> Result<Expr, CompileError> {
        self.consume(TokenKind::Equal, "'=' in variable declaration")?;
        self.expression()
    }

    fn statement(&mut self) -> Result<Stmt, CompileError> {
        if self.match_token(TokenKind::For) {
            self.for_statement()
        } else if self.match_token(TokenKind::If) {
            self.if_statement()
        } else if self.match_token(TokenKind::Print) {
            self.print_statement()
        } else if self.match_token(TokenKind::Return) {
            self.return_statement()
        } else if self.match_token(TokenKind::While) {
            self.while_statement()
        } else if self.match_token(TokenKind::LeftBrace) {
            self.block_statement()
        } else {
            self.expression_statement()
        }
    }

    /// Desugar `for` into a block around a `while`:
    /// `{ initializer?  while (condition) { body  mutator? } }`
    fn for_statement(&mut self) -> Result<Stmt, CompileError> {
        let line = self.previous().line;
        self.consume(TokenKind::LeftParen, "'(' after 'for'")?;

        let initializer = if self.match_token(TokenKind::Semicolon) {
            None
        } else if self.match_token(TokenKind::Var) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(TokenKind::Semicolon) {
            Expr::Literal(LiteralExpr {
                value: LiteralValue::Bool(true),
                line,
            })
        } else {
            self.expression()?
        };
        self.consume(TokenKind::Semicolon, "';' after for condition")?;

        let mutator = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "')' after for clauses")?;

        let mut body = self.statement()?;
        if let Some(mutator) = mutator {
            let mutator_line = mutator.line();
            body = Stmt::Block(BlockStmt {
                statements: vec![
                    body,
                    Stmt::Expression(ExprStmt {
                        expression: mutator,
                        line: mutator_line,
                    }),
                ],
                line,
            });
        }

        let looped = Stmt::While(WhileStmt {
            condition,
            body: Box::new(body),
            line,
        });

        let mut statements = Vec::new();
        if let Some(init) = initializer {
            statements.push(init);
        }
        statements.push(looped);
        Ok(Stmt::Block(BlockStmt { statements, line }))
    }

    fn if_statement(&mut self) -> Result<Stmt, CompileError> {
        let line = self.previous().line;
        self.consume(TokenKind::LeftParen, "'(' after 'if'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "')' after if condition")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_token(TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
            line,
        }))
    }

    fn print_statement(&mut self) -> Result<Stmt, CompileError> {
        let line = self.previous().line;
        let expression = self.expression()?;
        self.consume(TokenKind::Semicolon, "';' after print value")?;
        Ok(Stmt::Print(PrintStmt { expression, line }))
    }

    /// `return` is already consumed. A missing or malformed value expression
    /// is swallowed and replaced with nil, mirroring `var` declarations.
    fn return_statement(&mut self) -> Result<Stmt, CompileError> {
        let line = self.previous().line;
        let value = self.expression().unwrap_or_else(|_| nil_literal(line));
        self.consume(TokenKind::Semicolon, "';' after return value")?;
        Ok(Stmt::Return(ReturnStmt { value, line }))
    }

    fn while_statement(&mut self) -> Result<Stmt, CompileError> {
        let line = self.previous().line;
        self.consume(TokenKind::LeftParen, "'(' after 'while'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "')' after while condition")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While(WhileStmt {
            condition,
            body,
            line,
        }))
    }

    fn block_statement(&mut self) -> Result<Stmt, CompileError> {
        let line = self.previous().line;
        let statements = self.block_statements()?;
        Ok(Stmt::Block(BlockStmt { statements, line }))
    }

    fn block_statements(&mut self) -> Result<Vec<Stmt>, CompileError> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.declaration()?);
        }
        self.consume(TokenKind::RightBrace, "'}' after block")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> Result<Stmt, CompileError> {
        let expression = self.expression()?;
        let line = expression.line();
        self.consume(TokenKind::Semicolon, "';' after expression")?;
        Ok(Stmt::Expression(ExprStmt { expression, line }))
    }

    fn expression(&mut self) -> Result<Expr, CompileError> {
        self.assignment()
    }

    /// Speculatively take an identifier and look for `=`. When no `=`
    /// follows, the cursor backs up over the identifier and the expression
    /// reparses as a plain reference. This is the grammar's only
    /// backtracking point.
    fn assignment(&mut self) -> Result<Expr, CompileError> {
        if self.check(TokenKind::Identifier) {
            let saved = self.current;
            let name = self.advance().clone();
            if self.match_token(TokenKind::Equal) {
                let value = self.assignment()?;
                return Ok(Expr::Assign(AssignExpr {
                    name: name.lexeme,
                    value: Box::new(value),
                    line: name.line,
                }));
            }
            self.current = saved;
        }
        self.or()
    }

    fn or(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.and()?;
        while self.match_token(TokenKind::Or) {
            let line = self.previous().line;
            let right = self.and()?;
            expr = logical(expr, LogicalOp::Or, right, line);
        }
        Ok(expr)
    }

    fn and(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.equality()?;
        while self.match_token(TokenKind::And) {
            let line = self.previous().line;
            let right = self.equality()?;
            expr = logical(expr, LogicalOp::And, right, line);
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.comparison()?;
        while let Some(op) = self.match_logical_op(&[TokenKind::BangEqual, TokenKind::EqualEqual])
        {
            let line = self.previous().line;
            let right = self.comparison()?;
            expr = logical(expr, op, right, line);
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.addition()?;
        while let Some(op) = self.match_logical_op(&[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ]) {
            let line = self.previous().line;
            let right = self.addition()?;
            expr = logical(expr, op, right, line);
        }
        Ok(expr)
    }

    fn addition(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.multiplication()?;
        while let Some(op) = self.match_binary_op(&[TokenKind::Plus, TokenKind::Minus]) {
            let line = self.previous().line;
            let right = self.multiplication()?;
            expr = binary(expr, op, right, line);
        }
        Ok(expr)
    }

    fn multiplication(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.unary()?;
        while let Some(op) = self.match_binary_op(&[TokenKind::Star, TokenKind::Slash]) {
            let line = self.previous().line;
            let right = self.unary()?;
            expr = binary(expr, op, right, line);
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, CompileError> {
        if self.match_token(TokenKind::Bang) {
            let line = self.previous().line;
            let operand = self.unary()?;
            return Ok(Expr::Unary(UnaryExpr {
                operator: UnaryOp::Not,
                operand: Box::new(operand),
                line,
            }));
        }
        if self.match_token(TokenKind::Minus) {
            let line = self.previous().line;
            let operand = self.unary()?;
            return Ok(Expr::Unary(UnaryExpr {
                operator: UnaryOp::Negate,
                operand: Box::new(operand),
                line,
            }));
        }
        self.call()
    }

    /// A single argument list only: calls do not chain and there is no
    /// property access.
    fn call(&mut self) -> Result<Expr, CompileError> {
        let expr = self.primary()?;
        if self.match_token(TokenKind::LeftParen) {
            let line = self.previous().line;
            let mut arguments = Vec::new();
            while !self.check(TokenKind::RightParen) {
                arguments.push(self.expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
            self.consume(TokenKind::RightParen, "')' after arguments")?;
            return Ok(Expr::Call(CallExpr {
                callee: Box::new(expr),
                arguments,
                line,
            }));
        }
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, CompileError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Bool(true),
                    line: token.line,
                }))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Bool(false),
                    line: token.line,
                }))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(nil_literal(token.line))
            }
            TokenKind::Number => {
                self.advance();
                let value = match token.literal {
                    Some(Literal::Number(n)) => n,
                    _ => token
                        .lexeme
                        .parse()
                        .expect("scanner guarantees a numeric literal"),
                };
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Number(value),
                    line: token.line,
                }))
            }
            TokenKind::String => {
                self.advance();
                let value = match token.literal {
                    Some(Literal::Str(s)) => s,
                    _ => token.lexeme,
                };
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::String(value),
                    line: token.line,
                }))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Variable(VariableExpr {
                    name: token.lexeme,
                    line: token.line,
                }))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expression = self.expression()?;
                self.consume(TokenKind::RightParen, "')' after expression")?;
                Ok(Expr::Grouping(GroupingExpr {
                    expression: Box::new(expression),
                    line: token.line,
                }))
            }
            _ => Err(CompileError::parse(
                format!("expected expression, found {}", describe(&token)),
                token.line,
                token.span.offset,
                token.span.len.max(1),
            )),
        }
    }

    // --- Helper methods ---

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[self.current - 1]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_binary_op(&mut self, kinds: &[TokenKind]) -> Option<BinaryOp> {
        for &kind in kinds {
            if self.check(kind) {
                self.advance();
                return Some(token_to_binary_op(kind));
            }
        }
        None
    }

    fn match_logical_op(&mut self, kinds: &[TokenKind]) -> Option<LogicalOp> {
        for &kind in kinds {
            if self.check(kind) {
                self.advance();
                return Some(token_to_logical_op(kind));
            }
        }
        None
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<&Token, CompileError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let token = self.peek();
            Err(CompileError::parse(
                format!("expected {message}, found {}", describe(token)),
                token.line,
                token.span.offset,
                token.span.len.max(1),
            ))
        }
    }
}

fn describe(token: &Token) -> String {
    if token.kind == TokenKind::Eof {
        "end of input".to_string()
    } else {
        format!("'{}'", token.lexeme)
    }
}

fn nil_literal(line: usize) -> Expr {
    Expr::Literal(LiteralExpr {
        value: LiteralValue::Nil,
        line,
    })
}

fn binary(left: Expr, operator: BinaryOp, right: Expr, line: usize) -> Expr {
    Expr::Binary(BinaryExpr {
        left: Box::new(left),
        operator,
        right: Box::new(right),
        line,
    })
}

fn logical(left: Expr, operator: LogicalOp, right: Expr, line: usize) -> Expr {
    Expr::Logical(LogicalExpr {
        left: Box::new(left),
        operator,
        right: Box::new(right),
        line,
    })
}

fn token_to_binary_op(kind: TokenKind) -> BinaryOp {
    match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Subtract,
        TokenKind::Star => BinaryOp::Multiply,
        TokenKind::Slash => BinaryOp::Divide,
        _ => unreachable!("only called with matched operator tokens"),
    }
}

fn token_to_logical_op(kind: TokenKind) -> LogicalOp {
    match kind {
        TokenKind::EqualEqual => LogicalOp::Equal,
        TokenKind::BangEqual => LogicalOp::NotEqual,
        TokenKind::Less => LogicalOp::Less,
        TokenKind::LessEqual => LogicalOp::LessEqual,
        TokenKind::Greater => LogicalOp::Greater,
        TokenKind::GreaterEqual => LogicalOp::GreaterEqual,
        _ => unreachable!("only called with matched operator tokens"),
    }
}
