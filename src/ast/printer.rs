use crate::ast::*;

pub fn to_sexp(statements: &[Stmt]) -> String {
    let mut buf = String::new();
    for stmt in statements {
        sexp_stmt(&mut buf, stmt);
        buf.push('\n');
    }
    buf
}

pub fn to_json(statements: &[Stmt]) -> String {
    serde_json::to_string_pretty(statements).expect("AST should be serializable")
}

fn sexp_stmt(buf: &mut String, stmt: &Stmt) {
    match stmt {
        Stmt::Expression(e) => sexp_expr(buf, &e.expression),
        Stmt::Print(p) => {
            buf.push_str("(print ");
            sexp_expr(buf, &p.expression);
            buf.push(')');
        }
        Stmt::Var(v) => {
            buf.push_str("(var");
            if let Some(ref name) = v.name {
                buf.push(' ');
                buf.push_str(name);
            }
            buf.push(' ');
            sexp_expr(buf, &v.initializer);
            buf.push(')');
        }
        Stmt::Block(b) => {
            buf.push_str("(block");
            for stmt in &b.statements {
                buf.push(' ');
                sexp_stmt(buf, stmt);
            }
            buf.push(')');
        }
        Stmt::If(i) => {
            buf.push_str("(if ");
            sexp_expr(buf, &i.condition);
            buf.push(' ');
            sexp_stmt(buf, &i.then_branch);
            if let Some(ref else_branch) = i.else_branch {
                buf.push(' ');
                sexp_stmt(buf, else_branch);
            }
            buf.push(')');
        }
        Stmt::While(w) => {
            buf.push_str("(while ");
            sexp_expr(buf, &w.condition);
            buf.push(' ');
            sexp_stmt(buf, &w.body);
            buf.push(')');
        }
        Stmt::Function(fun) => {
            buf.push_str("(fun ");
            if let Some(ref name) = fun.name {
                buf.push_str(name);
                buf.push(' ');
            }
            buf.push('(');
            for (i, param) in fun.params.iter().enumerate() {
                if i > 0 {
                    buf.push(' ');
                }
                buf.push_str(param);
            }
            buf.push(')');
            for stmt in &fun.body {
                buf.push(' ');
                sexp_stmt(buf, stmt);
            }
            buf.push(')');
        }
        Stmt::Return(r) => {
            buf.push_str("(return ");
            sexp_expr(buf, &r.value);
            buf.push(')');
        }
    }
}

fn sexp_expr(buf: &mut String, expr: &Expr) {
    match expr {
        Expr::Literal(l) => match &l.value {
            LiteralValue::Number(n) => buf.push_str(&format!("{n}")),
            LiteralValue::String(s) => {
                buf.push('"');
                buf.push_str(s);
                buf.push('"');
            }
            LiteralValue::Bool(b) => buf.push_str(if *b { "true" } else { "false" }),
            LiteralValue::Nil => buf.push_str("nil"),
        },
        Expr::Variable(v) => buf.push_str(&v.name),
        Expr::Assign(a) => {
            buf.push_str("(= ");
            buf.push_str(&a.name);
            buf.push(' ');
            sexp_expr(buf, &a.value);
            buf.push(')');
        }
        Expr::Unary(u) => {
            buf.push('(');
            buf.push_str(&u.operator.to_string());
            buf.push(' ');
            sexp_expr(buf, &u.operand);
            buf.push(')');
        }
        Expr::Binary(b) => {
            buf.push('(');
            buf.push_str(&b.operator.to_string());
            buf.push(' ');
            sexp_expr(buf, &b.left);
            buf.push(' ');
            sexp_expr(buf, &b.right);
            buf.push(')');
        }
        Expr::Logical(l) => {
            buf.push('(');
            buf.push_str(&l.operator.to_string());
            buf.push(' ');
            sexp_expr(buf, &l.left);
            buf.push(' ');
            sexp_expr(buf, &l.right);
            buf.push(')');
        }
        Expr::Call(c) => {
            buf.push_str("(call ");
            sexp_expr(buf, &c.callee);
            for arg in &c.arguments {
                buf.push(' ');
                sexp_expr(buf, arg);
            }
            buf.push(')');
        }
        Expr::Grouping(g) => {
            buf.push_str("(group ");
            sexp_expr(buf, &g.expression);
            buf.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sexp_binary_expression() {
        let statements = vec![Stmt::Expression(ExprStmt {
            expression: Expr::Binary(BinaryExpr {
                left: Box::new(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Number(1.0),
                    line: 1,
                })),
                operator: BinaryOp::Add,
                right: Box::new(Expr::Binary(BinaryExpr {
                    left: Box::new(Expr::Literal(LiteralExpr {
                        value: LiteralValue::Number(2.0),
                        line: 1,
                    })),
                    operator: BinaryOp::Multiply,
                    right: Box::new(Expr::Literal(LiteralExpr {
                        value: LiteralValue::Number(3.0),
                        line: 1,
                    })),
                    line: 1,
                })),
                line: 1,
            }),
            line: 1,
        })];
        assert_eq!(to_sexp(&statements).trim(), "(+ 1 (* 2 3))");
    }

    #[test]
    fn sexp_var_without_name() {
        let statements = vec![Stmt::Var(VarStmt {
            name: None,
            initializer: Expr::Literal(LiteralExpr {
                value: LiteralValue::Nil,
                line: 1,
            }),
            line: 1,
        })];
        assert_eq!(to_sexp(&statements).trim(), "(var nil)");
    }

    #[test]
    fn json_output_is_valid() {
        let statements = vec![Stmt::Var(VarStmt {
            name: Some("x".to_string()),
            initializer: Expr::Literal(LiteralExpr {
                value: LiteralValue::Number(42.0),
                line: 1,
            }),
            line: 1,
        })];
        let json = to_json(&statements);
        let parsed: serde_json::Value =
            serde_json::from_str(&json).expect("JSON output should be valid");
        assert_eq!(parsed[0]["name"], "x");
    }
}
