pub mod callable;
pub mod environment;
pub mod value;

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use crate::ast::*;
use crate::error::RuntimeError;
use crate::interpreter::callable::{Callable, LoxFunction, NativeFunction};
use crate::interpreter::environment::Environment;
use crate::interpreter::value::Value;

/// Outcome of executing one statement: either control continues normally or
/// a `return` is unwinding toward the nearest function-call boundary. Every
/// statement-execution call threads this through, so the unwind never rides
/// on the error channel.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    environment: Rc<RefCell<Environment>>,
    output: Vec<String>,
    /// Writer for print output (allows testing without stdout)
    writer: Box<dyn Write>,
    /// When set, `and`/`or` skip the right operand the conventional way.
    /// Off by default: the historical evaluator computes both sides first.
    short_circuit: bool,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));
        globals.borrow_mut().define(
            "clock".to_string(),
            Value::Function(Callable::Native(NativeFunction::Clock)),
        );

        Self {
            environment: globals,
            output: Vec::new(),
            writer: Box::new(std::io::stdout()),
            short_circuit: false,
        }
    }

    /// Create an interpreter that captures output (for testing).
    #[cfg(test)]
    fn new_capturing() -> Self {
        let mut interp = Self::new();
        interp.writer = Box::new(Vec::<u8>::new());
        interp
    }

    pub fn with_short_circuit(mut self, enabled: bool) -> Self {
        self.short_circuit = enabled;
        self
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Execute top-level statements in order. The first runtime error stops
    /// execution of the remaining statements. A `return` unwinding all the
    /// way here has no call boundary to stop at and fails loudly.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in statements {
            match self.execute_stmt(stmt)? {
                Flow::Normal => {}
                Flow::Return(_) => {
                    return Err(RuntimeError::ReturnOutsideFunction { line: stmt.line() });
                }
            }
        }
        Ok(())
    }

    fn execute_stmt(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expression(e) => {
                self.evaluate_expr(&e.expression)?;
                Ok(Flow::Normal)
            }
            Stmt::Print(p) => {
                let value = self.evaluate_expr(&p.expression)?;
                let text = value.to_string();
                writeln!(self.writer, "{text}").expect("write should succeed");
                self.output.push(text);
                Ok(Flow::Normal)
            }
            Stmt::Var(v) => {
                let value = self.evaluate_expr(&v.initializer)?;
                if let Some(ref name) = v.name {
                    self.environment.borrow_mut().define(name.clone(), value);
                }
                Ok(Flow::Normal)
            }
            Stmt::Function(fun) => {
                let function = LoxFunction {
                    declaration: fun.clone(),
                    closure: Rc::clone(&self.environment),
                };
                if let Some(ref name) = fun.name {
                    self.environment
                        .borrow_mut()
                        .define(name.clone(), Value::Function(Callable::User(function)));
                }
                Ok(Flow::Normal)
            }
            Stmt::Block(b) => {
                let env = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
                    &self.environment,
                ))));
                self.execute_block(&b.statements, env)
            }
            Stmt::If(i) => {
                if self.condition(&i.condition, "if")? {
                    self.execute_stmt(&i.then_branch)
                } else if let Some(ref else_branch) = i.else_branch {
                    self.execute_stmt(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While(w) => {
                while self.condition(&w.condition, "while")? {
                    match self.execute_stmt(&w.body)? {
                        Flow::Normal => {}
                        ret @ Flow::Return(_) => return Ok(ret),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Return(r) => {
                let value = self.evaluate_expr(&r.value)?;
                Ok(Flow::Return(value))
            }
        }
    }

    /// Run `statements` in `env`, putting the previous scope back on every
    /// exit path: normal completion, runtime error, and return unwind alike.
    fn execute_block(
        &mut self,
        statements: &[Stmt],
        env: Rc<RefCell<Environment>>,
    ) -> Result<Flow, RuntimeError> {
        let previous = Rc::clone(&self.environment);
        self.environment = env;
        let result = self.run_sequence(statements);
        self.environment = previous;
        result
    }

    fn run_sequence(&mut self, statements: &[Stmt]) -> Result<Flow, RuntimeError> {
        for stmt in statements {
            match self.execute_stmt(stmt)? {
                Flow::Normal => {}
                ret @ Flow::Return(_) => return Ok(ret),
            }
        }
        Ok(Flow::Normal)
    }

    fn condition(&mut self, expr: &Expr, what: &str) -> Result<bool, RuntimeError> {
        let value = self.evaluate_expr(expr)?;
        value.as_bool().ok_or_else(|| {
            RuntimeError::type_mismatch(
                format!(
                    "{what} condition must be a boolean, got {}",
                    value.type_name()
                ),
                expr.line(),
            )
        })
    }

    fn evaluate_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(l) => Ok(match &l.value {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::String(s) => Value::Str(s.clone()),
                LiteralValue::Bool(b) => Value::Bool(*b),
                LiteralValue::Nil => Value::Nil,
            }),
            Expr::Grouping(g) => self.evaluate_expr(&g.expression),
            Expr::Variable(v) => {
                self.environment
                    .borrow()
                    .get(&v.name)
                    .ok_or_else(|| RuntimeError::UndefinedVariable {
                        name: v.name.clone(),
                        line: v.line,
                    })
            }
            Expr::Assign(a) => {
                let value = self.evaluate_expr(&a.value)?;
                let assigned = self.environment.borrow_mut().assign(&a.name, value.clone());
                if !assigned {
                    return Err(RuntimeError::UndefinedVariable {
                        name: a.name.clone(),
                        line: a.line,
                    });
                }
                Ok(value)
            }
            Expr::Unary(u) => {
                let operand = self.evaluate_expr(&u.operand)?;
                match u.operator {
                    UnaryOp::Negate => match operand.as_number() {
                        Some(n) => Ok(Value::Number(-n)),
                        None => Err(RuntimeError::type_mismatch(
                            format!("operand of '-' must be a number, got {}", operand.type_name()),
                            u.line,
                        )),
                    },
                    UnaryOp::Not => match operand.as_bool() {
                        Some(b) => Ok(Value::Bool(!b)),
                        None => Err(RuntimeError::type_mismatch(
                            format!(
                                "operand of '!' must be a boolean, got {}",
                                operand.type_name()
                            ),
                            u.line,
                        )),
                    },
                }
            }
            Expr::Binary(b) => self.evaluate_binary(b),
            Expr::Logical(l) => self.evaluate_logical(l),
            Expr::Call(c) => self.evaluate_call(c),
        }
    }

    /// Arithmetic only. `+` never concatenates; all four operators coerce
    /// nothing and require numbers on both sides.
    fn evaluate_binary(&mut self, b: &BinaryExpr) -> Result<Value, RuntimeError> {
        let left = self.evaluate_expr(&b.left)?;
        let right = self.evaluate_expr(&b.right)?;
        let (l, r) = numeric_operands(&left, &right, b.operator, b.line)?;
        Ok(Value::Number(match b.operator {
            BinaryOp::Add => l + r,
            BinaryOp::Subtract => l - r,
            BinaryOp::Multiply => l * r,
            BinaryOp::Divide => l / r,
        }))
    }

    /// Equality, comparison, `and`, and `or` all dispatch here: one node
    /// kind distinguished only by operator. Unless `short_circuit` is set,
    /// `and`/`or` evaluate BOTH operands before applying the operator.
    fn evaluate_logical(&mut self, l: &LogicalExpr) -> Result<Value, RuntimeError> {
        if self.short_circuit {
            match l.operator {
                LogicalOp::And => {
                    if !self.logical_bool(&l.left, l.operator, l.line)? {
                        return Ok(Value::Bool(false));
                    }
                    return Ok(Value::Bool(self.logical_bool(&l.right, l.operator, l.line)?));
                }
                LogicalOp::Or => {
                    if self.logical_bool(&l.left, l.operator, l.line)? {
                        return Ok(Value::Bool(true));
                    }
                    return Ok(Value::Bool(self.logical_bool(&l.right, l.operator, l.line)?));
                }
                _ => {}
            }
        }

        let left = self.evaluate_expr(&l.left)?;
        let right = self.evaluate_expr(&l.right)?;

        match l.operator {
            LogicalOp::Equal => Ok(Value::Bool(left.is_equal(&right))),
            LogicalOp::NotEqual => Ok(Value::Bool(!left.is_equal(&right))),
            LogicalOp::Less => numeric_cmp(&left, &right, |a, b| a < b, l),
            LogicalOp::LessEqual => numeric_cmp(&left, &right, |a, b| a <= b, l),
            LogicalOp::Greater => numeric_cmp(&left, &right, |a, b| a > b, l),
            LogicalOp::GreaterEqual => numeric_cmp(&left, &right, |a, b| a >= b, l),
            LogicalOp::And => boolean_apply(&left, &right, |a, b| a && b, l),
            LogicalOp::Or => boolean_apply(&left, &right, |a, b| a || b, l),
        }
    }

    fn logical_bool(
        &mut self,
        expr: &Expr,
        op: LogicalOp,
        line: usize,
    ) -> Result<bool, RuntimeError> {
        let value = self.evaluate_expr(expr)?;
        value.as_bool().ok_or_else(|| {
            RuntimeError::type_mismatch(
                format!(
                    "operands of '{op}' must be booleans, got {}",
                    value.type_name()
                ),
                line,
            )
        })
    }

    fn evaluate_call(&mut self, c: &CallExpr) -> Result<Value, RuntimeError> {
        let callee = self.evaluate_expr(&c.callee)?;

        let mut args = Vec::with_capacity(c.arguments.len());
        for arg in &c.arguments {
            args.push(self.evaluate_expr(arg)?);
        }

        let Value::Function(func) = callee else {
            return Err(RuntimeError::NotCallable { line: c.line });
        };
        if args.len() != func.arity() {
            return Err(RuntimeError::ArityMismatch {
                expected: func.arity(),
                got: args.len(),
                line: c.line,
            });
        }
        self.call_function(&func, args)
    }

    /// Invoke a callable. User functions run their body in a fresh child of
    /// the CLOSURE's environment, not the caller's; a `Return` unwind is
    /// absorbed here and becomes the call's result.
    fn call_function(&mut self, func: &Callable, args: Vec<Value>) -> Result<Value, RuntimeError> {
        match func {
            Callable::Native(native) => Ok(native.call(&args)),
            Callable::User(user_fn) => {
                let env = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
                    &user_fn.closure,
                ))));
                for (param, arg) in user_fn.declaration.params.iter().zip(args) {
                    env.borrow_mut().define(param.clone(), arg);
                }

                match self.execute_block(&user_fn.declaration.body, env)? {
                    Flow::Return(value) => Ok(value),
                    Flow::Normal => Ok(Value::Nil),
                }
            }
        }
    }
}

fn numeric_operands(
    left: &Value,
    right: &Value,
    op: impl fmt::Display,
    line: usize,
) -> Result<(f64, f64), RuntimeError> {
    match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => Ok((l, r)),
        _ => Err(RuntimeError::type_mismatch(
            format!(
                "operands of '{op}' must be numbers, got {} and {}",
                left.type_name(),
                right.type_name()
            ),
            line,
        )),
    }
}

fn numeric_cmp(
    left: &Value,
    right: &Value,
    op: fn(f64, f64) -> bool,
    l: &LogicalExpr,
) -> Result<Value, RuntimeError> {
    let (a, b) = numeric_operands(left, right, l.operator, l.line)?;
    Ok(Value::Bool(op(a, b)))
}

fn boolean_apply(
    left: &Value,
    right: &Value,
    op: fn(bool, bool) -> bool,
    l: &LogicalExpr,
) -> Result<Value, RuntimeError> {
    match (left.as_bool(), right.as_bool()) {
        (Some(a), Some(b)) => Ok(Value::Bool(op(a, b))),
        _ => Err(RuntimeError::type_mismatch(
            format!(
                "operands of '{}' must be booleans, got {} and {}",
                l.operator,
                left.type_name(),
                right.type_name()
            ),
            l.line,
        )),
    }
}
