use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ast::FunctionStmt;
use crate::interpreter::environment::Environment;
use crate::interpreter::value::Value;

/// Something invocable: a native binding or a user-defined function.
#[derive(Debug, Clone)]
pub enum Callable {
    Native(NativeFunction),
    User(LoxFunction),
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Self::Native(n) => n.name(),
            Self::User(u) => u.declaration.name.as_deref().unwrap_or("anonymous"),
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Self::Native(n) => n.arity(),
            Self::User(u) => u.declaration.params.len(),
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(_) => write!(f, "<native fn>"),
            Self::User(_) => write!(f, "<fn {}>", self.name()),
        }
    }
}

/// A user function value: the declaration it was made from plus the
/// environment that was current at the declaration site. Holding that
/// environment by reference is what makes lexical closures work.
#[derive(Debug, Clone)]
pub struct LoxFunction {
    pub declaration: FunctionStmt,
    pub closure: Rc<RefCell<Environment>>,
}

#[derive(Debug, Clone, Copy)]
pub enum NativeFunction {
    Clock,
}

impl NativeFunction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clock => "clock",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Self::Clock => 0,
        }
    }

    pub fn call(&self, _args: &[Value]) -> Value {
        match self {
            Self::Clock => {
                let secs = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .expect("system clock should be after unix epoch")
                    .as_secs_f64();
                Value::Number(secs)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_has_zero_arity() {
        assert_eq!(NativeFunction::Clock.arity(), 0);
        assert_eq!(NativeFunction::Clock.name(), "clock");
    }

    #[test]
    fn clock_returns_positive_seconds() {
        let value = NativeFunction::Clock.call(&[]);
        assert!(matches!(value, Value::Number(n) if n > 0.0));
    }

    #[test]
    fn display_forms() {
        let native = Callable::Native(NativeFunction::Clock);
        assert_eq!(native.to_string(), "<native fn>");

        let user = Callable::User(LoxFunction {
            declaration: FunctionStmt {
                name: Some("f".to_string()),
                params: vec!["a".to_string()],
                body: Vec::new(),
                line: 1,
            },
            closure: Rc::new(RefCell::new(Environment::new())),
        });
        assert_eq!(user.to_string(), "<fn f>");
        assert_eq!(user.arity(), 1);
    }
}
