use std::fmt;

use crate::interpreter::callable::Callable;

#[derive(Clone, Debug)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    Nil,
    Function(Callable),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Str(_) => "string",
            Self::Bool(_) => "boolean",
            Self::Nil => "nil",
            Self::Function(_) => "function",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_equal(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Integral numbers keep a trailing ".0", matching the original
            // runtime's printing.
            Self::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{n:.1}")
                } else {
                    write!(f, "{n}")
                }
            }
            Self::Str(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Nil => write!(f, "nil"),
            Self::Function(func) => write!(f, "{func}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Number(1.0), "1.0")]
    #[case(Value::Number(0.0), "0.0")]
    #[case(Value::Number(-3.0), "-3.0")]
    #[case(Value::Number(2.5), "2.5")]
    #[case(Value::Str("hi".to_string()), "hi")]
    #[case(Value::Bool(true), "true")]
    #[case(Value::Nil, "nil")]
    fn display(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[test]
    fn equality_is_by_value_within_a_type() {
        assert!(Value::Number(1.0).is_equal(&Value::Number(1.0)));
        assert!(Value::Nil.is_equal(&Value::Nil));
        assert!(Value::Str("a".to_string()).is_equal(&Value::Str("a".to_string())));
        assert!(!Value::Number(1.0).is_equal(&Value::Number(2.0)));
    }

    #[test]
    fn equality_across_types_is_false() {
        assert!(!Value::Number(1.0).is_equal(&Value::Str("1".to_string())));
        assert!(!Value::Bool(false).is_equal(&Value::Nil));
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::Number(1.0).type_name(), "number");
        assert_eq!(Value::Nil.type_name(), "nil");
    }
}
