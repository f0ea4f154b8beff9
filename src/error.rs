use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

// ============= Compile-time errors (with miette diagnostics) =============

#[derive(Error, Debug, Diagnostic)]
pub enum CompileError {
    #[error("scan error: line {line}: {message}")]
    #[diagnostic(code(treelox::scan))]
    Scan {
        message: String,
        line: usize,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },

    #[error("parse error: line {line}: {message}")]
    #[diagnostic(code(treelox::parse))]
    Parse {
        message: String,
        line: usize,
        #[label("here")]
        span: SourceSpan,
        #[source_code]
        src: miette::NamedSource<String>,
    },
}

impl CompileError {
    pub fn scan(message: impl Into<String>, line: usize, offset: usize, len: usize) -> Self {
        Self::Scan {
            message: message.into(),
            line,
            span: SourceSpan::new(offset.into(), len),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn parse(message: impl Into<String>, line: usize, offset: usize, len: usize) -> Self {
        Self::Parse {
            message: message.into(),
            line,
            span: SourceSpan::new(offset.into(), len),
            src: miette::NamedSource::new("input", String::new()),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Self::Scan { line, .. } | Self::Parse { line, .. } => *line,
        }
    }

    /// Attach source code for fancy miette diagnostics
    pub fn with_source_code(self, name: impl Into<String>, source: impl Into<String>) -> Self {
        let src = miette::NamedSource::new(name.into(), source.into());
        match self {
            Self::Scan {
                message,
                line,
                span,
                ..
            } => Self::Scan {
                message,
                line,
                span,
                src,
            },
            Self::Parse {
                message,
                line,
                span,
                ..
            } => Self::Parse {
                message,
                line,
                span,
                src,
            },
        }
    }
}

// ============= Runtime errors =============

/// One variant per way a well-parsed program can still fail while running.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("line {line}: undefined variable '{name}'")]
    UndefinedVariable { name: String, line: usize },

    #[error("line {line}: {message}")]
    TypeMismatch { message: String, line: usize },

    #[error("line {line}: can only call functions")]
    NotCallable { line: usize },

    #[error("line {line}: expected {expected} arguments but got {got}")]
    ArityMismatch {
        expected: usize,
        got: usize,
        line: usize,
    },

    #[error("line {line}: 'return' outside of a function")]
    ReturnOutsideFunction { line: usize },
}

impl RuntimeError {
    pub fn type_mismatch(message: impl Into<String>, line: usize) -> Self {
        Self::TypeMismatch {
            message: message.into(),
            line,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            Self::UndefinedVariable { line, .. }
            | Self::TypeMismatch { line, .. }
            | Self::NotCallable { line }
            | Self::ArityMismatch { line, .. }
            | Self::ReturnOutsideFunction { line } => *line,
        }
    }
}

// ============= Tests =============

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_implements_diagnostic() {
        let err = CompileError::scan("test", 1, 0, 1);
        let diag: &dyn Diagnostic = &err;
        assert!(diag.code().is_some());
    }

    #[test]
    fn compile_error_with_source() {
        let err = CompileError::parse("expected ';'", 1, 5, 1)
            .with_source_code("test.lox", "var x = 1\n");
        assert!(matches!(err, CompileError::Parse { .. }));
    }

    #[test]
    fn compile_error_display_includes_line() {
        let err = CompileError::parse("expected ';'", 3, 20, 1);
        assert_eq!(err.line(), 3);
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn runtime_error_display_includes_line() {
        let err = RuntimeError::UndefinedVariable {
            name: "z".to_string(),
            line: 2,
        };
        assert_eq!(err.to_string(), "line 2: undefined variable 'z'");
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn arity_mismatch_display() {
        let err = RuntimeError::ArityMismatch {
            expected: 1,
            got: 2,
            line: 4,
        };
        assert_eq!(err.to_string(), "line 4: expected 1 arguments but got 2");
    }

    #[test]
    fn type_mismatch_constructor() {
        let err = RuntimeError::type_mismatch("operands of '+' must be numbers", 7);
        assert!(matches!(err, RuntimeError::TypeMismatch { line: 7, .. }));
    }
}
