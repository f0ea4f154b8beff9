pub mod printer;

use serde::Serialize;

/// Statement nodes. A program is an ordered `Vec<Stmt>`; blocks and function
/// bodies nest the same type. Nodes own their children exclusively and are
/// never mutated after parsing.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Stmt {
    Expression(ExprStmt),
    Print(PrintStmt),
    Var(VarStmt),
    Block(BlockStmt),
    If(IfStmt),
    While(WhileStmt),
    Function(FunctionStmt),
    Return(ReturnStmt),
}

impl Stmt {
    pub fn line(&self) -> usize {
        match self {
            Self::Expression(s) => s.line,
            Self::Print(s) => s.line,
            Self::Var(s) => s.line,
            Self::Block(s) => s.line,
            Self::If(s) => s.line,
            Self::While(s) => s.line,
            Self::Function(s) => s.line,
            Self::Return(s) => s.line,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExprStmt {
    pub expression: Expr,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrintStmt {
    pub expression: Expr,
    pub line: usize,
}

/// The name can be absent: `var` not followed by an identifier still parses
/// to a (useless) declaration. A missing or malformed initializer is replaced
/// by a `nil` literal during parsing, so the initializer is always present.
#[derive(Debug, Clone, Serialize)]
pub struct VarStmt {
    pub name: Option<String>,
    pub initializer: Expr,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionStmt {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub line: usize,
}

/// `return;` parses with a `nil` literal as its value.
#[derive(Debug, Clone, Serialize)]
pub struct ReturnStmt {
    pub value: Expr,
    pub line: usize,
}

/// Expression nodes. `Binary` carries arithmetic only; equality, comparison,
/// `and`, and `or` all share the `Logical` node, distinguished by operator.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Expr {
    Literal(LiteralExpr),
    Variable(VariableExpr),
    Assign(AssignExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Logical(LogicalExpr),
    Call(CallExpr),
    Grouping(GroupingExpr),
}

impl Expr {
    pub fn line(&self) -> usize {
        match self {
            Self::Literal(e) => e.line,
            Self::Variable(e) => e.line,
            Self::Assign(e) => e.line,
            Self::Unary(e) => e.line,
            Self::Binary(e) => e.line,
            Self::Logical(e) => e.line,
            Self::Call(e) => e.line,
            Self::Grouping(e) => e.line,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LiteralExpr {
    pub value: LiteralValue,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Bool(bool),
    Nil,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableExpr {
    pub name: String,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignExpr {
    pub name: String,
    pub value: Box<Expr>,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnaryExpr {
    pub operator: UnaryOp,
    pub operand: Box<Expr>,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum UnaryOp {
    #[strum(serialize = "-")]
    Negate,
    #[strum(serialize = "!")]
    Not,
}

#[derive(Debug, Clone, Serialize)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOp,
    pub right: Box<Expr>,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum BinaryOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogicalExpr {
    pub left: Box<Expr>,
    pub operator: LogicalOp,
    pub right: Box<Expr>,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum LogicalOp {
    #[strum(serialize = "and")]
    And,
    #[strum(serialize = "or")]
    Or,
    #[strum(serialize = "==")]
    Equal,
    #[strum(serialize = "!=")]
    NotEqual,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = "<=")]
    LessEqual,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = ">=")]
    GreaterEqual,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub arguments: Vec<Expr>,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupingExpr {
    pub expression: Box<Expr>,
    pub line: usize,
}
