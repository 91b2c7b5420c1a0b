//! Expression trees for member bodies and field initializers.
//!
//! ```
//! use quill_expr::Expr;
//!
//! // this.F + 1
//! let body = Expr::add(Expr::this().member("F"), Expr::int(1));
//! assert!(matches!(body, Expr::Binary(..)));
//! ```

use quill_core::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    /// Short-circuit `&&`.
    And,
    /// Short-circuit `||`.
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem
        )
    }

    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Neg,
    /// Logical not.
    Not,
}

/// An unreduced body expression.
#[derive(Debug, Clone)]
pub enum Expr {
    Const(Value),
    /// Argument by position in the full shape; for instance members `Param(0)` is `this`.
    Param(usize),
    This,
    /// A name bound in the symbol environment.
    Symbol(String),
    /// Field or property read. A type target reads a static member.
    Member(Box<Expr>, String),
    /// Method call. A type target calls a static method.
    Call(Box<Expr>, String, Vec<Expr>),
    /// Construct an instance of a named type.
    New(String, Vec<Expr>),
    /// Field or property write; evaluates to the stored value.
    Assign(Box<Expr>, String, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    /// Evaluate in order; the last expression is the result.
    Sequence(Vec<Expr>),
}

// ============================================================================
// Builders
// ============================================================================

impl Expr {
    pub fn int(v: i32) -> Self {
        Expr::Const(Value::Int32(v))
    }

    pub fn long(v: i64) -> Self {
        Expr::Const(Value::Int64(v))
    }

    pub fn float(v: f64) -> Self {
        Expr::Const(Value::Float64(v))
    }

    pub fn bool(v: bool) -> Self {
        Expr::Const(Value::Bool(v))
    }

    pub fn string(s: &str) -> Self {
        Expr::Const(Value::string(s))
    }

    pub fn null() -> Self {
        Expr::Const(Value::Null)
    }

    pub fn param(index: usize) -> Self {
        Expr::Param(index)
    }

    pub fn this() -> Self {
        Expr::This
    }

    pub fn symbol(name: &str) -> Self {
        Expr::Symbol(name.to_string())
    }

    pub fn new_object(type_name: &str, args: Vec<Expr>) -> Self {
        Expr::New(type_name.to_string(), args)
    }

    pub fn member(self, name: &str) -> Self {
        Expr::Member(Box::new(self), name.to_string())
    }

    pub fn call(self, name: &str, args: Vec<Expr>) -> Self {
        Expr::Call(Box::new(self), name.to_string(), args)
    }

    pub fn assign(self, name: &str, value: Expr) -> Self {
        Expr::Assign(Box::new(self), name.to_string(), Box::new(value))
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Add, lhs, rhs)
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Sub, lhs, rhs)
    }

    pub fn mul(lhs: Expr, rhs: Expr) -> Self {
        Self::binary(BinaryOp::Mul, lhs, rhs)
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary(op, Box::new(operand))
    }

    pub fn conditional(cond: Expr, then: Expr, otherwise: Expr) -> Self {
        Expr::Conditional(Box::new(cond), Box::new(then), Box::new(otherwise))
    }

    pub fn sequence(exprs: Vec<Expr>) -> Self {
        Expr::Sequence(exprs)
    }
}
