use smol_str::SmolStr;
use std::fmt::{self, Display, Formatter};

/// Unary operators: numeric negation and boolean negation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Binary operators, grouped by the grammar level that introduces them.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        write!(f, "{s}")
    }
}

/// An expression abstract syntax tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    NumberLit(f64),
    BoolLit(bool),
    Ident(SmolStr),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Re-serialise the tree back to source text. Used by the compiler to
    /// build a deterministic cache key for the IR without retaining the
    /// original source string.
    pub fn to_canonical_string(&self) -> String {
        match self {
            Expr::NumberLit(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{n:.1}")
                } else {
                    format!("{n}")
                }
            }
            Expr::BoolLit(b) => b.to_string(),
            Expr::Ident(name) => name.to_string(),
            Expr::Unary { op, expr } => {
                let op_str = match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "!",
                };
                format!("{op_str}({})", expr.to_canonical_string())
            }
            Expr::Binary { op, lhs, rhs } => format!(
                "({} {op} {})",
                lhs.to_canonical_string(),
                rhs.to_canonical_string()
            ),
        }
    }
}
