//! Syntax definition.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Add { lhs: Box<Expr>, rhs: Box<Expr> },
    Sub { lhs: Box<Expr>, rhs: Box<Expr> },
    Mul { lhs: Box<Expr>, rhs: Box<Expr> },
    Div { lhs: Box<Expr>, rhs: Box<Expr> },
    Num(i64),
    Neg { expr: Box<Expr> },
    Error,
}

/// Binary operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl Expr {
    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        let (lhs, rhs) = (Box::new(lhs), Box::new(rhs));
        match op {
            BinOp::Add => Self::Add { lhs, rhs },
            BinOp::Sub => Self::Sub { lhs, rhs },
            BinOp::Mul => Self::Mul { lhs, rhs },
            BinOp::Div => Self::Div { lhs, rhs },
        }
    }

    /// Compute the value of the expression, or `None` on overflow or
    /// division by zero.
    pub fn eval(&self) -> Option<i64> {
        match self {
            Self::Add { lhs, rhs } => lhs.eval()?.checked_add(rhs.eval()?),
            Self::Sub { lhs, rhs } => lhs.eval()?.checked_sub(rhs.eval()?),
            Self::Mul { lhs, rhs } => lhs.eval()?.checked_mul(rhs.eval()?),
            Self::Div { lhs, rhs } => lhs.eval()?.checked_div(rhs.eval()?),
            Self::Num(n) => Some(*n),
            Self::Neg { expr } => expr.eval()?.checked_neg(),
            Self::Error => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add { lhs, rhs } => write!(f, "(+ {} {})", lhs, rhs),
            Self::Sub { lhs, rhs } => write!(f, "(- {} {})", lhs, rhs),
            Self::Mul { lhs, rhs } => write!(f, "(* {} {})", lhs, rhs),
            Self::Div { lhs, rhs } => write!(f, "(/ {} {})", lhs, rhs),
            Self::Num(n) => write!(f, "{}", n),
            Self::Neg { expr } => write!(f, "(neg {})", expr),
            Self::Error => write!(f, "<error>"),
        }
    }
}

/// Attribute values of the arithmetic grammar.
#[derive(Debug, Clone)]
pub enum Value {
    /// The lexeme of a shifted token.
    Lexeme(String),
    Expr(Expr),
}

impl From<String> for Value {
    fn from(lexeme: String) -> Self {
        Self::Lexeme(lexeme)
    }
}

impl Value {
    pub fn into_expr(self) -> Expr {
        match self {
            Self::Expr(expr) => expr,
            Self::Lexeme(lexeme) => lexeme.parse().map_or(Expr::Error, Expr::Num),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_operators() {
        let num = Expr::Num;
        for (op, rendered, value) in [
            (BinOp::Add, "(+ 7 2)", Some(9)),
            (BinOp::Sub, "(- 7 2)", Some(5)),
            (BinOp::Mul, "(* 7 2)", Some(14)),
            (BinOp::Div, "(/ 7 2)", Some(3)),
        ] {
            let expr = Expr::binary(op, num(7), num(2));
            assert_eq!(expr.to_string(), rendered);
            assert_eq!(expr.eval(), value);
        }
        assert_eq!(Expr::binary(BinOp::Div, num(1), num(0)).eval(), None);
    }
}
