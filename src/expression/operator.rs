use std::fmt;

use crate::error::Error;
use crate::position::Position;

/// The operator symbols recognized by [`super::Expr::Operator`], per
/// `spec.md` §4.4's cross-type dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    Add,
    Subtract,
    Multiply,
    Divide,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    And,
    Or,
    Not,
}

impl OperatorKind {
    pub fn from_symbol(symbol: &str, position: Position) -> Result<Self, Error> {
        Ok(match symbol {
            "+" => OperatorKind::Add,
            "-" => OperatorKind::Subtract,
            "*" => OperatorKind::Multiply,
            "/" => OperatorKind::Divide,
            "<" => OperatorKind::Less,
            "<=" => OperatorKind::LessOrEqual,
            ">" => OperatorKind::Greater,
            ">=" => OperatorKind::GreaterOrEqual,
            "&&" => OperatorKind::And,
            "||" => OperatorKind::Or,
            "!" => OperatorKind::Not,
            other => {
                return Err(Error::invalid_expression(
                    format!("'{other}' is not a recognized operator"),
                    position,
                ))
            }
        })
    }

    /// `!` takes exactly one operand; every other operator accepts one
    /// or more and folds left to right when given more than one
    /// (`spec.md` §4.3/§4.5).
    pub fn is_unary(&self) -> bool {
        matches!(self, OperatorKind::Not)
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            OperatorKind::Add => "+",
            OperatorKind::Subtract => "-",
            OperatorKind::Multiply => "*",
            OperatorKind::Divide => "/",
            OperatorKind::Less => "<",
            OperatorKind::LessOrEqual => "<=",
            OperatorKind::Greater => ">",
            OperatorKind::GreaterOrEqual => ">=",
            OperatorKind::And => "&&",
            OperatorKind::Or => "||",
            OperatorKind::Not => "!",
        };
        f.write_str(symbol)
    }
}
