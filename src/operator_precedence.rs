use crate::ast::BinaryOperator;
use crate::token::{Token, TokenKind};

/// Operator precedence levels (higher = tighter binding).
/// Follows the PostgreSQL operator table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum OperatorPrecedence {
    Lowest = 0,
    Or = 1,
    And = 2,
    Not = 3,
    Is = 4,
    Comparison = 5,
    /// BETWEEN, IN, LIKE, ILIKE
    Membership = 6,
    /// Any operator without a dedicated level (`||`, `->>`, `@>`, ...).
    Other = 7,
    Addition = 8,
    Multiplication = 9,
    Exponent = 10,
    Unary = 11,
    Cast = 12,
}

impl OperatorPrecedence {
    /// Precedence of the infix operator starting at `token`, if it is one.
    /// `next` disambiguates `NOT BETWEEN`/`NOT IN`/`NOT LIKE` from a prefix NOT.
    pub fn of_infix(token: &Token, next: &Token) -> Option<Self> {
        match token.kind {
            TokenKind::Keyword => {
                let kw = token.text.to_ascii_uppercase();
                match kw.as_str() {
                    "OR" => Some(Self::Or),
                    "AND" => Some(Self::And),
                    "IS" => Some(Self::Is),
                    "BETWEEN" | "IN" | "LIKE" | "ILIKE" => Some(Self::Membership),
                    "NOT" if ["BETWEEN", "IN", "LIKE", "ILIKE"]
                        .iter()
                        .any(|kw| next.is_keyword(kw)) =>
                    {
                        Some(Self::Membership)
                    }
                    _ => None,
                }
            }
            TokenKind::Operator if token.text == "::" => Some(Self::Cast),
            TokenKind::Operator => Some(Self::of_symbol(&token.text)),
            _ => None,
        }
    }

    fn of_symbol(symbol: &str) -> Self {
        BinaryOperator::from_symbol(symbol).precedence()
    }
}

impl BinaryOperator {
    pub fn precedence(&self) -> OperatorPrecedence {
        match self {
            Self::Or => OperatorPrecedence::Or,
            Self::And => OperatorPrecedence::And,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => {
                OperatorPrecedence::Comparison
            }
            Self::Plus | Self::Minus => OperatorPrecedence::Addition,
            Self::Multiply | Self::Divide | Self::Modulo => OperatorPrecedence::Multiplication,
            Self::Exponent => OperatorPrecedence::Exponent,
            Self::Custom(op) if op == "**" => OperatorPrecedence::Exponent,
            Self::StringConcat | Self::Custom(_) => OperatorPrecedence::Other,
        }
    }
}
