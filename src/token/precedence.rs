//! Binary-operator precedence and associativity
//!
//! The climbing parser compares these levels; `??` is listed at the `||`
//! level but climbs at the `&&` level so that unparenthesized mixing of the
//! two families can be detected and rejected.

use super::Token;

/// Binary-operator precedence levels, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Precedence {
    /// `||` and `??`
    LogicalOr = 1,
    /// `&&`
    LogicalAnd = 2,
    /// `|`
    BitOr = 3,
    /// `^`
    BitXor = 4,
    /// `&`
    BitAnd = 5,
    /// `==`, `!=`, `===`, `!==`
    Equality = 6,
    /// `<`, `>`, `<=`, `>=`, `in`, `instanceof`
    Relational = 7,
    /// `<<`, `>>`, `>>>`
    Shift = 8,
    /// `+`, `-`
    Additive = 9,
    /// `*`, `/`, `%`
    Multiplicative = 10,
}

/// Operator associativity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

impl Token {
    /// Precedence and associativity of a binary operator token
    ///
    /// `**` is absent: exponentiation is folded right-associatively by the
    /// unary parser, never by the climbing loop.
    pub fn binary_precedence(&self) -> Option<(Precedence, Associativity)> {
        use Associativity::Left;
        use Precedence::*;

        Some(match self {
            Token::OrOr | Token::Coalesce => (LogicalOr, Left),
            Token::AndAnd => (LogicalAnd, Left),
            Token::Pipe => (BitOr, Left),
            Token::Caret => (BitXor, Left),
            Token::Amp => (BitAnd, Left),
            Token::EqEq | Token::NotEq | Token::EqEqEq | Token::NotEqEq => (Equality, Left),
            Token::Lt
            | Token::Gt
            | Token::LtEq
            | Token::GtEq
            | Token::KwIn
            | Token::KwInstanceof => (Relational, Left),
            Token::Shl | Token::Shr | Token::UShr => (Shift, Left),
            Token::Plus | Token::Minus => (Additive, Left),
            Token::Star | Token::Slash | Token::Percent => (Multiplicative, Left),
            _ => return None,
        })
    }

    /// Is this `||` or `&&`?
    pub fn is_logical_op(&self) -> bool {
        matches!(self, Token::OrOr | Token::AndAnd)
    }
}
