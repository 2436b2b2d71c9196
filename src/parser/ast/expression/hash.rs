use std::fmt::Display;

use serde::Serialize;

use crate::lexer::Token;

use super::Expression;

/// A hash literal. Pairs are kept in source order; the compiler reorders
/// them by their printed form to keep the produced bytecode deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashLiteral {
    pub token: Token,
    pub pairs: Vec<(Expression, Expression)>,
}

impl Display for HashLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pairs = self
            .pairs
            .iter()
            .map(|(key, value)| format!("{key}:{value}"))
            .collect::<Vec<_>>();

        write!(f, "{{{}}}", pairs.join(", "))
    }
}

impl From<HashLiteral> for Expression {
    fn from(value: HashLiteral) -> Self {
        Expression::Hash(value)
    }
}
