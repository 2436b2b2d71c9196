use std::fmt::Display;

use serde::Serialize;

use crate::lexer::Token;

use super::Expression;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl From<Identifier> for Expression {
    fn from(value: Identifier) -> Self {
        Expression::Identifier(value)
    }
}
