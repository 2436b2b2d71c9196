use std::fmt::Display;

use serde::Serialize;

use crate::lexer::Token;

use super::Expression;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefixExpression {
    pub token: Token,
    pub operator: String,
    pub right: Box<Expression>,
}

impl Display for PrefixExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}{})", self.operator, self.right)
    }
}

impl From<PrefixExpression> for Expression {
    fn from(value: PrefixExpression) -> Self {
        Expression::Prefix(value)
    }
}
