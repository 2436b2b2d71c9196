use std::fmt::Display;

use serde::Serialize;

use crate::lexer::Token;

use super::Expression;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrayLiteral {
    pub token: Token,
    pub elements: Vec<Expression>,
}

impl Display for ArrayLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let elements = self
            .elements
            .iter()
            .map(|element| element.to_string())
            .collect::<Vec<_>>();

        write!(f, "[{}]", elements.join(", "))
    }
}

impl From<ArrayLiteral> for Expression {
    fn from(value: ArrayLiteral) -> Self {
        Expression::Array(value)
    }
}
