use std::fmt::Display;

use serde::Serialize;

use crate::lexer::Token;

use super::Expression;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallExpression {
    pub token: Token,
    pub function: Box<Expression>,
    pub arguments: Vec<Expression>,
}

impl Display for CallExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let arguments = self
            .arguments
            .iter()
            .map(|argument| argument.to_string())
            .collect::<Vec<_>>();

        write!(f, "{}({})", self.function, arguments.join(", "))
    }
}

impl From<CallExpression> for Expression {
    fn from(value: CallExpression) -> Self {
        Expression::Call(value)
    }
}
