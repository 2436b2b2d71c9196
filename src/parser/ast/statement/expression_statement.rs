use std::fmt::Display;

use serde::Serialize;

use crate::lexer::Token;
use crate::parser::ast::Expression;

use super::Statement;

/// A bare expression in statement position, e.g. `x + 10;`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpressionStatement {
    pub token: Token,
    pub expression: Expression,
}

impl Display for ExpressionStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.expression.fmt(f)
    }
}

impl From<ExpressionStatement> for Statement {
    fn from(value: ExpressionStatement) -> Self {
        Statement::Expression(value)
    }
}
