use std::fmt::Display;

use serde::Serialize;

use crate::lexer::Token;
use crate::parser::ast::Expression;

use super::Statement;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnStatement {
    pub token: Token,
    pub return_value: Expression,
}

impl Display for ReturnStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "return {};", self.return_value)
    }
}

impl From<ReturnStatement> for Statement {
    fn from(value: ReturnStatement) -> Self {
        Statement::Return(value)
    }
}
