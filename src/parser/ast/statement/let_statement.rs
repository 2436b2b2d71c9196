use std::fmt::Display;

use serde::Serialize;

use crate::lexer::Token;
use crate::parser::ast::{Expression, Identifier};

use super::Statement;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LetStatement {
    pub token: Token,
    pub name: Identifier,
    pub value: Expression,
}

impl Display for LetStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "let {} = {};", self.name, self.value)
    }
}

impl From<LetStatement> for Statement {
    fn from(value: LetStatement) -> Self {
        Statement::Let(value)
    }
}
