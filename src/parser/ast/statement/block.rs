use std::fmt::Display;

use serde::Serialize;

use crate::lexer::Token;

use super::Statement;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in &self.statements {
            write!(f, "{statement}")?;
        }

        Ok(())
    }
}
