mod block;
mod expression_statement;
mod let_statement;
mod return_statement;

pub use block::*;
pub use expression_statement::*;
pub use let_statement::*;
pub use return_statement::*;

use std::fmt::Display;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Statement {
    Let(LetStatement),
    Return(ReturnStatement),
    Expression(ExpressionStatement),
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Let(inner) => inner.fmt(f),
            Statement::Return(inner) => inner.fmt(f),
            Statement::Expression(inner) => inner.fmt(f),
        }
    }
}
