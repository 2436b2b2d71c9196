use std::fmt::Display;

use serde::Serialize;

use crate::lexer::Token;
use crate::parser::ast::BlockStatement;

use super::{Expression, Identifier};

/// A function literal. `name` is only set when the literal is the direct
/// right-hand side of a `let`, which lets the compiler resolve the function
/// within its own body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionLiteral {
    pub token: Token,
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub name: Option<String>,
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parameters = self
            .parameters
            .iter()
            .map(|parameter| parameter.to_string())
            .collect::<Vec<_>>();

        write!(f, "fn({}) {}", parameters.join(", "), self.body)
    }
}

impl From<FunctionLiteral> for Expression {
    fn from(value: FunctionLiteral) -> Self {
        Expression::Function(value)
    }
}
