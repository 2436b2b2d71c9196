mod expression;
mod statement;

pub use expression::*;
pub use statement::*;

use std::fmt::Display;

use serde::Serialize;

/// An ordered sequence of statements; the root of every parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in &self.statements {
            write!(f, "{statement}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::{Token, TokenKind};

    use super::*;

    #[test]
    fn test_program_string() {
        let program = Program {
            statements: vec![Statement::Let(LetStatement {
                token: Token::new(TokenKind::Let, "let"),
                name: Identifier {
                    token: Token::new(TokenKind::Ident, "myVar"),
                    value: "myVar".into(),
                },
                value: Expression::Identifier(Identifier {
                    token: Token::new(TokenKind::Ident, "anotherVar"),
                    value: "anotherVar".into(),
                }),
            })],
        };

        assert_eq!("let myVar = anotherVar;", program.to_string());
    }
}
