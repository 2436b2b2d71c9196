use serde::Serialize;

use super::TokenKind;

/// A single lexeme: its category and the literal text it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>) -> Token {
        Token {
            kind,
            literal: literal.into(),
        }
    }

    pub fn eof() -> Token {
        Token::new(TokenKind::Eof, "")
    }
}
