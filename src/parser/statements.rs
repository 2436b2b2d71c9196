use crate::lexer::TokenKind;

use super::ast::{
    BlockStatement, Expression, ExpressionStatement, Identifier, LetStatement, ReturnStatement,
    Statement,
};
use super::{Parser, Precedence};

impl<'a> Parser<'a> {
    pub(super) fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur_token.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        let token = self.cur_token.clone();

        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }

        let name = Identifier {
            token: self.cur_token.clone(),
            value: self.cur_token.literal.clone(),
        };

        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }

        self.next_token();

        let value = self.parse_expression(Precedence::Lowest);

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        let mut value = value?;

        // Let the compiler resolve `let f = fn() { ... f() ... }` within the
        // function's own body.
        if let Expression::Function(function) = &mut value {
            function.name = Some(name.value.clone());
        }

        Some(LetStatement { token, name, value }.into())
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let token = self.cur_token.clone();

        self.next_token();

        let return_value = self.parse_expression(Precedence::Lowest);

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(
            ReturnStatement {
                token,
                return_value: return_value?,
            }
            .into(),
        )
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let token = self.cur_token.clone();

        let expression = self.parse_expression(Precedence::Lowest);

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(
            ExpressionStatement {
                token,
                expression: expression?,
            }
            .into(),
        )
    }

    pub(super) fn parse_block_statement(&mut self) -> BlockStatement {
        let token = self.cur_token.clone();
        let mut statements = vec![];

        self.next_token();

        while !self.cur_token_is(TokenKind::RBrace) && !self.cur_token_is(TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }

        BlockStatement { token, statements }
    }
}
