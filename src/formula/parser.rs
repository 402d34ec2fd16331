use super::{
    ast::{BinaryOp, Expr},
    error::{SyntaxError, SyntaxReason},
    lexer::{Token, TokenKind, tokenize},
};

/// Parses a band-math formula.
///
/// Grammar, left-associative with the usual precedence:
/// ```text
/// expr   := term (('+' | '-') term)*
/// term   := factor (('*' | '/') factor)*
/// factor := ['-'] (NUMBER | IDENT | '(' expr ')')
/// ```
/// Identifiers are upper-cased but not resolved; an unknown band name parses
/// fine and is only rejected when compiling for a camera kind.
///
/// # Errors
/// Returns a [`SyntaxError`] carrying the byte offset of the offending token.
pub fn parse(text: &str) -> Result<Expr, SyntaxError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, cursor: 0 };
    if parser.peek().kind == TokenKind::End {
        return Err(SyntaxError::new(parser.peek().pos, SyntaxReason::EmptyInput));
    }
    let expr = parser.expr()?;
    let rest = parser.peek();
    match rest.kind {
        TokenKind::End => Ok(expr),
        TokenKind::RParen => Err(SyntaxError::new(rest.pos, SyntaxReason::UnmatchedCloseParen)),
        _ => Err(SyntaxError::new(rest.pos, SyntaxReason::TrailingInput)),
    }
}

struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // the lexer guarantees a trailing End token, which is never consumed
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::End {
            self.cursor += 1;
        }
        token
    }

    fn expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.term()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
    }

    fn term(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.factor()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
    }

    fn factor(&mut self) -> Result<Expr, SyntaxError> {
        let negated = if self.peek().kind == TokenKind::Minus {
            self.advance();
            true
        } else {
            false
        };

        let token = self.advance();
        let operand = match token.kind {
            TokenKind::Number(value) => Expr::Number(value),
            TokenKind::Ident(name) => Expr::Band(name),
            TokenKind::LParen => {
                let inner = self.expr()?;
                let closing = self.advance();
                match closing.kind {
                    TokenKind::RParen => Expr::Group(Box::new(inner)),
                    TokenKind::End => {
                        return Err(SyntaxError::new(token.pos, SyntaxReason::UnclosedParen));
                    }
                    _ => return Err(SyntaxError::new(closing.pos, SyntaxReason::TrailingInput)),
                }
            }
            _ => return Err(SyntaxError::new(token.pos, SyntaxReason::MissingOperand)),
        };

        Ok(if negated { Expr::Negate(Box::new(operand)) } else { operand })
    }
}
