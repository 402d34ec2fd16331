use super::error::{SyntaxError, SyntaxReason};

#[derive(Debug, Clone, PartialEq)]
pub(super) enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    End,
}

/// A token together with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Token {
    pub(super) kind: TokenKind,
    pub(super) pos: usize,
}

/// Splits `text` into tokens. The returned vector always ends with a
/// [`TokenKind::End`] token positioned at `text.len()`.
pub(super) fn tokenize(text: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        let kind = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = pos;
                let mut seen_dot = false;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_digit() || (d == '.' && !seen_dot) {
                        seen_dot |= d == '.';
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let literal = &text[pos..end];
                let value = match literal.parse::<f64>() {
                    Ok(v) if v.is_finite() && literal != "." => v,
                    _ => return Err(SyntaxError::new(pos, SyntaxReason::MalformedNumber)),
                };
                tokens.push(Token { kind: TokenKind::Number(value), pos });
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = pos;
                while let Some(&(i, d)) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        end = i + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let ident = text[pos..end].to_ascii_uppercase();
                tokens.push(Token { kind: TokenKind::Ident(ident), pos });
                continue;
            }
            other => return Err(SyntaxError::new(pos, SyntaxReason::UnexpectedCharacter(other))),
        };
        chars.next();
        tokens.push(Token { kind, pos });
    }

    tokens.push(Token { kind: TokenKind::End, pos: text.len() });
    Ok(tokens)
}
