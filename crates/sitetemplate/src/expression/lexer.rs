//! Tokenizer for the text between the `@@` delimiters.
//!
//! The path part is split into keys, dots and `(...)` array markers. Once
//! `==` is seen the lexer stops interpreting characters: everything up to the
//! closing `?` is a single literal token, so literals may contain dots or
//! parentheses.

use crate::error::{Result, TemplateError};

/// The array marker, matched exactly.
pub const ARRAY_MARKER: &str = "(...)";

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A path key, trimmed of surrounding whitespace.
    Key(String),
    /// `.` separating path segments.
    Dot,
    /// `(...)` after a key.
    ArrayMarker,
    /// `==` in a conditional.
    Eq,
    /// Right-hand side of a conditional, trimmed.
    Literal(String),
    /// Trailing `?` of a conditional.
    Question,
}

/// Splits `inner` (the expression without its `@@` delimiters) into tokens.
///
/// `source` is the full expression, used in error messages.
pub fn tokenize(source: &str, inner: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut key = String::new();
    let mut rest = inner;

    while let Some(ch) = rest.chars().next() {
        match ch {
            '.' => {
                flush_key(&mut key, &mut tokens);
                tokens.push(Token::Dot);
                rest = &rest[1..];
            }
            '(' => {
                if !rest.starts_with(ARRAY_MARKER) {
                    return Err(TemplateError::syntax(
                        source,
                        format!("array marker must be exactly '{}'", ARRAY_MARKER),
                    ));
                }
                flush_key(&mut key, &mut tokens);
                tokens.push(Token::ArrayMarker);
                rest = &rest[ARRAY_MARKER.len()..];
            }
            ')' => {
                return Err(TemplateError::syntax(source, "unbalanced ')'"));
            }
            '=' if rest.starts_with("==") => {
                flush_key(&mut key, &mut tokens);
                tokens.push(Token::Eq);
                let literal = &rest[2..];
                let (literal, question) = match literal.strip_suffix('?') {
                    Some(stripped) => (stripped, true),
                    None => (literal, false),
                };
                tokens.push(Token::Literal(literal.trim().to_string()));
                if question {
                    tokens.push(Token::Question);
                }
                return Ok(tokens);
            }
            '?' => {
                if rest.len() > 1 {
                    return Err(TemplateError::syntax(source, "'?' may only end a conditional"));
                }
                flush_key(&mut key, &mut tokens);
                tokens.push(Token::Question);
                rest = &rest[1..];
            }
            _ => {
                key.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    flush_key(&mut key, &mut tokens);
    Ok(tokens)
}

fn flush_key(key: &mut String, tokens: &mut Vec<Token>) {
    let trimmed = key.trim();
    if !trimmed.is_empty() {
        tokens.push(Token::Key(trimmed.to_string()));
    }
    key.clear();
}
