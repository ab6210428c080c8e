//! Expression AST and parser.

use crate::error::{Result, TemplateError};

use super::lexer::{tokenize, Token};
use super::DELIMITER;

/// What an expression does when evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    /// `@@path@@` - substitute a value.
    Placeholder,
    /// `@@path==literal?@@` - equality test.
    Conditional,
    /// `@@path(...)@@` - enumerate an array.
    Loop,
}

/// One key of a path, optionally marked as holding an array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub key: String,
    pub is_array: bool,
}

/// A dot-separated path into the data tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub segments: Vec<Segment>,
}

impl Path {
    /// Returns `true` if the last segment is an array.
    pub fn ends_in_array(&self) -> bool {
        self.segments.last().is_some_and(|s| s.is_array)
    }
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    /// The expression text, delimiters included.
    pub source: String,
    pub kind: ExpressionKind,
    pub path: Path,
    /// Right-hand side of a conditional, unquoted.
    pub literal: Option<String>,
}

impl Expression {
    /// Parses a full `@@...@@` expression.
    pub fn parse(source: &str) -> Result<Expression> {
        let inner = source
            .strip_prefix(DELIMITER)
            .and_then(|s| s.strip_suffix(DELIMITER))
            .filter(|_| source.len() >= 2 * DELIMITER.len())
            .ok_or_else(|| TemplateError::syntax(source, "missing '@@' delimiters"))?;

        if inner.trim().is_empty() {
            return Err(TemplateError::syntax(source, "empty expression"));
        }

        let tokens = tokenize(source, inner)?;
        Parser {
            source,
            tokens: &tokens,
            pos: 0,
        }
        .parse_expression()
    }
}

struct Parser<'t> {
    source: &'t str,
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn error(&self, reason: impl Into<String>) -> TemplateError {
        TemplateError::syntax(self.source, reason)
    }

    fn parse_expression(mut self) -> Result<Expression> {
        let path = self.parse_path()?;

        let (kind, literal) = match self.next() {
            None => {
                let kind = if path.ends_in_array() {
                    ExpressionKind::Loop
                } else {
                    ExpressionKind::Placeholder
                };
                (kind, None)
            }
            Some(Token::Eq) => {
                let literal = match self.next() {
                    Some(Token::Literal(text)) => unquote(text).to_string(),
                    _ => return Err(self.error("missing literal after '=='")),
                };
                match self.next() {
                    Some(Token::Question) => {}
                    _ => return Err(self.error("conditional must end with '?'")),
                }
                (ExpressionKind::Conditional, Some(literal))
            }
            Some(Token::Question) => return Err(self.error("conditional is missing '=='")),
            Some(other) => return Err(self.error(format!("unexpected {:?}", other))),
        };

        if self.peek().is_some() {
            return Err(self.error("trailing input after expression"));
        }

        Ok(Expression {
            source: self.source.to_string(),
            kind,
            path,
            literal,
        })
    }

    fn parse_path(&mut self) -> Result<Path> {
        let mut segments = Vec::new();
        loop {
            let key = match self.next() {
                Some(Token::Key(key)) => key.clone(),
                _ => return Err(self.error("expected a key")),
            };
            let is_array = matches!(self.peek(), Some(Token::ArrayMarker));
            if is_array {
                self.pos += 1;
            }
            segments.push(Segment { key, is_array });

            match self.peek() {
                Some(Token::Dot) => self.pos += 1,
                Some(Token::Key(_)) | Some(Token::ArrayMarker) => {
                    return Err(self.error("path segments must be separated by '.'"));
                }
                _ => return Ok(Path { segments }),
            }
        }
    }
}

/// Strips one pair of matching single or double quotes.
fn unquote(literal: &str) -> &str {
    for quote in ['\'', '"'] {
        if literal.len() >= 2 && literal.starts_with(quote) && literal.ends_with(quote) {
            return &literal[1..literal.len() - 1];
        }
    }
    literal
}
