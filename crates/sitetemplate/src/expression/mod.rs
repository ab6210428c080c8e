//! Placeholder, conditional and loop expressions.
//!
//! Expressions appear in template property names, property values and node
//! names. Three forms exist:
//!
//! | Form | Example | Meaning |
//! |------|---------|---------|
//! | Placeholder | `@@site.title@@` | value at the path |
//! | Conditional | `@@site.kind=='course'?@@` | equality test |
//! | Loop | `@@site.pages(...)@@` | enumerate the array |
//!
//! A path is a dot-separated list of keys. A key followed by `(...)` holds an
//! array; inside a loop body it is indexed with the current iteration of the
//! loop at the same nesting level (see [`LoopContext`]).
//!
//! Evaluation runs in three steps: [`lexer`] splits the text into tokens,
//! [`parser`] builds an [`Expression`], and [`eval`] walks the path through
//! the data tree.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use sitetemplate::{ExpressionEngine, LoopContext, Scalar};
//!
//! let data = json!({"site": {"title": "Physics 101", "kind": "course"}});
//! let engine = ExpressionEngine::new(&data);
//! let ctx = LoopContext::new();
//!
//! assert_eq!(
//!     engine.resolve_value("@@site.title@@", &ctx).unwrap(),
//!     Scalar::from("Physics 101")
//! );
//! assert!(engine.evaluate_condition("@@site.kind=='course'?@@", &ctx).unwrap());
//! ```

pub mod eval;
pub mod lexer;
pub mod parser;

use serde_json::Value;
use tracing::debug;

use crate::context::LoopContext;
use crate::error::{Result, TemplateError};
use crate::value::Scalar;

pub use eval::ArrayMode;
pub use parser::{Expression, ExpressionKind, Path, Segment};

/// Opening and closing delimiter of every expression.
pub const DELIMITER: &str = "@@";

/// Returns `true` if `text` is delimited by `@@` on both sides.
pub fn is_placeholder(text: &str) -> bool {
    text.len() >= 2 * DELIMITER.len() && text.starts_with(DELIMITER) && text.ends_with(DELIMITER)
}

/// Returns `true` if `text` is a conditional (`@@...?@@`).
pub fn is_conditional(text: &str) -> bool {
    is_placeholder(text) && text.ends_with("?@@")
}

/// Returns `true` if `text` is a loop (`@@...(...)@@`).
pub fn is_loop(text: &str) -> bool {
    is_placeholder(text) && text.ends_with("(...)@@")
}

/// Evaluates expressions against one data tree.
///
/// The engine is stateless apart from the borrowed data; loop state is passed
/// in with every call.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionEngine<'d> {
    data: &'d Value,
}

impl<'d> ExpressionEngine<'d> {
    /// Creates an engine over `data`.
    pub fn new(data: &'d Value) -> Self {
        Self { data }
    }

    /// Resolves an expression to the raw JSON value it points at.
    pub fn resolve_json(
        &self,
        text: &str,
        ctx: &LoopContext,
        mode: ArrayMode,
    ) -> Result<&'d Value> {
        let expr = Expression::parse(text)?;
        eval::resolve_path(&expr, &expr.path, self.data, ctx, mode)
    }

    /// Resolves a placeholder to a scalar, indexing arrays with the current
    /// loop indexes.
    pub fn resolve_value(&self, text: &str, ctx: &LoopContext) -> Result<Scalar> {
        let value = self.resolve_json(text, ctx, ArrayMode::Indexed)?;
        Scalar::from_json(value).ok_or_else(|| {
            TemplateError::shape(
                text,
                format!("expected a scalar, found {}", eval::describe(value)),
            )
        })
    }

    /// Resolves a placeholder used as a node or property name.
    pub fn resolve_name(&self, text: &str, ctx: &LoopContext) -> Result<String> {
        Ok(match self.resolve_value(text, ctx)? {
            Scalar::String(s) => s,
            other => other.to_string(),
        })
    }

    /// Resolves a loop expression to the array it enumerates.
    pub fn resolve_array(&self, text: &str, ctx: &LoopContext) -> Result<&'d [Value]> {
        let expr = Expression::parse(text)?;
        if expr.kind != ExpressionKind::Loop {
            return Err(TemplateError::syntax(
                text,
                "loop expression must end with an array segment",
            ));
        }
        let value = eval::resolve_path(&expr, &expr.path, self.data, ctx, ArrayMode::ArrayOnly)?;
        value
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| TemplateError::shape(text, "expected an array"))
    }

    /// Evaluates a conditional expression.
    ///
    /// The literal is coerced to the kind of the resolved value; a literal
    /// that does not coerce makes the condition false. Objects, arrays and
    /// `null` never equal a literal.
    pub fn evaluate_condition(&self, text: &str, ctx: &LoopContext) -> Result<bool> {
        let expr = Expression::parse(text)?;
        let literal = match (&expr.kind, &expr.literal) {
            (ExpressionKind::Conditional, Some(literal)) => literal,
            _ => return Err(TemplateError::syntax(text, "not a conditional expression")),
        };
        let value = eval::resolve_path(&expr, &expr.path, self.data, ctx, ArrayMode::Indexed)?;
        let Some(scalar) = Scalar::from_json(value) else {
            return Ok(false);
        };
        if scalar.coerce_literal(literal).is_none() {
            debug!(
                expression = text,
                kind = scalar.kind(),
                literal = literal.as_str(),
                "literal does not coerce, condition is false"
            );
            return Ok(false);
        }
        Ok(scalar.matches_literal(literal))
    }

    /// Resolves `scalar` if it is a string placeholder, otherwise clones it.
    pub fn resolve_scalar(&self, scalar: &Scalar, ctx: &LoopContext) -> Result<Scalar> {
        match scalar.as_str() {
            Some(text) if is_placeholder(text) => self.resolve_value(text, ctx),
            _ => Ok(scalar.clone()),
        }
    }
}
