//! Path evaluation against the data tree.

use serde_json::Value;

use crate::context::LoopContext;
use crate::error::{Result, TemplateError};

use super::parser::{Expression, Path};

/// How the final array segment of a path is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayMode {
    /// Index every array segment with the current loop index.
    Indexed,
    /// Return the final array segment whole (loop enumeration).
    ArrayOnly,
}

/// Walks `path` through `data`.
///
/// Every array segment consumes the next loop level, outermost first, except
/// a final array segment in [`ArrayMode::ArrayOnly`], which yields the array
/// itself.
pub fn resolve_path<'d>(
    expr: &Expression,
    path: &Path,
    data: &'d Value,
    ctx: &LoopContext,
    mode: ArrayMode,
) -> Result<&'d Value> {
    let mut current = data;
    let mut level = 0;
    let last = path.segments.len().saturating_sub(1);

    for (position, segment) in path.segments.iter().enumerate() {
        let object = current.as_object().ok_or_else(|| {
            TemplateError::shape(
                &expr.source,
                format!(
                    "cannot look up '{}' in {}",
                    segment.key,
                    describe(current)
                ),
            )
        })?;
        let value = object.get(&segment.key).ok_or_else(|| {
            TemplateError::shape(&expr.source, format!("missing key '{}'", segment.key))
        })?;

        if !segment.is_array {
            current = value;
            continue;
        }

        let items = value.as_array().ok_or_else(|| {
            TemplateError::shape(
                &expr.source,
                format!("expected '{}' to be an array, found {}", segment.key, describe(value)),
            )
        })?;

        if position == last && mode == ArrayMode::ArrayOnly {
            return Ok(value);
        }

        let index = ctx.index_at(level).ok_or_else(|| {
            TemplateError::syntax(
                &expr.source,
                format!("array segment '{}' is not inside a matching loop", segment.key),
            )
        })?;
        level += 1;

        current = items.get(index).ok_or_else(|| {
            TemplateError::shape(
                &expr.source,
                format!(
                    "index {} out of range for '{}' (length {})",
                    index,
                    segment.key,
                    items.len()
                ),
            )
        })?;
    }

    Ok(current)
}

/// Short description of a JSON value's kind for error messages.
pub fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve<'d>(
        source: &str,
        data: &'d Value,
        ctx: &LoopContext,
        mode: ArrayMode,
    ) -> Result<&'d Value> {
        let expr = Expression::parse(source).unwrap();
        resolve_path(&expr, &expr.path, data, ctx, mode)
    }

    #[test]
    fn resolves_nested_keys() {
        let data = json!({"a": {"b": "x"}});
        let value = resolve("@@a.b@@", &data, &LoopContext::new(), ArrayMode::Indexed).unwrap();
        assert_eq!(value, &json!("x"));
    }

    #[test]
    fn array_only_returns_final_array() {
        let data = json!({"items": ["p", "q"]});
        let value =
            resolve("@@items(...)@@", &data, &LoopContext::new(), ArrayMode::ArrayOnly).unwrap();
        assert_eq!(value, &json!(["p", "q"]));
    }

    #[test]
    fn indexed_mode_uses_loop_levels_left_to_right() {
        let data = json!({
            "sites": [
                {"pages": [{"t": "s0p0"}, {"t": "s0p1"}]},
                {"pages": [{"t": "s1p0"}, {"t": "s1p1"}]}
            ]
        });
        let mut ctx = LoopContext::new();
        let mut outer = ctx.enter_loop();
        outer.set_index(1);
        let mut inner = outer.enter_loop();
        inner.set_index(0);

        let value =
            resolve("@@sites(...).pages(...).t@@", &data, &inner, ArrayMode::Indexed).unwrap();
        assert_eq!(value, &json!("s1p0"));

        let pages =
            resolve("@@sites(...).pages(...)@@", &data, &inner, ArrayMode::ArrayOnly).unwrap();
        assert_eq!(pages, &json!([{"t": "s1p0"}, {"t": "s1p1"}]));
    }

    #[test]
    fn array_outside_loop_is_a_syntax_error() {
        let data = json!({"items": ["p"]});
        let err =
            resolve("@@items(...)@@", &data, &LoopContext::new(), ArrayMode::Indexed).unwrap_err();
        assert!(matches!(err, TemplateError::ExpressionSyntax { .. }));
    }

    #[test]
    fn shape_errors() {
        let ctx = LoopContext::new();
        let data = json!({"a": "scalar", "obj": {"k": 1}});

        let err = resolve("@@missing@@", &data, &ctx, ArrayMode::Indexed).unwrap_err();
        assert!(matches!(err, TemplateError::DataShape { .. }));

        let err = resolve("@@a.b@@", &data, &ctx, ArrayMode::Indexed).unwrap_err();
        assert!(matches!(err, TemplateError::DataShape { .. }));

        let err = resolve("@@obj(...)@@", &data, &ctx, ArrayMode::ArrayOnly).unwrap_err();
        assert!(matches!(err, TemplateError::DataShape { .. }));
    }

    #[test]
    fn index_out_of_range_is_a_shape_error() {
        let data = json!({"items": ["p"]});
        let mut ctx = LoopContext::new();
        let mut scope = ctx.enter_loop();
        scope.set_index(4);
        let err = resolve("@@items(...)@@", &data, &scope, ArrayMode::Indexed).unwrap_err();
        assert!(matches!(err, TemplateError::DataShape { .. }));
    }
}
