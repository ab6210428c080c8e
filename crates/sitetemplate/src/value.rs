//! Scalar and property value types.
//!
//! The [`Scalar`] enum is the single value representation shared by template
//! properties, values resolved from the data tree, and the build output. It
//! carries one variant per kind so that conditional comparisons can coerce a
//! literal to the kind of the value it is compared against.

use std::fmt;

use serde::Serialize;

/// A single typed value.
///
/// Integer and Long are kept apart because data values are classified by
/// magnitude: integers that fit in 32 bits are `Integer`, larger ones `Long`.
/// A conditional literal is then parsed with the same width, so `"1.0"`
/// never equals an `Integer(1)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// String value.
    String(String),
    /// Boolean value.
    Boolean(bool),
    /// 32-bit integer.
    Integer(i32),
    /// 64-bit integer.
    Long(i64),
    /// 64-bit floating point.
    Double(f64),
}

impl Scalar {
    /// Returns a short name for the value kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::String(_) => "string",
            Scalar::Boolean(_) => "boolean",
            Scalar::Integer(_) => "integer",
            Scalar::Long(_) => "long",
            Scalar::Double(_) => "double",
        }
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts a JSON value into a scalar.
    ///
    /// Returns `None` for `null`, arrays and objects.
    pub fn from_json(value: &serde_json::Value) -> Option<Scalar> {
        match value {
            serde_json::Value::String(s) => Some(Scalar::String(s.clone())),
            serde_json::Value::Bool(b) => Some(Scalar::Boolean(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(match i32::try_from(i) {
                        Ok(small) => Scalar::Integer(small),
                        Err(_) => Scalar::Long(i),
                    })
                } else if let Some(u) = n.as_u64() {
                    // Beyond i64::MAX; only representable as a double.
                    Some(Scalar::Double(u as f64))
                } else {
                    n.as_f64().map(Scalar::Double)
                }
            }
            _ => None,
        }
    }

    /// Parses `literal` into a scalar of the same kind as `self`.
    ///
    /// Returns `None` when a numeric literal does not parse. Booleans follow
    /// the lenient rule: `true` in any letter case is true, anything else is
    /// false.
    pub fn coerce_literal(&self, literal: &str) -> Option<Scalar> {
        match self {
            Scalar::String(_) => Some(Scalar::String(literal.to_string())),
            Scalar::Boolean(_) => Some(Scalar::Boolean(literal.eq_ignore_ascii_case("true"))),
            Scalar::Integer(_) => literal.parse().ok().map(Scalar::Integer),
            Scalar::Long(_) => literal.parse().ok().map(Scalar::Long),
            Scalar::Double(_) => literal.parse().ok().map(Scalar::Double),
        }
    }

    /// Compares this value with a conditional literal.
    ///
    /// The literal is coerced to this value's kind first; a literal that does
    /// not coerce is simply not equal.
    pub fn matches_literal(&self, literal: &str) -> bool {
        self.coerce_literal(literal)
            .is_some_and(|coerced| coerced == *self)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => f.write_str(s),
            Scalar::Boolean(b) => write!(f, "{}", b),
            Scalar::Integer(n) => write!(f, "{}", n),
            Scalar::Long(n) => write!(f, "{}", n),
            Scalar::Double(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Boolean(b)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Integer(n)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Long(n)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Double(n)
    }
}

/// The value of a template property: one scalar or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Single-valued property.
    Single(Scalar),
    /// Multi-valued property.
    Multiple(Vec<Scalar>),
}

impl PropertyValue {
    /// Returns the values as a slice-like list, wrapping single values.
    pub fn values(&self) -> Vec<&Scalar> {
        match self {
            PropertyValue::Single(s) => vec![s],
            PropertyValue::Multiple(values) => values.iter().collect(),
        }
    }

    /// Returns the single value, or the first element of a multi-value.
    pub fn first(&self) -> Option<&Scalar> {
        match self {
            PropertyValue::Single(s) => Some(s),
            PropertyValue::Multiple(values) => values.first(),
        }
    }

    /// Returns `true` if this is a multi-valued property.
    pub fn is_multiple(&self) -> bool {
        matches!(self, PropertyValue::Multiple(_))
    }
}

impl From<Scalar> for PropertyValue {
    fn from(value: Scalar) -> Self {
        PropertyValue::Single(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Single(value.into())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Single(value.into())
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Single(value.into())
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Single(value.into())
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Single(value.into())
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Single(value.into())
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for PropertyValue {
    fn from(values: Vec<T>) -> Self {
        PropertyValue::Multiple(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_classifies_numbers_by_width() {
        assert_eq!(Scalar::from_json(&json!(7)), Some(Scalar::Integer(7)));
        assert_eq!(
            Scalar::from_json(&json!(5_000_000_000i64)),
            Some(Scalar::Long(5_000_000_000))
        );
        assert_eq!(Scalar::from_json(&json!(1.5)), Some(Scalar::Double(1.5)));
        assert_eq!(Scalar::from_json(&json!(true)), Some(Scalar::Boolean(true)));
        assert_eq!(Scalar::from_json(&json!("x")), Some(Scalar::from("x")));
    }

    #[test]
    fn from_json_rejects_non_scalars() {
        assert_eq!(Scalar::from_json(&json!(null)), None);
        assert_eq!(Scalar::from_json(&json!([1])), None);
        assert_eq!(Scalar::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn kind_names() {
        assert_eq!(Scalar::from("x").kind(), "string");
        assert_eq!(Scalar::Integer(1).kind(), "integer");
        assert_eq!(Scalar::Long(1).kind(), "long");
    }

    #[test]
    fn coerce_literal_follows_kind() {
        assert_eq!(
            Scalar::Integer(0).coerce_literal("42"),
            Some(Scalar::Integer(42))
        );
        assert_eq!(Scalar::Long(0).coerce_literal("42"), Some(Scalar::Long(42)));
        assert_eq!(
            Scalar::Double(0.0).coerce_literal("2.5"),
            Some(Scalar::Double(2.5))
        );
        assert_eq!(
            Scalar::Boolean(false).coerce_literal("TRUE"),
            Some(Scalar::Boolean(true))
        );
        assert_eq!(
            Scalar::Boolean(true).coerce_literal("yes"),
            Some(Scalar::Boolean(false))
        );
    }

    #[test]
    fn coerce_literal_numeric_failure_is_none() {
        assert_eq!(Scalar::Integer(1).coerce_literal("one"), None);
        assert_eq!(Scalar::Integer(1).coerce_literal("1.0"), None);
        assert_eq!(Scalar::Double(1.0).coerce_literal("abc"), None);
    }

    #[test]
    fn matches_literal() {
        assert!(Scalar::from("x").matches_literal("x"));
        assert!(!Scalar::from("x").matches_literal("y"));
        assert!(Scalar::Integer(3).matches_literal("3"));
        assert!(!Scalar::Integer(3).matches_literal("three"));
        assert!(Scalar::Double(0.5).matches_literal("0.5"));
        assert!(Scalar::Boolean(false).matches_literal("false"));
    }

    #[test]
    fn display_uses_plain_form() {
        assert_eq!(Scalar::from("abc").to_string(), "abc");
        assert_eq!(Scalar::Integer(12).to_string(), "12");
        assert_eq!(Scalar::Boolean(true).to_string(), "true");
    }

    #[test]
    fn property_value_conversions() {
        assert_eq!(
            PropertyValue::from("a"),
            PropertyValue::Single(Scalar::from("a"))
        );
        assert_eq!(
            PropertyValue::from(vec!["a", "b"]),
            PropertyValue::Multiple(vec![Scalar::from("a"), Scalar::from("b")])
        );
        assert!(PropertyValue::from(vec![1i64]).is_multiple());
        assert_eq!(PropertyValue::from(5i64).first(), Some(&Scalar::Long(5)));
    }
}
