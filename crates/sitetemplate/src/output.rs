//! Build output types.

use indexmap::IndexMap;
use serde::Serialize;

use crate::acl::Ace;
use crate::value::Scalar;

/// Reserved key under which a node's ACEs are collected.
pub const POLICY_KEY: &str = "rep:policy";

/// Resolved site structure: name to value, in template order.
pub type OutputMap = IndexMap<String, OutputValue>;

/// One entry of an [`OutputMap`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputValue {
    /// Single-valued property.
    Scalar(Scalar),
    /// Multi-valued property.
    Array(Vec<Scalar>),
    /// Child node.
    Node(OutputMap),
    /// Access control entries, only under [`POLICY_KEY`].
    Policy(Vec<Ace>),
}

impl OutputValue {
    /// Returns the child map, if this is a node.
    pub fn as_node(&self) -> Option<&OutputMap> {
        match self {
            OutputValue::Node(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the values, if this is a multi-value.
    pub fn as_array(&self) -> Option<&[Scalar]> {
        match self {
            OutputValue::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the ACE list, if this is a policy.
    pub fn as_policy(&self) -> Option<&[Ace]> {
        match self {
            OutputValue::Policy(aces) => Some(aces),
            _ => None,
        }
    }
}

impl From<Scalar> for OutputValue {
    fn from(value: Scalar) -> Self {
        OutputValue::Scalar(value)
    }
}

impl From<OutputMap> for OutputValue {
    fn from(map: OutputMap) -> Self {
        OutputValue::Node(map)
    }
}
