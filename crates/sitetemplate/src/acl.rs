//! Principals and access control entries.
//!
//! An ACE node is a template node whose `sling:resourceType` is
//! [`RT_ACE`]. It names a principal and lists granted and denied privileges:
//!
//! ```text
//! "maintainer-ace": {
//!   "sling:resourceType": "sakai/template-ace",
//!   "sakai:template-ace-principal": "@@site.id@@-maintainers",
//!   "sakai:template-ace-granted": ["jcr:all"],
//!   "sakai:template-ace-denied": []
//! }
//! ```
//!
//! ACEs are not nested in the output; they are appended to the parent node's
//! [`POLICY_KEY`] list.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::context::LoopContext;
use crate::error::{Result, TemplateError};
use crate::expression::{is_placeholder, ExpressionEngine};
use crate::node::TemplateNode;
use crate::output::{OutputMap, OutputValue, POLICY_KEY};
use crate::value::{PropertyValue, Scalar};

/// Resource type of ACE nodes.
pub const RT_ACE: &str = "sakai/template-ace";
/// Principal the entry applies to.
pub const ACE_PRINCIPAL: &str = "sakai:template-ace-principal";
/// Granted privilege names.
pub const ACE_GRANTED: &str = "sakai:template-ace-granted";
/// Denied privilege names.
pub const ACE_DENIED: &str = "sakai:template-ace-denied";

/// A user or group, identified by name only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Creates a principal.
    pub fn new(name: impl Into<String>) -> Self {
        Principal(name.into())
    }

    /// The principal name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(name: &str) -> Self {
        Principal::new(name)
    }
}

/// An access control entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ace {
    pub principal: Principal,
    pub granted: Vec<String>,
    pub denied: Vec<String>,
}

impl Ace {
    /// Reads an ACE node, resolving placeholders in the principal and in each
    /// privilege entry.
    pub fn from_node(
        node: &TemplateNode,
        engine: &ExpressionEngine<'_>,
        ctx: &LoopContext,
    ) -> Result<Ace> {
        let principal = node
            .property(ACE_PRINCIPAL)
            .and_then(PropertyValue::first)
            .ok_or_else(|| TemplateError::missing_property(node.name(), ACE_PRINCIPAL))?;
        let principal = match engine.resolve_scalar(principal, ctx)? {
            Scalar::String(name) => Principal::new(name),
            other => Principal::new(other.to_string()),
        };

        let ace = Ace {
            principal,
            granted: privileges(node, ACE_GRANTED, engine, ctx)?,
            denied: privileges(node, ACE_DENIED, engine, ctx)?,
        };
        debug!(
            node = node.name(),
            principal = %ace.principal,
            granted = ace.granted.len(),
            denied = ace.denied.len(),
            "extracted ACE"
        );
        Ok(ace)
    }
}

fn privileges(
    node: &TemplateNode,
    property: &str,
    engine: &ExpressionEngine<'_>,
    ctx: &LoopContext,
) -> Result<Vec<String>> {
    let Some(value) = node.property(property) else {
        return Ok(Vec::new());
    };
    value
        .values()
        .into_iter()
        .map(|scalar| match scalar.as_str() {
            Some(text) if is_placeholder(text) => engine.resolve_name(text, ctx),
            _ => Ok(scalar.to_string()),
        })
        .collect()
}

/// Appends `ace` to the policy list of `map`, creating the list on first use.
pub fn push_ace(map: &mut OutputMap, ace: Ace) {
    if let Some(OutputValue::Policy(aces)) = map.get_mut(POLICY_KEY) {
        aces.push(ace);
        return;
    }
    if map.contains_key(POLICY_KEY) {
        warn!(key = POLICY_KEY, "replacing non-policy value with ACE list");
    }
    map.insert(POLICY_KEY.to_string(), OutputValue::Policy(vec![ace]));
}
