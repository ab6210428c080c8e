//! Template tree nodes.
//!
//! A [`TemplateNode`] is a named node with ordered properties and ordered
//! children. Nodes are built in code with the `with_*` methods or loaded from
//! a Sling-style JSON/YAML dump, where nested objects are child nodes and
//! everything else is a property:
//!
//! ```text
//! {
//!   "jcr:primaryType": "sling:Folder",
//!   "site": {
//!     "title": "@@site.title@@",
//!     "@@site.private==true?@@": { "visibility": "members" }
//!   }
//! }
//! ```

use indexmap::IndexMap;

use crate::error::{Result, TemplateError};
use crate::value::{PropertyValue, Scalar};

/// Property holding a node's resource type marker.
pub const RESOURCE_TYPE_PROPERTY: &str = "sling:resourceType";

/// A node of the template tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateNode {
    name: String,
    properties: IndexMap<String, PropertyValue>,
    children: Vec<TemplateNode>,
}

impl TemplateNode {
    /// Creates a node with no properties and no children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a property, replacing any earlier value of the same name.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Appends a child node.
    pub fn with_child(mut self, child: TemplateNode) -> Self {
        self.children.push(child);
        self
    }

    /// Sets the resource type marker.
    pub fn with_resource_type(self, resource_type: &str) -> Self {
        self.with_property(RESOURCE_TYPE_PROPERTY, resource_type)
    }

    /// The node name, possibly an expression.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &IndexMap<String, PropertyValue> {
        &self.properties
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Children in declaration order.
    pub fn children(&self) -> &[TemplateNode] {
        &self.children
    }

    /// Looks up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&TemplateNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// The resource type marker, if the node has a string one.
    pub fn resource_type(&self) -> Option<&str> {
        self.property(RESOURCE_TYPE_PROPERTY)
            .and_then(PropertyValue::first)
            .and_then(Scalar::as_str)
    }

    /// Visits every descendant (not the node itself) in document order.
    pub fn descendants(&self) -> Vec<&TemplateNode> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Builds a node tree from a Sling-style JSON object.
    pub fn from_json(name: impl Into<String>, value: &serde_json::Value) -> Result<Self> {
        let name = name.into();
        let object = value.as_object().ok_or_else(|| {
            TemplateError::InvalidTemplate(format!("node '{}' must be a JSON object", name))
        })?;

        let mut node = TemplateNode::new(name);
        for (key, child) in object {
            match child {
                serde_json::Value::Object(_) => {
                    node.children.push(TemplateNode::from_json(key.clone(), child)?);
                }
                serde_json::Value::Array(items) => {
                    let values = items
                        .iter()
                        .map(|item| property_scalar(&node.name, key, item))
                        .collect::<Result<Vec<_>>>()?;
                    node.properties
                        .insert(key.clone(), PropertyValue::Multiple(values));
                }
                other => {
                    let value = property_scalar(&node.name, key, other)?;
                    node.properties
                        .insert(key.clone(), PropertyValue::Single(value));
                }
            }
        }
        Ok(node)
    }

    /// Parses a JSON document and builds a node tree from it.
    pub fn from_json_str(name: impl Into<String>, source: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(source)?;
        TemplateNode::from_json(name, &value)
    }

    /// Parses a YAML document and builds a node tree from it.
    pub fn from_yaml_str(name: impl Into<String>, source: &str) -> Result<Self> {
        let value: serde_json::Value = serde_yaml::from_str(source)?;
        TemplateNode::from_json(name, &value)
    }
}

fn collect_descendants<'a>(node: &'a TemplateNode, out: &mut Vec<&'a TemplateNode>) {
    for child in &node.children {
        out.push(child);
        collect_descendants(child, out);
    }
}

/// Template integers are always stored as Long, matching repository property
/// types; only data values distinguish Integer from Long.
fn property_scalar(node: &str, key: &str, value: &serde_json::Value) -> Result<Scalar> {
    match value {
        serde_json::Value::String(s) => Ok(Scalar::String(s.clone())),
        serde_json::Value::Bool(b) => Ok(Scalar::Boolean(*b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Scalar::Long(i)),
            None => n.as_f64().map(Scalar::Double).ok_or_else(|| {
                TemplateError::InvalidTemplate(format!(
                    "property '{}' on '{}' is not a representable number",
                    key, node
                ))
            }),
        },
        serde_json::Value::Null => Err(TemplateError::InvalidTemplate(format!(
            "property '{}' on '{}' is null",
            key, node
        ))),
        _ => Err(TemplateError::InvalidTemplate(format!(
            "property '{}' on '{}' must hold scalars only",
            key, node
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_keeps_declaration_order() {
        let node = TemplateNode::new("root")
            .with_property("b", "1")
            .with_property("a", "2")
            .with_child(TemplateNode::new("second"))
            .with_child(TemplateNode::new("first"));

        let keys: Vec<&str> = node.properties().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
        let names: Vec<&str> = node.children().iter().map(TemplateNode::name).collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[test]
    fn resource_type_reads_marker() {
        let node = TemplateNode::new("ace").with_resource_type("sakai/template-ace");
        assert_eq!(node.resource_type(), Some("sakai/template-ace"));
        assert_eq!(TemplateNode::new("plain").resource_type(), None);
    }

    #[test]
    fn from_json_splits_children_and_properties() {
        let value = json!({
            "jcr:primaryType": "sling:Folder",
            "count": 3,
            "ratio": 0.5,
            "open": true,
            "tags": ["a", "b"],
            "site": { "title": "@@site.title@@" }
        });

        let node = TemplateNode::from_json("template", &value).unwrap();
        assert_eq!(node.name(), "template");
        assert_eq!(node.property("count"), Some(&PropertyValue::from(3i64)));
        assert_eq!(node.property("ratio"), Some(&PropertyValue::from(0.5)));
        assert_eq!(node.property("open"), Some(&PropertyValue::from(true)));
        assert_eq!(node.property("tags"), Some(&PropertyValue::from(vec!["a", "b"])));

        let site = node.child("site").unwrap();
        assert_eq!(
            site.property("title"),
            Some(&PropertyValue::from("@@site.title@@"))
        );
    }

    #[test]
    fn from_json_rejects_null_and_nested_arrays() {
        let err = TemplateNode::from_json("t", &json!({"x": null})).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidTemplate(_)));

        let err = TemplateNode::from_json("t", &json!({"x": [[1]]})).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidTemplate(_)));

        let err = TemplateNode::from_json("t", &json!([1, 2])).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidTemplate(_)));
    }

    #[test]
    fn from_yaml_str_preserves_child_order() {
        let source = "zeta:\n  a: 1\nalpha:\n  b: 2\n";
        let node = TemplateNode::from_yaml_str("t", source).unwrap();
        let names: Vec<&str> = node.children().iter().map(TemplateNode::name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn descendants_are_in_document_order() {
        let node = TemplateNode::new("root")
            .with_child(TemplateNode::new("a").with_child(TemplateNode::new("a1")))
            .with_child(TemplateNode::new("b"));
        let names: Vec<&str> = node.descendants().iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["a", "a1", "b"]);
    }
}
