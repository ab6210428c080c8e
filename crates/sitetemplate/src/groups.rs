//! Group definitions.
//!
//! Group nodes can sit anywhere below the template root and are collected in
//! a pass of their own, before the site walk. A group node looks like:
//!
//! ```text
//! "maintainers": {
//!   "sling:resourceType": "sakai/template-group",
//!   "sakai:template-group-principalname": "@@site.id@@-maintainers",
//!   "sakai:template-group-members": ["@@site.maintainers(...)@@", "admin"],
//!   "sakai:template-group-ismaintainer": true
//! }
//! ```
//!
//! A member entry written as a loop expression expands in place to every
//! element of the array.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::acl::Principal;
use crate::context::LoopContext;
use crate::error::{Result, TemplateError};
use crate::expression::{is_loop, is_placeholder, ExpressionEngine};
use crate::ignore::{IgnoreList, PRIMARY_TYPE};
use crate::node::TemplateNode;
use crate::output::{OutputMap, OutputValue};
use crate::value::{PropertyValue, Scalar};
use crate::walker::copy_properties;

/// Resource type of group nodes.
pub const RT_GROUP: &str = "sakai/template-group";
/// Name of the group to create.
pub const GROUP_PRINCIPAL_NAME: &str = "sakai:template-group-principalname";
/// Members of the group.
pub const GROUP_MEMBERS: &str = "sakai:template-group-members";

/// A group to create, with its members and remaining properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupDefinition {
    #[serde(rename = "sakai:template-group-members")]
    pub members: Vec<String>,
    #[serde(flatten)]
    pub properties: OutputMap,
}

/// Groups keyed by principal, in template order.
pub type GroupMap = IndexMap<Principal, GroupDefinition>;

/// Collects every group node below `template`.
///
/// Later definitions of the same principal replace earlier ones.
pub fn extract_groups(
    template: &TemplateNode,
    engine: &ExpressionEngine<'_>,
    ignore: &IgnoreList,
) -> Result<GroupMap> {
    let ignore = ignore
        .clone()
        .with(GROUP_PRINCIPAL_NAME)
        .with(GROUP_MEMBERS)
        .with(PRIMARY_TYPE);
    let ctx = LoopContext::new();
    let mut groups = GroupMap::new();

    for node in template.descendants() {
        if node.resource_type() != Some(RT_GROUP) {
            continue;
        }
        let (principal, definition) = read_group(node, engine, &ignore, &ctx)?;
        debug!(
            principal = %principal,
            members = definition.members.len(),
            "extracted group"
        );
        groups.insert(principal, definition);
    }
    Ok(groups)
}

fn read_group(
    node: &TemplateNode,
    engine: &ExpressionEngine<'_>,
    ignore: &IgnoreList,
    ctx: &LoopContext,
) -> Result<(Principal, GroupDefinition)> {
    let name = node
        .property(GROUP_PRINCIPAL_NAME)
        .and_then(PropertyValue::first)
        .ok_or_else(|| TemplateError::missing_property(node.name(), GROUP_PRINCIPAL_NAME))?;
    let name = engine.resolve_scalar(name, ctx)?;
    let principal = Principal::new(name.to_string());

    let declared = node
        .property(GROUP_MEMBERS)
        .ok_or_else(|| TemplateError::missing_property(node.name(), GROUP_MEMBERS))?;
    let mut members = Vec::new();
    for entry in declared.values() {
        match entry.as_str() {
            Some(text) if is_loop(text) => {
                members.extend(engine.resolve_array(text, ctx)?.iter().map(member_name));
            }
            Some(text) if is_placeholder(text) => members.push(engine.resolve_name(text, ctx)?),
            _ => members.push(entry.to_string()),
        }
    }

    let mut properties = OutputMap::new();
    properties.insert(GROUP_PRINCIPAL_NAME.to_string(), OutputValue::Scalar(name));
    copy_properties(node, &mut properties, ignore, engine, ctx)?;

    Ok((principal, GroupDefinition { members, properties }))
}

/// Member name for one element of a loop-expanded member array.
///
/// `null` becomes the text `"null"`; objects and arrays become their JSON text.
fn member_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => match Scalar::from_json(other) {
            Some(scalar) => scalar.to_string(),
            None => other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group(principal: &str, members: Vec<&str>) -> TemplateNode {
        TemplateNode::new("g")
            .with_resource_type(RT_GROUP)
            .with_property("jcr:primaryType", "nt:unstructured")
            .with_property(GROUP_PRINCIPAL_NAME, principal)
            .with_property(GROUP_MEMBERS, members)
    }

    fn extract(template: &TemplateNode, data: &Value) -> Result<GroupMap> {
        extract_groups(template, &ExpressionEngine::new(data), &IgnoreList::default())
    }

    #[test]
    fn loop_members_expand_in_place() {
        let template = TemplateNode::new("t").with_child(group(
            "@@site.id@@-members",
            vec!["first", "@@groupLoop(...)@@", "staticUser"],
        ));
        let data = json!({"site": {"id": "s1"}, "groupLoop": ["u1", "u2"]});

        let groups = extract(&template, &data).unwrap();
        let definition = groups.get(&Principal::from("s1-members")).unwrap();
        assert_eq!(definition.members, vec!["first", "u1", "u2", "staticUser"]);
    }

    #[test]
    fn structural_markers_are_not_copied() {
        let template = TemplateNode::new("t").with_child(
            group("g1", vec!["a"])
                .with_property("sakai:template-group-ismaintainer", true)
                .with_property("jcr:created", "yesterday"),
        );
        let groups = extract(&template, &json!({})).unwrap();
        let properties = &groups[&Principal::from("g1")].properties;

        assert_eq!(
            properties.get(GROUP_PRINCIPAL_NAME),
            Some(&OutputValue::Scalar(Scalar::from("g1")))
        );
        assert_eq!(
            properties.get("sakai:template-group-ismaintainer"),
            Some(&OutputValue::Scalar(Scalar::Boolean(true)))
        );
        assert!(!properties.contains_key(GROUP_MEMBERS));
        assert!(!properties.contains_key(PRIMARY_TYPE));
        assert!(!properties.contains_key("jcr:created"));
    }

    #[test]
    fn finds_nested_groups_and_last_write_wins() {
        let template = TemplateNode::new("t")
            .with_child(TemplateNode::new("groups").with_child(group("dup", vec!["old"])))
            .with_child(TemplateNode::new("more").with_child(group("dup", vec!["new"])));

        let groups = extract(&template, &json!({})).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&Principal::from("dup")].members, vec!["new"]);
    }

    #[test]
    fn missing_members_is_an_error() {
        let template = TemplateNode::new("t").with_child(
            TemplateNode::new("g")
                .with_resource_type(RT_GROUP)
                .with_property(GROUP_PRINCIPAL_NAME, "g"),
        );
        let err = extract(&template, &json!({})).unwrap_err();
        assert!(matches!(err, TemplateError::MissingProperty { .. }));
    }

    #[test]
    fn missing_principal_is_an_error() {
        let template = TemplateNode::new("t").with_child(
            TemplateNode::new("g")
                .with_resource_type(RT_GROUP)
                .with_property(GROUP_MEMBERS, vec!["a"]),
        );
        let err = extract(&template, &json!({})).unwrap_err();
        match err {
            TemplateError::MissingProperty { node, property } => {
                assert_eq!(node, "g");
                assert_eq!(property, GROUP_PRINCIPAL_NAME);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn principal_name_is_stored_resolved_and_first() {
        let template = TemplateNode::new("t").with_child(
            TemplateNode::new("g")
                .with_property("sakai:template-group-ismaintainer", false)
                .with_resource_type(RT_GROUP)
                .with_property(GROUP_PRINCIPAL_NAME, "@@site.id@@-g")
                .with_property(GROUP_MEMBERS, vec!["a"]),
        );
        let groups = extract(&template, &json!({"site": {"id": "s1"}})).unwrap();
        let properties = &groups[&Principal::from("s1-g")].properties;

        let keys: Vec<&str> = properties.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                GROUP_PRINCIPAL_NAME,
                "sakai:template-group-ismaintainer",
                "sling:resourceType"
            ]
        );
        assert_eq!(
            properties[GROUP_PRINCIPAL_NAME],
            OutputValue::Scalar(Scalar::from("s1-g"))
        );
    }

    #[test]
    fn member_names_from_non_string_elements() {
        assert_eq!(member_name(&json!("u")), "u");
        assert_eq!(member_name(&json!(7)), "7");
        assert_eq!(member_name(&json!(null)), "null");
        assert_eq!(member_name(&json!({"id": 1})), "{\"id\":1}");
    }
}
