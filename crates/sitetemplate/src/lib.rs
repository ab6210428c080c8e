//! Sitetemplate - expand site templates against JSON data.
//!
//! A site template is a tree of nodes with properties. Property names, property
//! values and node names may contain `@@...@@` expressions that are resolved
//! against a JSON data object supplied at build time. A build produces:
//!
//! - the resolved site structure as an ordered map of maps ([`OutputMap`])
//! - the groups to create, with resolved member lists ([`GroupMap`])
//! - access control entries, stored under [`POLICY_KEY`] on the node they
//!   protect
//!
//! Creating repository content, authorizables or access control policies from
//! that output is left to the caller.
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use sitetemplate::{OutputValue, Scalar, TemplateBuilder, TemplateNode};
//!
//! let template = TemplateNode::new("template").with_child(
//!     TemplateNode::new("site")
//!         .with_property("title", "@@site.title@@")
//!         .with_child(
//!             TemplateNode::new("@@site.pages(...)@@")
//!                 .with_child(
//!                     TemplateNode::new("@@site.pages(...).id@@")
//!                         .with_property("label", "@@site.pages(...).label@@"),
//!                 ),
//!         ),
//! );
//!
//! let data = json!({
//!     "site": {
//!         "title": "Physics 101",
//!         "pages": [
//!             {"id": "intro", "label": "Introduction"},
//!             {"id": "labs", "label": "Lab work"}
//!         ]
//!     }
//! });
//!
//! let output = TemplateBuilder::new(&template, &data).build().unwrap();
//! assert_eq!(
//!     output.site["title"],
//!     OutputValue::Scalar(Scalar::from("Physics 101"))
//! );
//! let labs = output.site["labs"].as_node().unwrap();
//! assert_eq!(labs["label"], OutputValue::Scalar(Scalar::from("Lab work")));
//! ```
//!
//! # Expressions
//!
//! | Form | Example | Where |
//! |------|---------|-------|
//! | Placeholder | `@@site.title@@` | property names/values, node names |
//! | Conditional | `@@site.kind=='course'?@@` | node names |
//! | Loop | `@@site.pages(...)@@` | node names, group members |
//!
//! See [`expression`] for the grammar and [`LoopContext`] for how array
//! segments are indexed inside loops.
//!
//! # Loop failures
//!
//! When one iteration of a loop fails, the default policy
//! ([`LoopFailurePolicy::BestEffort`]) logs the error, skips the remaining
//! iterations of that loop and keeps building; the failure is reported in
//! [`BuildOutput::warnings`]. [`LoopFailurePolicy::FailFast`] aborts the build
//! instead.

pub mod acl;
mod builder;
pub mod context;
mod error;
pub mod expression;
pub mod groups;
mod ignore;
mod node;
mod options;
mod output;
mod value;
mod walker;

// Re-export public API
pub use acl::{Ace, Principal, RT_ACE};
pub use builder::{BuildOutput, TemplateBuilder};
pub use context::{LoopContext, LoopScope};
pub use error::{Result, TemplateError};
pub use expression::{is_conditional, is_loop, is_placeholder, ExpressionEngine};
pub use groups::{GroupDefinition, GroupMap, RT_GROUP};
pub use ignore::{IgnoreList, DEFAULT_IGNORED, PRIMARY_TYPE};
pub use node::{TemplateNode, RESOURCE_TYPE_PROPERTY};
pub use options::{BuildOptions, LoopFailurePolicy, DEFAULT_SITE_NODE};
pub use output::{OutputMap, OutputValue, POLICY_KEY};
pub use value::{PropertyValue, Scalar};
pub use walker::LoopFailure;
