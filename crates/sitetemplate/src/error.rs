//! Error types for the sitetemplate crate.

use thiserror::Error;

/// Errors that can occur while parsing expressions or building a site.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The expression is malformed or cannot be evaluated as written.
    #[error("invalid expression '{expression}': {reason}")]
    ExpressionSyntax { expression: String, reason: String },

    /// The data tree does not have the shape the expression expects.
    #[error("data does not match expression '{expression}': {reason}")]
    DataShape { expression: String, reason: String },

    /// One iteration of a loop failed and the build runs in fail-fast mode.
    #[error("loop '{expression}' failed at iteration {iteration}: {source}")]
    LoopIteration {
        expression: String,
        iteration: usize,
        #[source]
        source: Box<TemplateError>,
    },

    /// A group or ACE node is missing a property it cannot do without.
    #[error("node '{node}' is missing required property '{property}'")]
    MissingProperty { node: String, property: String },

    /// The node the build should start from does not exist.
    #[error("template '{parent}' has no child node '{name}'")]
    MissingNode { parent: String, name: String },

    /// A template document cannot be turned into template nodes.
    #[error("invalid template: {0}")]
    InvalidTemplate(String),

    /// Template or option document could not be parsed as JSON.
    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Template or option document could not be parsed as YAML.
    #[error("YAML parse failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TemplateError {
    /// Create an expression syntax error.
    pub fn syntax(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExpressionSyntax {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Create a data shape error.
    pub fn shape(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataShape {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing property error.
    pub fn missing_property(node: impl Into<String>, property: impl Into<String>) -> Self {
        Self::MissingProperty {
            node: node.into(),
            property: property.into(),
        }
    }
}

/// Result type for sitetemplate operations.
pub type Result<T> = std::result::Result<T, TemplateError>;
