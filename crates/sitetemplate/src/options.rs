//! Build configuration.
//!
//! [`BuildOptions`] is built fluently in code or deserialized from YAML/JSON.
//! Every field has a default, so a document only lists what it changes:
//!
//! ```yaml
//! loop-failure: fail-fast
//! site-node: site
//! ignore:
//!   - sakai:internal-note
//! ```

use serde::Deserialize;

use crate::error::Result;
use crate::ignore::IgnoreList;

/// Name of the template child walked by [`crate::TemplateBuilder::build`].
pub const DEFAULT_SITE_NODE: &str = "site";

/// What happens when one iteration of a loop fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopFailurePolicy {
    /// Log the failure, skip the remaining iterations of that loop, and keep
    /// building.
    #[default]
    BestEffort,
    /// Abort the whole build.
    FailFast,
}

/// Options for one build.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct BuildOptions {
    /// Loop iteration failure handling.
    pub loop_failure: LoopFailurePolicy,
    /// Child of the template root holding the site structure.
    pub site_node: String,
    /// Property names to skip on top of the default ignore list.
    pub ignore: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            loop_failure: LoopFailurePolicy::default(),
            site_node: DEFAULT_SITE_NODE.to_string(),
            ignore: Vec::new(),
        }
    }
}

impl BuildOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the loop failure policy.
    pub fn loop_failure(mut self, policy: LoopFailurePolicy) -> Self {
        self.loop_failure = policy;
        self
    }

    /// Shorthand for [`LoopFailurePolicy::FailFast`].
    pub fn fail_fast(self) -> Self {
        self.loop_failure(LoopFailurePolicy::FailFast)
    }

    /// Sets the site node name.
    pub fn site_node(mut self, name: impl Into<String>) -> Self {
        self.site_node = name.into();
        self
    }

    /// Adds a property name to skip.
    pub fn ignore(mut self, name: impl Into<String>) -> Self {
        self.ignore.push(name.into());
        self
    }

    /// Parses options from YAML (JSON is accepted too).
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// The ignore list for ordinary node properties.
    pub fn ignore_list(&self) -> IgnoreList {
        IgnoreList::default().extend(self.ignore.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = BuildOptions::default();
        assert_eq!(options.loop_failure, LoopFailurePolicy::BestEffort);
        assert_eq!(options.site_node, "site");
        assert!(options.ignore.is_empty());
    }

    #[test]
    fn builder_methods() {
        let options = BuildOptions::new()
            .fail_fast()
            .site_node("structure")
            .ignore("secret");
        assert_eq!(options.loop_failure, LoopFailurePolicy::FailFast);
        assert_eq!(options.site_node, "structure");
        assert!(options.ignore_list().contains("secret"));
        assert!(options.ignore_list().contains("jcr:uuid"));
    }

    #[test]
    fn from_yaml() {
        let options = BuildOptions::from_yaml_str(
            "loop-failure: fail-fast\nsite-node: pages\nignore: [a, b]\n",
        )
        .unwrap();
        assert_eq!(options.loop_failure, LoopFailurePolicy::FailFast);
        assert_eq!(options.site_node, "pages");
        assert_eq!(options.ignore, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn from_yaml_partial_uses_defaults() {
        let options = BuildOptions::from_yaml_str("ignore: [x]\n").unwrap();
        assert_eq!(options.loop_failure, LoopFailurePolicy::BestEffort);
        assert_eq!(options.site_node, "site");
    }

    #[test]
    fn from_yaml_rejects_unknown_keys() {
        assert!(BuildOptions::from_yaml_str("loop_failure: fail-fast\n").is_err());
    }
}
