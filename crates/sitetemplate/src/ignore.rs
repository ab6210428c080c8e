//! Property names excluded from copying.

use std::collections::BTreeSet;

/// Repository bookkeeping and group markers that never reach the output.
pub const DEFAULT_IGNORED: &[&str] = &[
    "sakai:template-group",
    "sakai:template-groups",
    "jcr:createdBy",
    "jcr:created",
    "jcr:lastModifiedBy",
    "jcr:lastModified",
    "jcr:predecessors",
    "jcr:uuid",
    "jcr:versionHistory",
    "jcr:baseVersion",
    "jcr:isCheckedOut",
];

/// Node type marker; dropped from group properties only.
pub const PRIMARY_TYPE: &str = "jcr:primaryType";

/// A set of property names to skip while copying node properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreList {
    names: BTreeSet<String>,
}

impl IgnoreList {
    /// An empty list.
    pub fn empty() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    /// Adds one name.
    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// Adds several names.
    pub fn extend<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Returns `true` if `name` must be skipped.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of names in the list.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for IgnoreList {
    fn default() -> Self {
        IgnoreList::empty().extend(DEFAULT_IGNORED.iter().copied())
    }
}
