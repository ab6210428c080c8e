//! Build entry point.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::context::LoopContext;
use crate::error::{Result, TemplateError};
use crate::expression::ExpressionEngine;
use crate::groups::{extract_groups, GroupMap};
use crate::node::TemplateNode;
use crate::options::BuildOptions;
use crate::output::OutputMap;
use crate::walker::{LoopFailure, Walker};

/// Everything one build produces.
#[derive(Debug, Serialize)]
pub struct BuildOutput {
    /// The resolved site structure.
    pub site: OutputMap,
    /// Groups to create, keyed by principal.
    pub groups: GroupMap,
    /// Loops abandoned under [`crate::LoopFailurePolicy::BestEffort`].
    #[serde(skip)]
    pub warnings: Vec<LoopFailure>,
}

impl BuildOutput {
    /// Returns `true` if every loop ran to completion.
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Expands a template against a data tree.
///
/// The builder keeps no state between calls: every `build*` method starts
/// with an empty loop context, so repeated builds with the same inputs give
/// equal results.
#[derive(Debug, Clone)]
pub struct TemplateBuilder<'a> {
    template: &'a TemplateNode,
    engine: ExpressionEngine<'a>,
    options: BuildOptions,
}

impl<'a> TemplateBuilder<'a> {
    /// Creates a builder with default options.
    pub fn new(template: &'a TemplateNode, data: &'a Value) -> Self {
        Self {
            template,
            engine: ExpressionEngine::new(data),
            options: BuildOptions::default(),
        }
    }

    /// Replaces the build options.
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Collects the groups, then walks the site node.
    pub fn build(&self) -> Result<BuildOutput> {
        let groups = self.build_groups()?;

        let site_node = self
            .template
            .child(&self.options.site_node)
            .ok_or_else(|| TemplateError::MissingNode {
                parent: self.template.name().to_string(),
                name: self.options.site_node.clone(),
            })?;
        let (site, warnings) = self.walk(site_node)?;

        debug!(
            entries = site.len(),
            groups = groups.len(),
            warnings = warnings.len(),
            "build finished"
        );
        Ok(BuildOutput {
            site,
            groups,
            warnings,
        })
    }

    /// Collects every group definition below the template root.
    pub fn build_groups(&self) -> Result<GroupMap> {
        extract_groups(self.template, &self.engine, &self.options.ignore_list())
    }

    /// Walks an arbitrary node; loop warnings are logged and dropped.
    pub fn build_output(&self, node: &TemplateNode) -> Result<OutputMap> {
        self.walk(node).map(|(map, _)| map)
    }

    fn walk(&self, node: &TemplateNode) -> Result<(OutputMap, Vec<LoopFailure>)> {
        let mut walker = Walker::new(self.engine, &self.options);
        let mut ctx = LoopContext::new();
        let map = walker.walk(node, &mut ctx)?;
        Ok((map, walker.into_failures()))
    }
}
