//! Recursive template walk.
//!
//! Each child of a node is dispatched in priority order:
//!
//! 1. conditional (`@@path==literal?@@`): when true, its properties and
//!    children land in the parent's map, adding no nesting level
//! 2. loop (`@@path(...)@@`): its children are dispatched into the parent's
//!    map once per array element, with the loop index pushed on the
//!    [`LoopContext`]
//! 3. ACE node: appended to the parent's policy list
//! 4. anything else: a nested map under the (resolved) child name

use std::fmt;

use tracing::{debug, warn};

use crate::acl::{push_ace, Ace, RT_ACE};
use crate::context::LoopContext;
use crate::error::{Result, TemplateError};
use crate::expression::{is_conditional, is_loop, is_placeholder, ExpressionEngine};
use crate::ignore::IgnoreList;
use crate::node::TemplateNode;
use crate::options::{BuildOptions, LoopFailurePolicy};
use crate::output::{OutputMap, OutputValue};
use crate::value::PropertyValue;

/// A loop abandoned after one of its iterations failed.
#[derive(Debug)]
pub struct LoopFailure {
    /// The loop node name.
    pub expression: String,
    /// Iteration that failed; later iterations were skipped.
    pub iteration: usize,
    pub error: TemplateError,
}

impl fmt::Display for LoopFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loop '{}' stopped at iteration {}: {}",
            self.expression, self.iteration, self.error
        )
    }
}

/// Per-build walk state.
pub(crate) struct Walker<'d> {
    engine: ExpressionEngine<'d>,
    ignore: IgnoreList,
    policy: LoopFailurePolicy,
    failures: Vec<LoopFailure>,
}

impl<'d> Walker<'d> {
    pub(crate) fn new(engine: ExpressionEngine<'d>, options: &BuildOptions) -> Self {
        Self {
            engine,
            ignore: options.ignore_list(),
            policy: options.loop_failure,
            failures: Vec::new(),
        }
    }

    /// Walks `node` into a fresh map.
    pub(crate) fn walk(&mut self, node: &TemplateNode, ctx: &mut LoopContext) -> Result<OutputMap> {
        let mut map = OutputMap::new();
        self.handle_node(node, &mut map, ctx)?;
        Ok(map)
    }

    pub(crate) fn into_failures(self) -> Vec<LoopFailure> {
        self.failures
    }

    fn handle_node(
        &mut self,
        node: &TemplateNode,
        map: &mut OutputMap,
        ctx: &mut LoopContext,
    ) -> Result<()> {
        copy_properties(node, map, &self.ignore, &self.engine, ctx)?;
        for child in node.children() {
            self.dispatch(child, map, ctx)?;
        }
        Ok(())
    }

    fn dispatch(
        &mut self,
        child: &TemplateNode,
        map: &mut OutputMap,
        ctx: &mut LoopContext,
    ) -> Result<()> {
        let name = child.name();

        if is_conditional(name) {
            if self.engine.evaluate_condition(name, ctx)? {
                debug!(condition = name, "condition met");
                self.handle_node(child, map, ctx)?;
            }
        } else if is_loop(name) {
            self.expand_loop(child, map, ctx)?;
        } else if child.resource_type() == Some(RT_ACE) {
            push_ace(map, Ace::from_node(child, &self.engine, ctx)?);
        } else {
            let mut child_map = OutputMap::new();
            self.handle_node(child, &mut child_map, ctx)?;
            let resolved = if is_placeholder(name) {
                self.engine.resolve_name(name, ctx)?
            } else {
                name.to_string()
            };
            map.insert(resolved, OutputValue::Node(child_map));
        }
        Ok(())
    }

    fn expand_loop(
        &mut self,
        node: &TemplateNode,
        map: &mut OutputMap,
        ctx: &mut LoopContext,
    ) -> Result<()> {
        let expression = node.name();
        let mut scope = ctx.enter_loop();
        let iterations = self.engine.resolve_array(expression, &scope)?.len();
        debug!(expression, level = scope.level(), iterations, "expanding loop");

        for iteration in 0..iterations {
            scope.set_index(iteration);
            let Err(error) = self.expand_iteration(node, map, &mut scope) else {
                continue;
            };

            match self.policy {
                LoopFailurePolicy::FailFast => {
                    return Err(TemplateError::LoopIteration {
                        expression: expression.to_string(),
                        iteration,
                        source: Box::new(error),
                    });
                }
                LoopFailurePolicy::BestEffort => {
                    warn!(
                        expression,
                        iteration,
                        skipped = iterations - iteration - 1,
                        %error,
                        "data does not fit the template, abandoning loop"
                    );
                    self.failures.push(LoopFailure {
                        expression: expression.to_string(),
                        iteration,
                        error,
                    });
                    break;
                }
            }
        }
        Ok(())
    }

    fn expand_iteration(
        &mut self,
        node: &TemplateNode,
        map: &mut OutputMap,
        ctx: &mut LoopContext,
    ) -> Result<()> {
        for child in node.children() {
            self.dispatch(child, map, ctx)?;
        }
        Ok(())
    }
}

/// Copies the properties of `node` into `map`, skipping ignored names and
/// resolving placeholder names and values.
pub(crate) fn copy_properties(
    node: &TemplateNode,
    map: &mut OutputMap,
    ignore: &IgnoreList,
    engine: &ExpressionEngine<'_>,
    ctx: &LoopContext,
) -> Result<()> {
    for (name, value) in node.properties() {
        if ignore.contains(name) {
            continue;
        }
        let name = if is_placeholder(name) {
            engine.resolve_name(name, ctx)?
        } else {
            name.clone()
        };
        let value = match value {
            PropertyValue::Single(scalar) => OutputValue::Scalar(engine.resolve_scalar(scalar, ctx)?),
            PropertyValue::Multiple(values) => OutputValue::Array(
                values
                    .iter()
                    .map(|scalar| engine.resolve_scalar(scalar, ctx))
                    .collect::<Result<_>>()?,
            ),
        };
        map.insert(name, value);
    }
    Ok(())
}
