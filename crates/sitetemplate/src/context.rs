//! Loop index context.
//!
//! [`LoopContext`] records, for every loop currently being expanded, which
//! iteration is in progress. Index 0 belongs to the outermost open loop. Array
//! segments in an expression path consume these entries left to right, so
//! `@@sites(...).pages(...).title@@` reads `sites` at the outer index and
//! `pages` at the inner one.
//!
//! Entering a loop returns a [`LoopScope`] guard. The guard derefs to the
//! context, so the loop body keeps using it for resolution, and restores the
//! stack to its previous depth when dropped, including on early return.

use std::ops::{Deref, DerefMut};

/// Stack of loop iteration indexes, one per open loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopContext {
    indexes: Vec<usize>,
}

impl LoopContext {
    /// Creates an empty context (no loop open).
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of loops currently open.
    pub fn depth(&self) -> usize {
        self.indexes.len()
    }

    /// Returns `true` if no loop is open.
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Iteration index of the loop at nesting `level` (0 = outermost).
    pub fn index_at(&self, level: usize) -> Option<usize> {
        self.indexes.get(level).copied()
    }

    /// All open indexes, outermost first.
    pub fn indexes(&self) -> &[usize] {
        &self.indexes
    }

    /// Opens a new loop level starting at iteration 0.
    pub fn enter_loop(&mut self) -> LoopScope<'_> {
        let level = self.indexes.len();
        self.indexes.push(0);
        LoopScope { ctx: self, level }
    }
}

/// Guard for one open loop level.
///
/// Dropping the scope truncates the stack back to the depth it had before
/// the loop was entered.
#[derive(Debug)]
pub struct LoopScope<'c> {
    ctx: &'c mut LoopContext,
    level: usize,
}

impl LoopScope<'_> {
    /// Nesting level owned by this scope.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Moves this loop to iteration `index`.
    pub fn set_index(&mut self, index: usize) {
        // Inner scopes are always dropped before the outer one advances.
        self.ctx.indexes.truncate(self.level + 1);
        if let Some(slot) = self.ctx.indexes.get_mut(self.level) {
            *slot = index;
        }
    }
}

impl Deref for LoopScope<'_> {
    type Target = LoopContext;

    fn deref(&self) -> &LoopContext {
        self.ctx
    }
}

impl DerefMut for LoopScope<'_> {
    fn deref_mut(&mut self) -> &mut LoopContext {
        self.ctx
    }
}

impl Drop for LoopScope<'_> {
    fn drop(&mut self) {
        self.ctx.indexes.truncate(self.level);
    }
}
