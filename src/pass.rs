//! Pass trait and shared context for the rewrite pipeline.
//!
//! Every inliner pass is a tree walker that mutates nodes in place and reports
//! how many rewrites it made. Passes are idempotent under repeated application
//! and non-failing by design: a pass that cannot make progress returns a zero
//! change count rather than an error.

use swc_core::ecma::ast::Program;

use crate::{changes::EventLog, discovery::Artifacts, Result};

/// Shared read-only state for a pipeline run.
///
/// The discovery state is written once in Phase 0 and only read afterwards;
/// the event log accumulates rewrite counters across all passes.
pub struct PassContext<'a> {
    /// Discovered obfuscation artifacts
    pub artifacts: &'a Artifacts,
    /// Rewrite event log
    pub events: &'a EventLog,
}

/// A rewrite pass over the syntax tree.
///
/// Passes never introduce new bindings and never reorder statements; each
/// rewrite replaces a node with a semantically equivalent node or leaves it
/// unchanged.
pub trait Pass {
    /// Unique name for error reporting and debugging.
    fn name(&self) -> &'static str;

    /// Get a description of what this pass does.
    fn description(&self) -> &'static str {
        "No description available"
    }

    /// Runs the pass over the whole tree.
    ///
    /// Returns the number of rewrites performed; zero means the pass found
    /// nothing left to do (its fixed point for this tree).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`](crate::Error::Internal) when a pass
    /// invariant is violated. This is not expected to occur.
    fn run(&self, program: &mut Program, ctx: &PassContext<'_>) -> Result<usize>;
}
