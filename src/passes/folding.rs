//! Constant folding and string merging.

use swc_core::ecma::{
    ast::{Expr, Program},
    visit::{VisitMut, VisitMutWith},
};

use crate::{
    changes::{EventKind, EventLog},
    eval::{eval_expr, materialize, LiteralValue},
    pass::{Pass, PassContext},
    Result,
};

/// Folds binary expressions whose operands are statically known.
///
/// Runs the partial evaluator on post-order exit from every binary expression,
/// so `"a" + "b" + "c"` collapses bottom-up in a single walk and longer chains
/// finish once their children have folded. String results count as merges,
/// everything else as constant folds.
pub struct ConstantFoldingPass;

impl Pass for ConstantFoldingPass {
    fn name(&self) -> &'static str {
        "constant-folding"
    }

    fn description(&self) -> &'static str {
        "Folds constant expressions and merges string literals"
    }

    fn run(&self, program: &mut Program, ctx: &PassContext<'_>) -> Result<usize> {
        let mut folder = Folder {
            events: ctx.events,
            changes: 0,
        };
        program.visit_mut_with(&mut folder);
        Ok(folder.changes)
    }
}

struct Folder<'a> {
    events: &'a EventLog,
    changes: usize,
}

impl VisitMut for Folder<'_> {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);
        if !matches!(expr, Expr::Bin(_)) {
            return;
        }
        let Some(value) = eval_expr(expr) else { return };
        let Some(replacement) = materialize(&value) else {
            return;
        };
        let kind = if matches!(value, LiteralValue::Str(_)) {
            EventKind::StringMerged
        } else {
            EventKind::ConstantFolded
        };
        *expr = replacement;
        self.changes += 1;
        self.events.record(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{changes::EventLog, discovery::Artifacts, syntax::Session};

    fn run_pass(source: &str) -> (String, usize, EventLog) {
        let session = Session::new();
        let mut program = session.parse(source).unwrap();
        let artifacts = Artifacts::default();
        let events = EventLog::new();
        let changes = {
            let ctx = PassContext {
                artifacts: &artifacts,
                events: &events,
            };
            ConstantFoldingPass.run(&mut program, &ctx).unwrap()
        };
        (session.print(&program).unwrap(), changes, events)
    }

    #[test]
    fn test_merges_string_chain() {
        let (out, changes, events) = run_pass(r#"s = "foo" + "bar" + "baz";"#);
        assert!(out.contains(r#"s = "foobarbaz""#));
        assert_eq!(changes, 2);
        assert_eq!(events.count(EventKind::StringMerged), 2);
    }

    #[test]
    fn test_folds_arithmetic() {
        let (out, changes, events) = run_pass("n = 2 + 3 * 4;");
        assert!(out.contains("n = 14"));
        assert_eq!(changes, 2);
        assert_eq!(events.count(EventKind::ConstantFolded), 2);
    }

    #[test]
    fn test_mixed_number_string() {
        let (out, _, _) = run_pass(r#"s = "v" + 2;"#);
        assert!(out.contains(r#"s = "v2""#));
    }

    #[test]
    fn test_unknown_operand_left_alone() {
        let (out, changes, _) = run_pass("n = x + 1;");
        assert!(out.contains("x + 1"));
        assert_eq!(changes, 0);
    }

    #[test]
    fn test_division_by_zero_left_alone() {
        let (out, changes, _) = run_pass("n = 1 / 0;");
        assert!(out.contains("1 / 0"));
        assert_eq!(changes, 0);
    }

    #[test]
    fn test_void_zero_left_inert() {
        // `void 0` is the materialized form of undefined; nothing folds it
        // further because it is not a binary expression.
        let (out, changes, _) = run_pass("x = void 0;");
        assert!(out.contains("void 0"));
        assert_eq!(changes, 0);
    }

    #[test]
    fn test_comparison_left_alone() {
        let (out, changes, _) = run_pass("b = 1 < 2;");
        assert!(out.contains("1 < 2"));
        assert_eq!(changes, 0);
    }
}
