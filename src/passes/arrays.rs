//! Constant-array access inlining.

use swc_core::ecma::{
    ast::{Expr, MemberProp, Program, UnaryExpr, UnaryOp, UpdateExpr},
    visit::{VisitMut, VisitMutWith},
};

use crate::{
    changes::{EventKind, EventLog},
    discovery::Artifacts,
    eval::{eval_expr, materialize},
    pass::{Pass, PassContext},
    Result,
};

/// Inlines `ID[IDX]` into a literal when `ID` names a discovered constant array
/// and `IDX` evaluates to an in-range nonnegative integer.
///
/// Only computed member accesses in expression position are rewritten;
/// assignment targets and the operands of `++`/`--`/`delete` are left alone
/// since they require references.
pub struct ArrayAccessPass;

impl Pass for ArrayAccessPass {
    fn name(&self) -> &'static str {
        "array-access-inlining"
    }

    fn description(&self) -> &'static str {
        "Inlines computed accesses into discovered constant arrays"
    }

    fn run(&self, program: &mut Program, ctx: &PassContext<'_>) -> Result<usize> {
        let mut inliner = ArrayAccessInliner {
            artifacts: ctx.artifacts,
            events: ctx.events,
            changes: 0,
        };
        program.visit_mut_with(&mut inliner);
        Ok(inliner.changes)
    }
}

struct ArrayAccessInliner<'a> {
    artifacts: &'a Artifacts,
    events: &'a EventLog,
    changes: usize,
}

impl ArrayAccessInliner<'_> {
    fn inlined(&self, expr: &Expr) -> Option<Expr> {
        let Expr::Member(member) = expr else {
            return None;
        };
        let MemberProp::Computed(computed) = &member.prop else {
            return None;
        };
        let Expr::Ident(object) = &*member.obj else {
            return None;
        };
        let array = self.artifacts.arrays.get(object.sym.as_ref())?;
        let index = eval_expr(&computed.expr)?.as_index()?;
        let value = array.values.get(index)?;
        materialize(value)
    }
}

impl VisitMut for ArrayAccessInliner<'_> {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);
        if let Some(replacement) = self.inlined(expr) {
            *expr = replacement;
            self.changes += 1;
            self.events.record(EventKind::ArrayAccessInlined);
        }
    }

    fn visit_mut_update_expr(&mut self, update: &mut UpdateExpr) {
        // `++`/`--` need a reference; rewrite inside the operand but never the
        // operand itself.
        update.arg.visit_mut_children_with(self);
    }

    fn visit_mut_unary_expr(&mut self, unary: &mut UnaryExpr) {
        if unary.op == UnaryOp::Delete {
            unary.arg.visit_mut_children_with(self);
        } else {
            unary.visit_mut_children_with(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{changes::EventLog, config::EngineConfig, syntax::Session};

    fn run_pass(source: &str) -> (String, usize) {
        let session = Session::new();
        let mut program = session.parse(source).unwrap();
        let artifacts = Artifacts::discover(&program, source, &EngineConfig::default());
        let events = EventLog::new();
        let ctx = PassContext {
            artifacts: &artifacts,
            events: &events,
        };
        let changes = ArrayAccessPass.run(&mut program, &ctx).unwrap();
        (session.print(&program).unwrap(), changes)
    }

    const ARRAY: &str = "var k = [10, 11, 12, 13, 14, 15, 16, 17, 18, 19];";

    #[test]
    fn test_inlines_literal_index() {
        let (out, changes) = run_pass(&format!("{ARRAY} x = k[3];"));
        assert!(out.contains("x = 13"));
        assert_eq!(changes, 1);
    }

    #[test]
    fn test_inlines_hex_and_computed_index() {
        let (out, changes) = run_pass(&format!("{ARRAY} a = k[0x2]; b = k[1 + 3];"));
        assert!(out.contains("a = 12"));
        assert!(out.contains("b = 14"));
        assert_eq!(changes, 2);
    }

    #[test]
    fn test_nested_access_converges_in_one_walk() {
        // Post-order: the inner access becomes a literal before the outer index
        // is evaluated.
        let (out, changes) = run_pass(&format!("{ARRAY} var j = [9, 8, 7, 6, 5, 4, 3, 2, 1, 0]; y = k[j[9]];"));
        assert!(out.contains("y = 10"));
        assert_eq!(changes, 2);
    }

    #[test]
    fn test_out_of_range_left_alone() {
        let (out, changes) = run_pass(&format!("{ARRAY} x = k[99];"));
        assert!(out.contains("k[99]"));
        assert_eq!(changes, 0);
    }

    #[test]
    fn test_unknown_index_left_alone() {
        let (out, changes) = run_pass(&format!("{ARRAY} x = k[i];"));
        assert!(out.contains("k[i]"));
        assert_eq!(changes, 0);
    }

    #[test]
    fn test_assignment_target_left_alone() {
        let (out, _) = run_pass(&format!("{ARRAY} k[0] = 99; k[0]++;"));
        assert!(out.contains("k[0] = 99"));
        assert!(out.contains("k[0]++"));
    }

    #[test]
    fn test_dotted_access_left_alone() {
        let (out, changes) = run_pass(&format!("{ARRAY} x = k.length;"));
        assert!(out.contains("k.length"));
        assert_eq!(changes, 0);
    }
}
