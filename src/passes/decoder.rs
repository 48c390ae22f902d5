//! Decoder-call inlining.

use swc_core::{
    common::DUMMY_SP,
    ecma::{
        ast::{Callee, Expr, Lit, Program, Str},
        visit::{VisitMut, VisitMutWith},
    },
};

use crate::{
    changes::{EventKind, EventLog},
    eval::eval_expr,
    pass::{Pass, PassContext},
    Result,
};

/// Inlines calls to the discovered decoder function into string literals.
///
/// `DECODER(N)` with a statically-known nonnegative integer `N` in table range
/// becomes the table entry at index `N`. Unknown arguments and out-of-range
/// indices are left untouched.
pub struct DecoderCallPass;

impl Pass for DecoderCallPass {
    fn name(&self) -> &'static str {
        "decoder-call-inlining"
    }

    fn description(&self) -> &'static str {
        "Inlines decoder calls into string-table entries"
    }

    fn run(&self, program: &mut Program, ctx: &PassContext<'_>) -> Result<usize> {
        // The engine only schedules this pass when discovery produced a table
        // with a known decoder; anything else is a driver bug.
        let table = ctx
            .artifacts
            .table
            .as_ref()
            .ok_or_else(|| internal_error!("decoder-call-inlining", "no string table discovered"))?;
        let decoder = table
            .decoder
            .as_deref()
            .ok_or_else(|| internal_error!("decoder-call-inlining", "string table has no decoder"))?;

        let mut inliner = DecoderCallInliner {
            decoder,
            entries: &table.entries,
            events: ctx.events,
            changes: 0,
        };
        program.visit_mut_with(&mut inliner);
        Ok(inliner.changes)
    }
}

struct DecoderCallInliner<'a> {
    decoder: &'a str,
    entries: &'a [String],
    events: &'a EventLog,
    changes: usize,
}

impl DecoderCallInliner<'_> {
    fn inlined(&self, expr: &Expr) -> Option<Expr> {
        let Expr::Call(call) = expr else {
            return None;
        };
        let Callee::Expr(callee) = &call.callee else {
            return None;
        };
        let Expr::Ident(name) = &**callee else {
            return None;
        };
        if name.sym.as_ref() != self.decoder {
            return None;
        }
        let [arg] = call.args.as_slice() else {
            return None;
        };
        if arg.spread.is_some() {
            return None;
        }
        let index = eval_expr(&arg.expr)?.as_index()?;
        let entry = self.entries.get(index)?;
        Some(Expr::Lit(Lit::Str(Str {
            span: DUMMY_SP,
            value: entry.as_str().into(),
            raw: None,
        })))
    }
}

impl VisitMut for DecoderCallInliner<'_> {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);
        if let Some(replacement) = self.inlined(expr) {
            *expr = replacement;
            self.changes += 1;
            self.events.record(EventKind::DecoderCallInlined);
        }
    }
}
