//! Global-resolver call inlining.

use swc_core::{
    common::{SyntaxContext, DUMMY_SP},
    ecma::{
        ast::{Callee, Expr, Ident, Lit, Program},
        visit::{VisitMut, VisitMutWith},
    },
};

use crate::{
    changes::{EventKind, EventLog},
    discovery::{is_allowed_global, GlobalResolver},
    pass::{Pass, PassContext},
    Result,
};

/// Replaces `RESOLVER("KEY")` calls with the bare global identifier the
/// resolver maps the key to.
///
/// Unknown keys and keys whose target is outside the global allow-list are
/// left untouched; the allow-list is re-checked here even though discovery
/// already filters on it, so the pass never introduces an unexpected name.
pub struct GlobalResolverPass;

impl Pass for GlobalResolverPass {
    fn name(&self) -> &'static str {
        "resolver-call-inlining"
    }

    fn description(&self) -> &'static str {
        "Replaces resolver calls with well-known global identifiers"
    }

    fn run(&self, program: &mut Program, ctx: &PassContext<'_>) -> Result<usize> {
        let mut inliner = ResolverCallInliner {
            resolvers: &ctx.artifacts.resolvers,
            events: ctx.events,
            changes: 0,
        };
        program.visit_mut_with(&mut inliner);
        Ok(inliner.changes)
    }
}

struct ResolverCallInliner<'a> {
    resolvers: &'a [GlobalResolver],
    events: &'a EventLog,
    changes: usize,
}

impl ResolverCallInliner<'_> {
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
        let resolver = self
            .resolvers
            .iter()
            .find(|r| r.name == name.sym.as_ref())?;

        let [arg] = call.args.as_slice() else {
            return None;
        };
        if arg.spread.is_some() {
            return None;
        }
        let Expr::Lit(Lit::Str(key)) = &*arg.expr else {
            return None;
        };

        let target = resolver.mappings.get(key.value.as_ref())?;
        if !is_allowed_global(target) {
            return None;
        }

        Some(Expr::Ident(Ident {
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            sym: target.as_str().into(),
            optional: false,
        }))
    }
}

impl VisitMut for ResolverCallInliner<'_> {
    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);
        if let Some(replacement) = self.inlined(expr) {
            *expr = replacement;
            self.changes += 1;
            self.events.record(EventKind::ResolverCallInlined);
        }
    }
}
