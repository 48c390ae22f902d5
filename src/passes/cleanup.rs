//! Cosmetic cleanup.
//!
//! A single tree walk that undoes the cosmetic obfuscation layer once the
//! indirection passes have finished:
//!
//! - hex numerals lose their raw spelling and print as decimal
//! - string literals lose their raw spelling and print canonically
//! - `obj["ident"]` becomes `obj.ident` when the name is a valid, non-reserved
//!   identifier
//! - `obj[(junk, "ident")]` drops the dead prefix under the same naming rule,
//!   or collapses to the last operand when the rule fails
//! - `!0`/`!1` (and any `!<numeric literal>`) become `true`/`false`
//! - conditional expressions, `if` statements and logical operators with a
//!   boolean-literal condition keep only the taken branch
//! - empty statements are removed

use swc_core::{
    common::DUMMY_SP,
    ecma::{
        ast::{
            BinaryOp, Bool, EmptyStmt, Expr, IdentName, Invalid, Lit, MemberExpr, MemberProp,
            ModuleItem, Number, Program, Stmt, Str, UnaryOp,
        },
        visit::{VisitMut, VisitMutWith},
    },
};

use crate::{
    changes::{EventKind, EventLog},
    pass::{Pass, PassContext},
    Result,
};

/// Cosmetic cleanup pass; see the module docs for the rule list.
pub struct CleanupPass;

impl Pass for CleanupPass {
    fn name(&self) -> &'static str {
        "cosmetic-cleanup"
    }

    fn description(&self) -> &'static str {
        "Normalizes literal spellings, property access and boolean encodings"
    }

    fn run(&self, program: &mut Program, ctx: &PassContext<'_>) -> Result<usize> {
        let mut cleaner = Cleaner {
            events: ctx.events,
            changes: 0,
        };
        program.visit_mut_with(&mut cleaner);
        Ok(cleaner.changes)
    }
}

/// All ECMAScript reserved words, including the strict-mode and future set.
/// Sorted for binary search.
static RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.binary_search(&name).is_ok()
}

fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else { return false };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Decision for a computed member property, taken before mutation.
enum PropRewrite {
    /// Replace the computed property with `.name`
    Dotted(String),
    /// Keep the property computed but drop all sequence operands except the last
    CollapseSeq,
}

struct Cleaner<'a> {
    events: &'a EventLog,
    changes: usize,
}

impl Cleaner<'_> {
    fn record(&mut self, kind: EventKind) {
        self.changes += 1;
        self.events.record(kind);
    }

    fn member_rewrite(member: &MemberExpr) -> Option<PropRewrite> {
        let MemberProp::Computed(computed) = &member.prop else {
            return None;
        };
        match &*computed.expr {
            Expr::Lit(Lit::Str(prop)) => {
                let name = prop.value.as_ref();
                if is_identifier_name(name) && !is_reserved_word(name) {
                    Some(PropRewrite::Dotted(name.to_string()))
                } else {
                    None
                }
            }
            Expr::Seq(seq) => match seq.exprs.last().map(|e| &**e) {
                Some(Expr::Lit(Lit::Str(prop))) => {
                    let name = prop.value.as_ref();
                    if is_identifier_name(name) && !is_reserved_word(name) {
                        Some(PropRewrite::Dotted(name.to_string()))
                    } else {
                        Some(PropRewrite::CollapseSeq)
                    }
                }
                _ => None,
            },
            _ => None,
        }
    }
}

impl VisitMut for Cleaner<'_> {
    fn visit_mut_number(&mut self, number: &mut Number) {
        if let Some(raw) = &number.raw {
            if raw.starts_with("0x") || raw.starts_with("0X") {
                number.raw = None;
                self.record(EventKind::HexNormalized);
            }
        }
    }

    fn visit_mut_str(&mut self, string: &mut Str) {
        // Canonical double-quoted printing regardless of input spelling.
        string.raw = None;
    }

    fn visit_mut_member_expr(&mut self, member: &mut MemberExpr) {
        member.visit_mut_children_with(self);

        match Self::member_rewrite(member) {
            Some(PropRewrite::Dotted(name)) => {
                member.prop = MemberProp::Ident(IdentName {
                    span: DUMMY_SP,
                    sym: name.into(),
                });
                self.record(EventKind::PropertyAccessSimplified);
            }
            Some(PropRewrite::CollapseSeq) => {
                if let MemberProp::Computed(computed) = &mut member.prop {
                    if let Expr::Seq(seq) = &mut *computed.expr {
                        if let Some(last) = seq.exprs.pop() {
                            computed.expr = last;
                            self.record(EventKind::PropertyAccessSimplified);
                        }
                    }
                }
            }
            None => {}
        }
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        expr.visit_mut_children_with(self);

        match expr {
            // !0 → true, !1 → false (generalized to any numeric literal).
            Expr::Unary(unary) if unary.op == UnaryOp::Bang => {
                if let Expr::Lit(Lit::Num(num)) = &*unary.arg {
                    let value = num.value == 0.0 || num.value.is_nan();
                    *expr = Expr::Lit(Lit::Bool(Bool {
                        span: DUMMY_SP,
                        value,
                    }));
                    self.record(EventKind::BooleanSimplified);
                }
            }
            Expr::Cond(cond) => {
                if let Expr::Lit(Lit::Bool(test)) = &*cond.test {
                    let branch = if test.value { &mut cond.cons } else { &mut cond.alt };
                    let taken = std::mem::replace(
                        branch,
                        Box::new(Expr::Invalid(Invalid { span: DUMMY_SP })),
                    );
                    *expr = *taken;
                    self.record(EventKind::DeadCodeRemoved);
                }
            }
            Expr::Bin(bin)
                if matches!(bin.op, BinaryOp::LogicalAnd | BinaryOp::LogicalOr) =>
            {
                if let Expr::Lit(Lit::Bool(left)) = &*bin.left {
                    // true && X → X, false && X → false,
                    // true || X → true, false || X → X
                    let keep_right = left.value == (bin.op == BinaryOp::LogicalAnd);
                    let branch = if keep_right { &mut bin.right } else { &mut bin.left };
                    let taken = std::mem::replace(
                        branch,
                        Box::new(Expr::Invalid(Invalid { span: DUMMY_SP })),
                    );
                    *expr = *taken;
                    self.record(EventKind::DeadCodeRemoved);
                }
            }
            _ => {}
        }
    }

    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        stmt.visit_mut_children_with(self);

        if let Stmt::If(if_stmt) = stmt {
            if let Expr::Lit(Lit::Bool(test)) = &*if_stmt.test {
                let taken = if test.value {
                    Some(std::mem::replace(
                        &mut if_stmt.cons,
                        Box::new(Stmt::Empty(EmptyStmt { span: DUMMY_SP })),
                    ))
                } else {
                    if_stmt.alt.take()
                };
                *stmt = match taken {
                    Some(branch) => *branch,
                    None => Stmt::Empty(EmptyStmt { span: DUMMY_SP }),
                };
                self.record(EventKind::DeadCodeRemoved);
            }
        }
    }

    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        stmts.visit_mut_children_with(self);
        let before = stmts.len();
        stmts.retain(|stmt| !matches!(stmt, Stmt::Empty(_)));
        for _ in stmts.len()..before {
            self.record(EventKind::DeadCodeRemoved);
        }
    }

    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        items.visit_mut_children_with(self);
        let before = items.len();
        items.retain(|item| !matches!(item, ModuleItem::Stmt(Stmt::Empty(_))));
        for _ in items.len()..before {
            self.record(EventKind::DeadCodeRemoved);
        }
    }
}
