//! Artifact discovery.
//!
//! Discovery runs once on the freshly parsed tree and produces the read-only
//! [`Artifacts`] state the pipeline passes consult. Three kinds of obfuscation
//! artifacts are located:
//!
//! - **Constant arrays**: large all-literal arrays indexed to indirectly supply
//!   small constants.
//! - **The string table**: a single compressed blob decoded through
//!   `decompressFromUTF16`, split on `|`, together with the name of the decoder
//!   function whose sole parameter indexes into it.
//! - **Global resolvers**: functions whose switch body maps string keys to
//!   well-known language and host globals.
//!
//! Every heuristic here is non-failing: when an artifact cannot be located with
//! confidence it simply is not recorded, and the pass it feeds stays disabled.
//!
//! # Decoder Name Strategies
//!
//! The decoder assignment usually sits next to the `decompressFromUTF16` call, so
//! the primary strategy scans the call's enclosing function body for an
//! assignment of the form `NAME = function (p) { return TABLE[p]; }` where `NAME`
//! is not a local of that function. When lexical scoping makes that ambiguous, a
//! textual fallback scans the raw source instead, anchored at the *last*
//! occurrence of `decompressFromUTF16`: the first occurrence is the codec
//! library's own definition shipped inside the obfuscated file.

use std::sync::OnceLock;

use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use swc_core::{
    common::Span,
    ecma::{
        ast::{
            ArrayLit, AssignOp, AssignTarget, CallExpr, Callee, Expr, FnDecl, FnExpr, Function,
            Lit, MemberProp, Pat, Program, ReturnStmt, SimpleAssignTarget, Stmt, SwitchStmt,
            VarDeclarator,
        },
        visit::{Visit, VisitWith},
    },
};

use crate::{
    config::EngineConfig,
    eval::{eval_expr, LiteralValue},
    utils::decompress_from_utf16,
};

/// Property name of the codec entry point in the obfuscated bundle.
const DECOMPRESS_METHOD: &str = "decompressFromUTF16";

/// A large all-literal array discovered in the input.
///
/// Every element was successfully partially evaluated at discovery time; arrays
/// containing any non-literal element are rejected whole.
#[derive(Debug, Clone)]
pub struct ConstantArray {
    /// Name of the declared identifier the array is bound to
    pub name: String,
    /// The evaluated elements, indexed 0..N-1
    pub values: Vec<LiteralValue>,
}

/// The decompressed string table and its decoder function name.
#[derive(Debug, Clone)]
pub struct StringTable {
    /// Table entries in index order
    pub entries: Vec<String>,
    /// Name of the one-argument decoder function, when it could be identified.
    /// `None` disables the decoder-call pass; the table itself is still kept.
    pub decoder: Option<String>,
}

/// A function mapping string keys to well-known global names.
#[derive(Debug, Clone)]
pub struct GlobalResolver {
    /// Name of the resolver function
    pub name: String,
    /// Key → target global name. Only allow-listed targets are recorded.
    pub mappings: FxHashMap<String, String>,
}

/// The immutable discovery state.
///
/// Produced once by [`Artifacts::discover`] and read-only thereafter; the
/// inliner passes borrow it for the lifetime of a pipeline run.
#[derive(Debug, Default)]
pub struct Artifacts {
    /// Constant arrays keyed by identifier name
    pub arrays: FxHashMap<String, ConstantArray>,
    /// At most one string table
    pub table: Option<StringTable>,
    /// Zero or more global resolvers
    pub resolvers: Vec<GlobalResolver>,
}

impl Artifacts {
    /// Scans the tree (and raw source, for the textual decoder fallback) for
    /// obfuscation artifacts.
    ///
    /// # Arguments
    ///
    /// * `program` - The freshly parsed tree.
    /// * `source` - The raw source the tree was parsed from.
    /// * `config` - Discovery thresholds (array length, resolver mappings, scan window).
    #[must_use]
    pub fn discover(program: &Program, source: &str, config: &EngineConfig) -> Self {
        let mut declarators = DeclaratorScan {
            min_array_len: config.min_array_len,
            arrays: FxHashMap::default(),
            strings: FxHashMap::default(),
        };
        program.visit_with(&mut declarators);

        let table = discover_table(program, source, &declarators.strings, config);

        let mut resolvers = ResolverScan {
            min_mappings: config.min_resolver_mappings,
            resolvers: Vec::new(),
        };
        program.visit_with(&mut resolvers);

        Self {
            arrays: declarators.arrays,
            table,
            resolvers: resolvers.resolvers,
        }
    }

    /// Returns `true` when nothing was discovered.
    ///
    /// A pipeline over an empty discovery state degenerates to a parse-and-print
    /// round trip (plus cosmetic cleanup).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty() && self.table.is_none() && self.resolvers.is_empty()
    }
}

/// Checks a name against the fixed allow-list of well-known globals.
///
/// The resolver pass never introduces a bare identifier outside this set, even
/// when a discovered mapping points at one.
#[must_use]
pub fn is_allowed_global(name: &str) -> bool {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| GLOBAL_ALLOWLIST.iter().copied().collect())
        .contains(name)
}

/// Well-known language and host globals eligible for resolver inlining.
static GLOBAL_ALLOWLIST: &[&str] = &[
    "Object", "Array", "String", "Number", "Boolean", "Function", "Symbol", "Date", "RegExp",
    "Error", "TypeError", "RangeError", "SyntaxError", "ReferenceError", "Promise", "Map", "Set",
    "WeakMap", "WeakSet", "Proxy", "Reflect", "ArrayBuffer", "DataView", "SharedArrayBuffer",
    "Int8Array", "Uint8Array", "Uint8ClampedArray", "Int16Array", "Uint16Array", "Int32Array",
    "Uint32Array", "Float32Array", "Float64Array", "BigInt64Array", "BigUint64Array",
    "TextEncoder", "TextDecoder", "URL", "URLSearchParams", "Blob", "File", "FileReader",
    "FormData", "Request", "Response", "Headers", "AbortController", "XMLHttpRequest", "fetch",
    "WebSocket", "EventSource", "BroadcastChannel", "Worker", "SharedWorker", "ServiceWorker",
    "crypto", "Crypto", "SubtleCrypto", "CryptoKey", "performance", "Performance",
    "PerformanceObserver", "navigator", "Navigator", "location", "Location", "history", "History",
    "localStorage", "sessionStorage", "Storage", "indexedDB", "IDBFactory", "console", "Console",
    "document", "Document", "window", "Window", "self", "globalThis", "global", "setTimeout",
    "setInterval", "clearTimeout", "clearInterval", "requestAnimationFrame",
    "cancelAnimationFrame", "queueMicrotask", "atob", "btoa", "eval", "isNaN", "isFinite",
    "parseInt", "parseFloat", "encodeURI", "decodeURI", "encodeURIComponent",
    "decodeURIComponent", "JSON", "Math", "Intl", "Atomics", "NaN", "Infinity", "undefined",
    "structuredClone", "process", "Buffer", "require", "module", "exports", "__dirname",
    "__filename",
];

/// Collects constant arrays and string-literal bindings in one walk.
struct DeclaratorScan {
    min_array_len: usize,
    arrays: FxHashMap<String, ConstantArray>,
    strings: FxHashMap<String, String>,
}

impl Visit for DeclaratorScan {
    fn visit_var_declarator(&mut self, decl: &VarDeclarator) {
        decl.visit_children_with(self);

        let Pat::Ident(binding) = &decl.name else {
            return;
        };
        let Some(init) = &decl.init else { return };
        let name = binding.id.sym.as_ref().to_string();

        match &**init {
            Expr::Array(array) => {
                if let Some(values) = literal_elements(array, self.min_array_len) {
                    // Later declarators of the same name win.
                    self.arrays.insert(name.clone(), ConstantArray { name, values });
                }
            }
            Expr::Lit(Lit::Str(s)) => {
                self.strings.insert(name, s.value.as_ref().to_string());
            }
            _ => {}
        }
    }
}

/// Evaluates every element of an array literal, rejecting the array whole when
/// any element is missing, spread, or not statically evaluable.
fn literal_elements(array: &ArrayLit, min_len: usize) -> Option<Vec<LiteralValue>> {
    if array.elems.len() < min_len {
        return None;
    }
    let mut values = Vec::with_capacity(array.elems.len());
    for elem in &array.elems {
        let elem = elem.as_ref()?;
        if elem.spread.is_some() {
            return None;
        }
        values.push(eval_expr(&elem.expr)?);
    }
    Some(values)
}

/// Locates the string-table call and assembles the [`StringTable`].
fn discover_table(
    program: &Program,
    source: &str,
    strings: &FxHashMap<String, String>,
    config: &EngineConfig,
) -> Option<StringTable> {
    let mut finder = TableCallFinder {
        strings,
        found: None,
    };
    program.visit_with(&mut finder);
    let (payload, call_span) = finder.found?;

    let decompressed = decompress_from_utf16(&payload);
    if decompressed.is_empty() {
        // Malformed payloads decompress to empty: no string table discovered.
        return None;
    }
    let entries = decompressed.split('|').map(str::to_string).collect();

    let decoder = decoder_from_tree(program, call_span)
        .or_else(|| decoder_from_source(source, config.decoder_scan_window));

    Some(StringTable { entries, decoder })
}

/// Finds the first `*.decompressFromUTF16(payload)` call in source order and
/// resolves its payload argument.
struct TableCallFinder<'a> {
    strings: &'a FxHashMap<String, String>,
    found: Option<(String, Span)>,
}

impl Visit for TableCallFinder<'_> {
    fn visit_call_expr(&mut self, call: &CallExpr) {
        if self.found.is_some() {
            return;
        }
        if is_decompress_call(call) {
            if let Some(payload) = self.payload_argument(call) {
                self.found = Some((payload, call.span));
                return;
            }
        }
        call.visit_children_with(self);
    }
}

impl TableCallFinder<'_> {
    /// The payload is either an inline string literal or an identifier bound to
    /// one by a declarator elsewhere in the file.
    fn payload_argument(&self, call: &CallExpr) -> Option<String> {
        let [arg] = call.args.as_slice() else {
            return None;
        };
        if arg.spread.is_some() {
            return None;
        }
        match &*arg.expr {
            Expr::Lit(Lit::Str(s)) => Some(s.value.as_ref().to_string()),
            Expr::Ident(ident) => self.strings.get(ident.sym.as_ref()).cloned(),
            _ => None,
        }
    }
}

fn is_decompress_call(call: &CallExpr) -> bool {
    let Callee::Expr(callee) = &call.callee else {
        return false;
    };
    let Expr::Member(member) = &**callee else {
        return false;
    };
    matches!(&member.prop, MemberProp::Ident(name) if name.sym.as_ref() == DECOMPRESS_METHOD)
}

/// Per-function summary used to resolve the decoder assignment.
struct FunctionInfo {
    span: Span,
    locals: FxHashSet<String>,
    candidates: Vec<String>,
}

/// AST strategy: in the innermost function enclosing the table call, find a
/// top-level `NAME = function (p) { return TABLE[p]; }` assignment where `NAME`
/// is not a local of that function.
fn decoder_from_tree(program: &Program, call_span: Span) -> Option<String> {
    let mut scan = FunctionScan {
        functions: Vec::new(),
    };
    program.visit_with(&mut scan);

    let enclosing = scan
        .functions
        .iter()
        .filter(|f| f.span.lo <= call_span.lo && call_span.hi <= f.span.hi)
        .min_by_key(|f| f.span.hi - f.span.lo)?;

    enclosing
        .candidates
        .iter()
        .find(|name| !enclosing.locals.contains(name.as_str()))
        .cloned()
}

struct FunctionScan {
    functions: Vec<FunctionInfo>,
}

impl Visit for FunctionScan {
    fn visit_function(&mut self, func: &Function) {
        func.visit_children_with(self);
        if let Some(body) = &func.body {
            let mut locals = FxHashSet::default();
            for param in &func.params {
                if let Pat::Ident(binding) = &param.pat {
                    locals.insert(binding.id.sym.as_ref().to_string());
                }
            }
            let mut hoisted = HoistedNames { names: &mut locals };
            body.visit_with(&mut hoisted);

            let candidates = body
                .stmts
                .iter()
                .filter_map(decoder_assignment)
                .collect();

            self.functions.push(FunctionInfo {
                span: func.span,
                locals,
                candidates,
            });
        }
    }
}

/// Collects names that hoist to the current function scope, without crossing
/// into nested function bodies.
struct HoistedNames<'a> {
    names: &'a mut FxHashSet<String>,
}

impl Visit for HoistedNames<'_> {
    fn visit_var_declarator(&mut self, decl: &VarDeclarator) {
        if let Pat::Ident(binding) = &decl.name {
            self.names.insert(binding.id.sym.as_ref().to_string());
        }
        decl.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, decl: &FnDecl) {
        self.names.insert(decl.ident.sym.as_ref().to_string());
    }

    fn visit_function(&mut self, _func: &Function) {}

    fn visit_arrow_expr(&mut self, _expr: &swc_core::ecma::ast::ArrowExpr) {}
}

/// Matches `NAME = function (p) { return TABLE[p]; }` and yields `NAME`.
fn decoder_assignment(stmt: &Stmt) -> Option<String> {
    let Stmt::Expr(expr_stmt) = stmt else {
        return None;
    };
    let Expr::Assign(assign) = &*expr_stmt.expr else {
        return None;
    };
    if assign.op != AssignOp::Assign {
        return None;
    }
    let AssignTarget::Simple(SimpleAssignTarget::Ident(target)) = &assign.left else {
        return None;
    };
    let Expr::Fn(FnExpr { function, .. }) = &*assign.right else {
        return None;
    };

    let [param] = function.params.as_slice() else {
        return None;
    };
    let Pat::Ident(param) = &param.pat else {
        return None;
    };
    let body = function.body.as_ref()?;
    let [Stmt::Return(ret)] = body.stmts.as_slice() else {
        return None;
    };
    let arg = ret.arg.as_deref()?;

    let Expr::Member(member) = arg else {
        return None;
    };
    if !matches!(&*member.obj, Expr::Ident(_)) {
        return None;
    }
    let MemberProp::Computed(computed) = &member.prop else {
        return None;
    };
    let Expr::Ident(index) = &*computed.expr else {
        return None;
    };
    if index.sym != param.id.sym {
        return None;
    }

    Some(target.id.sym.as_ref().to_string())
}

/// Textual fallback: scan forward from the last `decompressFromUTF16` occurrence
/// for the decoder-assignment pattern.
fn decoder_from_source(source: &str, window: usize) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(
            r"([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*function\s*\(\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*\)\s*\{\s*return\s+[A-Za-z_$][A-Za-z0-9_$]*\[\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*\]\s*;?\s*\}",
        )
        .expect("decoder pattern is valid")
    });

    // The first occurrence is the codec library's own definition; the last one
    // is the call site the decoder assignment sits next to.
    let anchor = source.rfind(DECOMPRESS_METHOD)?;
    let mut end = (anchor + window).min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }

    re.captures_iter(&source[anchor..end])
        .find(|caps| &caps[2] == &caps[3])
        .map(|caps| caps[1].to_string())
}

/// Discovers resolver functions: a single-parameter function (declaration or
/// named expression) whose body switches on the parameter and returns globals.
struct ResolverScan {
    min_mappings: usize,
    resolvers: Vec<GlobalResolver>,
}

impl Visit for ResolverScan {
    fn visit_fn_decl(&mut self, decl: &FnDecl) {
        decl.visit_children_with(self);
        self.consider(decl.ident.sym.as_ref(), &decl.function);
    }

    fn visit_fn_expr(&mut self, expr: &FnExpr) {
        expr.visit_children_with(self);
        if let Some(ident) = &expr.ident {
            self.consider(ident.sym.as_ref(), &expr.function);
        }
    }
}

impl ResolverScan {
    fn consider(&mut self, name: &str, function: &Function) {
        let [param] = function.params.as_slice() else {
            return;
        };
        let Pat::Ident(param) = &param.pat else {
            return;
        };
        let Some(body) = &function.body else { return };

        for stmt in &body.stmts {
            let Stmt::Switch(switch) = stmt else { continue };
            let Expr::Ident(discriminant) = &*switch.discriminant else {
                continue;
            };
            if discriminant.sym != param.id.sym {
                continue;
            }

            let mappings = switch_mappings(switch);
            if mappings.len() >= self.min_mappings {
                self.resolvers.push(GlobalResolver {
                    name: name.to_string(),
                    mappings,
                });
            }
            break;
        }
    }
}

/// Extracts `label → target` pairs from a resolver switch body.
///
/// Only cases with string-literal labels contribute, and only when the first
/// return statement in the consequent yields `OBJ["NAME"]`, `OBJ.NAME` or a
/// bare identifier whose name is allow-listed.
fn switch_mappings(switch: &SwitchStmt) -> FxHashMap<String, String> {
    let mut mappings = FxHashMap::default();
    for case in &switch.cases {
        let Some(test) = &case.test else { continue };
        let Expr::Lit(Lit::Str(label)) = &**test else {
            continue;
        };
        let Some(ret) = first_return(&case.cons) else {
            continue;
        };
        let Some(target) = return_target(ret) else {
            continue;
        };
        if is_allowed_global(&target) {
            mappings.insert(label.value.as_ref().to_string(), target);
        }
    }
    mappings
}

fn first_return(stmts: &[Stmt]) -> Option<&ReturnStmt> {
    for stmt in stmts {
        match stmt {
            Stmt::Return(ret) => return Some(ret),
            Stmt::Block(block) => {
                if let Some(ret) = first_return(&block.stmts) {
                    return Some(ret);
                }
            }
            _ => {}
        }
    }
    None
}

fn return_target(ret: &ReturnStmt) -> Option<String> {
    match ret.arg.as_deref()? {
        Expr::Member(member) => match &member.prop {
            MemberProp::Computed(computed) => match &*computed.expr {
                Expr::Lit(Lit::Str(name)) => Some(name.value.as_ref().to_string()),
                _ => None,
            },
            MemberProp::Ident(name) => Some(name.sym.as_ref().to_string()),
            MemberProp::PrivateName(_) => None,
        },
        Expr::Ident(ident) => Some(ident.sym.as_ref().to_string()),
        _ => None,
    }
}
