//! Partial evaluation of literal expressions.
//!
//! The inliner passes need to know the static value of small expression trees:
//! array indices like `0x3` or `2 + 1`, decoder arguments, and foldable string
//! concatenations. This module provides a pure recursive evaluator over a closed
//! value domain together with a constructor that materializes a value back into a
//! syntax-tree node.
//!
//! The evaluator fails closed: any node kind, operand type or edge case outside
//! its domain yields `None` ("do not rewrite") rather than an approximation.
//! Operand-kind combinations are enumerated explicitly instead of modelling the
//! script language's coercion rules.

use swc_core::{
    common::DUMMY_SP,
    ecma::ast::{
        BinaryOp, Bool, Expr, Lit, Null, Number, Str, UnaryExpr, UnaryOp,
    },
};

/// A value known at partial-evaluation time.
///
/// `Undefined` arises only from the `void` operator and is materialized back into
/// the tree as `void 0`.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// A floating-point number (including non-finite results of folding)
    Number(f64),
    /// A string
    Str(String),
    /// A boolean
    Bool(bool),
    /// null
    Null,
    /// undefined
    Undefined,
}

impl LiteralValue {
    /// Truthiness under the script language's boolean conversion.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            LiteralValue::Number(n) => *n != 0.0 && !n.is_nan(),
            LiteralValue::Str(s) => !s.is_empty(),
            LiteralValue::Bool(b) => *b,
            LiteralValue::Null | LiteralValue::Undefined => false,
        }
    }

    /// Returns the value as a nonnegative integer index, if it is one.
    ///
    /// Only finite whole numbers in `usize` range qualify; everything else is
    /// rejected so callers can use the result directly for element lookup.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            LiteralValue::Number(n)
                if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 && *n <= usize::MAX as f64 =>
            {
                Some(*n as usize)
            }
            _ => None,
        }
    }
}

/// ToInt32 (modular 2^32 wrap into signed range).
fn to_int32(n: f64) -> i32 {
    if n.is_nan() || n.is_infinite() || n == 0.0 {
        return 0;
    }
    let int = n.trunc() % 4_294_967_296.0;
    let int = if int < 0.0 { int + 4_294_967_296.0 } else { int };
    if int >= 2_147_483_648.0 {
        (int - 4_294_967_296.0) as i32
    } else {
        int as i32
    }
}

/// ToUint32 (modular 2^32 wrap into unsigned range).
fn to_uint32(n: f64) -> u32 {
    if n.is_nan() || n.is_infinite() || n == 0.0 {
        return 0;
    }
    let int = n.trunc() % 4_294_967_296.0;
    if int < 0.0 {
        (int + 4_294_967_296.0) as u32
    } else {
        int as u32
    }
}

/// Number-to-string conversion for string concatenation.
///
/// Whole numbers in safe-integer range print without a fractional part; the rest go
/// through the shortest round-trip formatting, which agrees with the script
/// language for the doubles this pipeline produces.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return format!("{}", n as i64);
    }
    format!("{n}")
}

/// Evaluates an expression to a [`LiteralValue`] when its value is statically known.
///
/// Supported inputs: number/string/boolean/null literals, parenthesized
/// expressions, the unary operators `-` `+` `!` `~` `void`, and binary arithmetic
/// and bitwise operators with strict operand typing (`+` also concatenates when
/// either operand is a string). Division or modulo by zero is not evaluable.
///
/// Returns `None` for everything else; never panics.
#[must_use]
pub fn eval_expr(expr: &Expr) -> Option<LiteralValue> {
    match expr {
        Expr::Lit(lit) => eval_lit(lit),
        Expr::Paren(paren) => eval_expr(&paren.expr),
        Expr::Unary(unary) => eval_unary(unary),
        Expr::Bin(bin) => {
            let left = eval_expr(&bin.left)?;
            let right = eval_expr(&bin.right)?;
            eval_binary(bin.op, &left, &right)
        }
        _ => None,
    }
}

fn eval_lit(lit: &Lit) -> Option<LiteralValue> {
    match lit {
        Lit::Num(n) => Some(LiteralValue::Number(n.value)),
        Lit::Str(s) => Some(LiteralValue::Str(s.value.as_ref().to_string())),
        Lit::Bool(b) => Some(LiteralValue::Bool(b.value)),
        Lit::Null(_) => Some(LiteralValue::Null),
        _ => None,
    }
}

fn eval_unary(unary: &UnaryExpr) -> Option<LiteralValue> {
    let arg = eval_expr(&unary.arg)?;
    match unary.op {
        // `void x` is undefined regardless of the argument's value.
        UnaryOp::Void => Some(LiteralValue::Undefined),
        UnaryOp::Bang => Some(LiteralValue::Bool(!arg.truthy())),
        UnaryOp::Minus => match arg {
            LiteralValue::Number(n) => Some(LiteralValue::Number(-n)),
            _ => None,
        },
        UnaryOp::Plus => match arg {
            LiteralValue::Number(n) => Some(LiteralValue::Number(n)),
            _ => None,
        },
        UnaryOp::Tilde => match arg {
            LiteralValue::Number(n) => Some(LiteralValue::Number(f64::from(!to_int32(n)))),
            _ => None,
        },
        _ => None,
    }
}

fn eval_binary(op: BinaryOp, left: &LiteralValue, right: &LiteralValue) -> Option<LiteralValue> {
    use LiteralValue::{Number, Str};

    match op {
        // `+` concatenates when either operand is a string.
        BinaryOp::Add => match (left, right) {
            (Number(l), Number(r)) => Some(Number(l + r)),
            (Str(l), Str(r)) => Some(Str(format!("{l}{r}"))),
            (Str(l), Number(r)) => Some(Str(format!("{l}{}", format_number(*r)))),
            (Number(l), Str(r)) => Some(Str(format!("{}{r}", format_number(*l)))),
            _ => None,
        },
        BinaryOp::Sub => numeric(left, right, |l, r| Some(l - r)),
        BinaryOp::Mul => numeric(left, right, |l, r| Some(l * r)),
        BinaryOp::Div => numeric(left, right, |l, r| if r == 0.0 { None } else { Some(l / r) }),
        BinaryOp::Mod => numeric(left, right, |l, r| if r == 0.0 { None } else { Some(l % r) }),
        BinaryOp::Exp => numeric(left, right, |l, r| Some(l.powf(r))),
        BinaryOp::BitAnd => numeric(left, right, |l, r| {
            Some(f64::from(to_int32(l) & to_int32(r)))
        }),
        BinaryOp::BitOr => numeric(left, right, |l, r| {
            Some(f64::from(to_int32(l) | to_int32(r)))
        }),
        BinaryOp::BitXor => numeric(left, right, |l, r| {
            Some(f64::from(to_int32(l) ^ to_int32(r)))
        }),
        BinaryOp::LShift => numeric(left, right, |l, r| {
            Some(f64::from(to_int32(l) << (to_uint32(r) & 31)))
        }),
        BinaryOp::RShift => numeric(left, right, |l, r| {
            Some(f64::from(to_int32(l) >> (to_uint32(r) & 31)))
        }),
        BinaryOp::ZeroFillRShift => numeric(left, right, |l, r| {
            Some(f64::from(to_uint32(l) >> (to_uint32(r) & 31)))
        }),
        _ => None,
    }
}

fn numeric(
    left: &LiteralValue,
    right: &LiteralValue,
    op: impl Fn(f64, f64) -> Option<f64>,
) -> Option<LiteralValue> {
    match (left, right) {
        (LiteralValue::Number(l), LiteralValue::Number(r)) => {
            op(*l, *r).map(LiteralValue::Number)
        }
        _ => None,
    }
}

/// Materializes a [`LiteralValue`] back into an expression node.
///
/// Negative numbers become `-<positive literal>`, `Undefined` becomes `void 0`,
/// and non-finite numbers are not materialized (`None`): the pipeline leaves the
/// original expression in place rather than introduce `NaN`/`Infinity`
/// identifiers whose bindings it cannot see.
#[must_use]
pub fn materialize(value: &LiteralValue) -> Option<Expr> {
    match value {
        LiteralValue::Number(n) if !n.is_finite() => None,
        LiteralValue::Number(n) if *n < 0.0 => Some(Expr::Unary(UnaryExpr {
            span: DUMMY_SP,
            op: UnaryOp::Minus,
            arg: Box::new(number_expr(-*n)),
        })),
        LiteralValue::Number(n) => Some(number_expr(*n)),
        LiteralValue::Str(s) => Some(Expr::Lit(Lit::Str(Str {
            span: DUMMY_SP,
            value: s.as_str().into(),
            raw: None,
        }))),
        LiteralValue::Bool(b) => Some(Expr::Lit(Lit::Bool(Bool {
            span: DUMMY_SP,
            value: *b,
        }))),
        LiteralValue::Null => Some(Expr::Lit(Lit::Null(Null { span: DUMMY_SP }))),
        LiteralValue::Undefined => Some(Expr::Unary(UnaryExpr {
            span: DUMMY_SP,
            op: UnaryOp::Void,
            arg: Box::new(number_expr(0.0)),
        })),
    }
}

fn number_expr(value: f64) -> Expr {
    Expr::Lit(Lit::Num(Number {
        span: DUMMY_SP,
        value,
        raw: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_core::ecma::ast::BinExpr;

    fn num(value: f64) -> Expr {
        number_expr(value)
    }

    fn string(value: &str) -> Expr {
        Expr::Lit(Lit::Str(Str {
            span: DUMMY_SP,
            value: value.into(),
            raw: None,
        }))
    }

    fn bin(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Bin(BinExpr {
            span: DUMMY_SP,
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn unary(op: UnaryOp, arg: Expr) -> Expr {
        Expr::Unary(UnaryExpr {
            span: DUMMY_SP,
            op,
            arg: Box::new(arg),
        })
    }

    #[test]
    fn test_literals() {
        assert_eq!(eval_expr(&num(3.0)), Some(LiteralValue::Number(3.0)));
        assert_eq!(
            eval_expr(&string("x")),
            Some(LiteralValue::Str("x".to_string()))
        );
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(
            eval_expr(&bin(BinaryOp::Add, num(2.0), num(3.0))),
            Some(LiteralValue::Number(5.0))
        );
        assert_eq!(
            eval_expr(&bin(BinaryOp::Mul, num(4.0), num(2.5))),
            Some(LiteralValue::Number(10.0))
        );
    }

    #[test]
    fn test_division_by_zero_not_evaluable() {
        assert_eq!(eval_expr(&bin(BinaryOp::Div, num(1.0), num(0.0))), None);
        assert_eq!(eval_expr(&bin(BinaryOp::Mod, num(1.0), num(0.0))), None);
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(
            eval_expr(&bin(BinaryOp::Add, string("a"), string("b"))),
            Some(LiteralValue::Str("ab".to_string()))
        );
        assert_eq!(
            eval_expr(&bin(BinaryOp::Add, string("n="), num(42.0))),
            Some(LiteralValue::Str("n=42".to_string()))
        );
        assert_eq!(
            eval_expr(&bin(BinaryOp::Add, num(1.0), string("st"))),
            Some(LiteralValue::Str("1st".to_string()))
        );
    }

    #[test]
    fn test_mixed_add_fails_closed() {
        let boolean = Expr::Lit(Lit::Bool(Bool {
            span: DUMMY_SP,
            value: true,
        }));
        assert_eq!(eval_expr(&bin(BinaryOp::Add, boolean, string("x"))), None);
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(
            eval_expr(&unary(UnaryOp::Minus, num(7.0))),
            Some(LiteralValue::Number(-7.0))
        );
        assert_eq!(
            eval_expr(&unary(UnaryOp::Bang, num(0.0))),
            Some(LiteralValue::Bool(true))
        );
        assert_eq!(
            eval_expr(&unary(UnaryOp::Tilde, num(5.0))),
            Some(LiteralValue::Number(-6.0))
        );
        assert_eq!(
            eval_expr(&unary(UnaryOp::Void, num(99.0))),
            Some(LiteralValue::Undefined)
        );
        // `-` on a string fails closed.
        assert_eq!(eval_expr(&unary(UnaryOp::Minus, string("3"))), None);
    }

    #[test]
    fn test_int32_semantics() {
        // ~ and the bitwise operators work on 32-bit wrapped values.
        assert_eq!(
            eval_expr(&unary(UnaryOp::Tilde, num(4_294_967_296.0))),
            Some(LiteralValue::Number(-1.0))
        );
        assert_eq!(
            eval_expr(&bin(BinaryOp::ZeroFillRShift, num(-1.0), num(0.0))),
            Some(LiteralValue::Number(4_294_967_295.0))
        );
        assert_eq!(
            eval_expr(&bin(BinaryOp::LShift, num(1.0), num(33.0))),
            Some(LiteralValue::Number(2.0))
        );
    }

    #[test]
    fn test_as_index() {
        assert_eq!(LiteralValue::Number(3.0).as_index(), Some(3));
        assert_eq!(LiteralValue::Number(-1.0).as_index(), None);
        assert_eq!(LiteralValue::Number(2.5).as_index(), None);
        assert_eq!(LiteralValue::Str("3".to_string()).as_index(), None);
    }

    #[test]
    fn test_materialize_negative_number() {
        let expr = materialize(&LiteralValue::Number(-4.0)).unwrap();
        match expr {
            Expr::Unary(u) => {
                assert_eq!(u.op, UnaryOp::Minus);
                assert!(matches!(*u.arg, Expr::Lit(Lit::Num(ref n)) if n.value == 4.0));
            }
            other => panic!("expected unary minus, got {other:?}"),
        }
    }

    #[test]
    fn test_materialize_undefined_as_void_zero() {
        let expr = materialize(&LiteralValue::Undefined).unwrap();
        match expr {
            Expr::Unary(u) => assert_eq!(u.op, UnaryOp::Void),
            other => panic!("expected void 0, got {other:?}"),
        }
    }

    #[test]
    fn test_materialize_non_finite_refused() {
        assert_eq!(materialize(&LiteralValue::Number(f64::NAN)), None);
        assert_eq!(materialize(&LiteralValue::Number(f64::INFINITY)), None);
    }
}
