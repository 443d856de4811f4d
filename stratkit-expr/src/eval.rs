use crate::ast::{BinaryOp, Expr, UnaryOp};
use smol_str::SmolStr;
use std::collections::HashMap;
use thiserror::Error;

/// A runtime value produced by [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
}

impl Value {
    fn as_number(self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n),
            Value::Boolean(_) => None,
        }
    }

    fn as_boolean(self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(b),
            Value::Number(_) => None,
        }
    }
}

/// Raised only when a type-checked expression references an identifier
/// missing from the value environment. Per `spec.md` §4.1 this indicates a
/// compiler bug, never a user error — type-checking guarantees every free
/// identifier is resolvable before evaluation is ever attempted.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("identifier '{0}' missing from evaluation environment")]
pub struct EvalError(pub SmolStr);

/// Evaluate `expr` against `values` using IEEE-754 double arithmetic.
///
/// Division by zero follows IEEE semantics (`+inf`/`-inf`/`NaN`); any
/// comparison involving `NaN` evaluates to `false`; `&&`/`||` short-circuit.
pub fn evaluate(expr: &Expr, values: &HashMap<SmolStr, Value>) -> Result<Value, EvalError> {
    match expr {
        Expr::NumberLit(n) => Ok(Value::Number(*n)),
        Expr::BoolLit(b) => Ok(Value::Boolean(*b)),
        Expr::Ident(name) => values.get(name).copied().ok_or_else(|| EvalError(name.clone())),
        Expr::Unary { op, expr } => {
            let inner = evaluate(expr, values)?;
            match op {
                UnaryOp::Neg => Ok(Value::Number(-inner.as_number().expect("type-checked"))),
                UnaryOp::Not => Ok(Value::Boolean(!inner.as_boolean().expect("type-checked"))),
            }
        }
        Expr::Binary { op, lhs, rhs } => eval_binary(*op, lhs, rhs, values),
    }
}

fn eval_binary(
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    values: &HashMap<SmolStr, Value>,
) -> Result<Value, EvalError> {
    // Short-circuit && and || before evaluating the right-hand side.
    match op {
        BinaryOp::And => {
            let l = evaluate(lhs, values)?.as_boolean().expect("type-checked");
            if !l {
                return Ok(Value::Boolean(false));
            }
            let r = evaluate(rhs, values)?.as_boolean().expect("type-checked");
            return Ok(Value::Boolean(r));
        }
        BinaryOp::Or => {
            let l = evaluate(lhs, values)?.as_boolean().expect("type-checked");
            if l {
                return Ok(Value::Boolean(true));
            }
            let r = evaluate(rhs, values)?.as_boolean().expect("type-checked");
            return Ok(Value::Boolean(r));
        }
        _ => {}
    }

    let l = evaluate(lhs, values)?;
    let r = evaluate(rhs, values)?;

    match op {
        BinaryOp::Add => Ok(Value::Number(num(l) + num(r))),
        BinaryOp::Sub => Ok(Value::Number(num(l) - num(r))),
        BinaryOp::Mul => Ok(Value::Number(num(l) * num(r))),
        BinaryOp::Div => Ok(Value::Number(num(l) / num(r))),
        BinaryOp::Lt => Ok(Value::Boolean(compare(l, r, |a, b| a < b))),
        BinaryOp::Le => Ok(Value::Boolean(compare(l, r, |a, b| a <= b))),
        BinaryOp::Gt => Ok(Value::Boolean(compare(l, r, |a, b| a > b))),
        BinaryOp::Ge => Ok(Value::Boolean(compare(l, r, |a, b| a >= b))),
        BinaryOp::Eq => Ok(Value::Boolean(value_eq(l, r))),
        BinaryOp::Ne => Ok(Value::Boolean(!value_eq(l, r))),
        BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

fn num(v: Value) -> f64 {
    v.as_number().expect("type-checked")
}

/// Numeric comparisons follow IEEE ordering: any comparison touching `NaN`
/// is `false`, which is exactly what the `f64` operator already does, so we
/// rely on it directly rather than special-casing `NaN`.
fn compare(l: Value, r: Value, op: impl Fn(f64, f64) -> bool) -> bool {
    op(num(l), num(r))
}

fn value_eq(l: Value, r: Value) -> bool {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        _ => unreachable!("type-checked: comparison operands share a type"),
    }
}
