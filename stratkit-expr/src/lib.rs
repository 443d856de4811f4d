#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    missing_debug_implementations,
    rust_2018_idioms
)]

//! The expression layer: a small recursive-descent parser, a bottom-up
//! type-checker and an IEEE-754 evaluator for the guard-expression language
//! described by `spec.md` §4.1.
//!
//! ```text
//! expr    := or
//! or      := and ('||' and)*
//! and     := cmp ('&&' cmp)*
//! cmp     := add (('<'|'<='|'>'|'>='|'=='|'!=') add)?
//! add     := mul (('+'|'-') mul)*
//! mul     := unary (('*'|'/') unary)*
//! unary   := ('-'|'!')? primary
//! primary := number | bool | ident | '(' expr ')'
//! ```

mod ast;
mod eval;
mod lexer;
mod parser;
mod types;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use eval::{evaluate, EvalError, Value};
pub use parser::{parse, ParseError};
pub use types::{free_identifiers, type_check, Type, TypeError};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn end_to_end_boolean_guard() {
        let expr = parse("close > ema20 && rsi < 70").unwrap();

        let mut types = HashMap::new();
        types.insert("close".into(), Type::Number);
        types.insert("ema20".into(), Type::Number);
        types.insert("rsi".into(), Type::Number);
        assert_eq!(type_check(&expr, &types).unwrap(), Type::Boolean);

        let mut values = HashMap::new();
        values.insert("close".into(), Value::Number(105.0));
        values.insert("ema20".into(), Value::Number(100.0));
        values.insert("rsi".into(), Value::Number(55.0));
        assert_eq!(evaluate(&expr, &values).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn free_identifiers_collects_all_names() {
        let expr = parse("(a + b) * c > d").unwrap();
        let idents = free_identifiers(&expr);
        let expected: std::collections::HashSet<smol_str::SmolStr> =
            ["a", "b", "c", "d"].iter().map(|s| (*s).into()).collect();
        assert_eq!(idents, expected);
    }
}
