use crate::ast::{BinaryOp, Expr, UnaryOp};
use smol_str::SmolStr;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// The two value types in the expression language.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Type {
    Number,
    Boolean,
}

/// Error raised while type-checking an [`Expr`] against a feature-type map.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    #[error("unknown feature '{0}'")]
    UnknownFeature(SmolStr),
    #[error("type mismatch: expected {expected:?}, found {found:?} in '{context}'")]
    TypeMismatch {
        expected: Type,
        found: Type,
        context: String,
    },
    #[error("comparison operands have different types: {lhs:?} vs {rhs:?}")]
    ComparisonTypeMismatch { lhs: Type, rhs: Type },
}

/// Walk `expr` bottom-up, resolving identifiers against `feature_types`.
pub fn type_check(
    expr: &Expr,
    feature_types: &HashMap<SmolStr, Type>,
) -> Result<Type, TypeError> {
    match expr {
        Expr::NumberLit(_) => Ok(Type::Number),
        Expr::BoolLit(_) => Ok(Type::Boolean),
        Expr::Ident(name) => feature_types
            .get(name)
            .copied()
            .ok_or_else(|| TypeError::UnknownFeature(name.clone())),
        Expr::Unary { op, expr } => {
            let inner = type_check(expr, feature_types)?;
            match op {
                UnaryOp::Neg => expect(inner, Type::Number, "unary '-'"),
                UnaryOp::Not => expect(inner, Type::Boolean, "unary '!'"),
            }
        }
        Expr::Binary { op, lhs, rhs } => {
            let lhs_ty = type_check(lhs, feature_types)?;
            let rhs_ty = type_check(rhs, feature_types)?;
            match op {
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                    expect(lhs_ty, Type::Number, "arithmetic operand")?;
                    expect(rhs_ty, Type::Number, "arithmetic operand")?;
                    Ok(Type::Number)
                }
                BinaryOp::And | BinaryOp::Or => {
                    expect(lhs_ty, Type::Boolean, "logical operand")?;
                    expect(rhs_ty, Type::Boolean, "logical operand")?;
                    Ok(Type::Boolean)
                }
                BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge
                | BinaryOp::Eq
                | BinaryOp::Ne => {
                    if lhs_ty != rhs_ty {
                        return Err(TypeError::ComparisonTypeMismatch {
                            lhs: lhs_ty,
                            rhs: rhs_ty,
                        });
                    }
                    Ok(Type::Boolean)
                }
            }
        }
    }
}

fn expect(found: Type, expected: Type, context: &str) -> Result<Type, TypeError> {
    if found == expected {
        Ok(found)
    } else {
        Err(TypeError::TypeMismatch {
            expected,
            found,
            context: context.to_string(),
        })
    }
}

/// Collect every identifier referenced anywhere in `expr`.
pub fn free_identifiers(expr: &Expr) -> HashSet<SmolStr> {
    let mut out = HashSet::new();
    collect_identifiers(expr, &mut out);
    out
}

fn collect_identifiers(expr: &Expr, out: &mut HashSet<SmolStr>) {
    match expr {
        Expr::NumberLit(_) | Expr::BoolLit(_) => {}
        Expr::Ident(name) => {
            out.insert(name.clone());
        }
        Expr::Unary { expr, .. } => collect_identifiers(expr, out),
        Expr::Binary { lhs, rhs, .. } => {
            collect_identifiers(lhs, out);
            collect_identifiers(rhs, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn types(pairs: &[(&str, Type)]) -> HashMap<SmolStr, Type> {
        pairs.iter().map(|(k, v)| ((*k).into(), *v)).collect()
    }

    #[test]
    fn arithmetic_requires_numbers() {
        let expr = parse("close + 1").unwrap();
        let ty = type_check(&expr, &types(&[("close", Type::Number)])).unwrap();
        assert_eq!(ty, Type::Number);
    }

    #[test]
    fn unknown_identifier_is_rejected() {
        let expr = parse("phantom > 1").unwrap();
        let err = type_check(&expr, &HashMap::new()).unwrap_err();
        assert_eq!(err, TypeError::UnknownFeature("phantom".into()));
    }

    #[test]
    fn comparison_requires_same_types() {
        let expr = parse("close > is_up").unwrap();
        let err = type_check(
            &expr,
            &types(&[("close", Type::Number), ("is_up", Type::Boolean)]),
        )
        .unwrap_err();
        assert!(matches!(err, TypeError::ComparisonTypeMismatch { .. }));
    }

    #[test]
    fn logical_operators_require_booleans() {
        let expr = parse("a && b").unwrap();
        let err = type_check(
            &expr,
            &types(&[("a", Type::Boolean), ("b", Type::Number)]),
        )
        .unwrap_err();
        assert!(matches!(err, TypeError::TypeMismatch { .. }));
    }
}
