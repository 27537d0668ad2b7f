//! eval.rs - Tree-walking interpreter for rule expressions.
//!
//! Only the [`Expr`] variants are understood. There is no environment beyond the single
//! bound subject, so evaluation cannot reach anything outside the expression.
//!
//! License: MIT OR APACHE 2.0

use std::cmp::Ordering;

use crate::rules::ast::{BinaryOp, CompareOp, Expr, UnaryOp, Value};
use crate::rules::ExprError;

/// Evaluates `expr` with `value` bound to `subject`.
pub fn evaluate(expr: &Expr, subject: &Value) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Subject => Ok(subject.clone()),
        Expr::Unary { op, operand } => unary(*op, evaluate(operand, subject)?),
        Expr::Binary { op, left, right } => {
            let l = evaluate(left, subject)?;
            let r = evaluate(right, subject)?;
            binary(*op, l, r)
        }
        Expr::Compare { first, rest } => {
            let mut left = evaluate(first, subject)?;
            for (op, right_expr) in rest {
                let right = evaluate(right_expr, subject)?;
                if !compare(*op, &left, &right)? {
                    return Ok(Value::Bool(false));
                }
                left = right;
            }
            Ok(Value::Bool(true))
        }
    }
}

fn unary(op: UnaryOp, operand: Value) -> Result<Value, ExprError> {
    let Some(n) = operand.as_number() else {
        return Err(ExprError::BadOperand {
            op: match op {
                UnaryOp::Plus => "unary +",
                UnaryOp::Neg => "unary -",
            },
            operand: operand.describe(),
        });
    };
    Ok(Value::Number(match op {
        UnaryOp::Plus => n,
        UnaryOp::Neg => -n,
    }))
}

fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, ExprError> {
    if let (BinaryOp::Add, Value::Str(a), Value::Str(b)) = (op, &left, &right) {
        return Ok(Value::Str(format!("{}{}", a, b)));
    }

    let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
        return Err(ExprError::TypeMismatch {
            op: op.symbol(),
            left: left.describe(),
            right: right.describe(),
        });
    };

    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            a / b
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            // Result takes the sign of the divisor.
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) {
                r + b
            } else {
                r
            }
        }
        BinaryOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            let p = a.powf(b);
            if p.is_nan() && !a.is_nan() && !b.is_nan() {
                return Err(ExprError::NotReal(format!("{} ** {}", a, b)));
            }
            p
        }
    };
    Ok(Value::Number(result))
}

/// Compares two values.
///
/// Ordering needs two numbers (bools count as numbers) or two strings. Equality between
/// unrelated types is simply false.
pub fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, ExprError> {
    match op {
        CompareOp::Eq => Ok(values_equal(left, right)),
        CompareOp::Ne => Ok(!values_equal(left, right)),
        _ => {
            let ordering = match (left, right) {
                (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
                _ => match (left.as_number(), right.as_number()) {
                    (Some(a), Some(b)) => a.partial_cmp(&b),
                    _ => {
                        return Err(ExprError::TypeMismatch {
                            op: op.symbol(),
                            left: left.describe(),
                            right: right.describe(),
                        })
                    }
                },
            };
            // NaN compares false against everything.
            let Some(ordering) = ordering else {
                return Ok(false);
            };
            Ok(match op {
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Gt => ordering == Ordering::Greater,
                CompareOp::Le => ordering != Ordering::Greater,
                CompareOp::Ge => ordering != Ordering::Less,
                CompareOp::Eq => ordering == Ordering::Equal,
                CompareOp::Ne => ordering != Ordering::Equal,
            })
        }
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::None, Value::None) => true,
        (Value::None, _) | (_, Value::None) => false,
        (Value::Str(_), _) | (_, Value::Str(_)) => false,
        _ => left.as_number() == right.as_number(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::parser::parse_expression;

    fn eval(src: &str, subject: Value) -> Result<Value, ExprError> {
        evaluate(&parse_expression(src)?, &subject)
    }

    fn eval_num(src: &str) -> f64 {
        match eval(src, Value::None).unwrap() {
            Value::Number(n) => n,
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval_num("1 + 2 * 3"), 7.0);
        assert_eq!(eval_num("(1 + 2) * 3"), 9.0);
        assert_eq!(eval_num("7 / 2"), 3.5);
        assert_eq!(eval_num("-2 ** 2"), -4.0);
        assert_eq!(eval_num("2 ** -1"), 0.5);
        assert_eq!(eval_num("2 ** 3 ** 2"), 512.0);
        assert_eq!(eval_num("+-3"), -3.0);
    }

    #[test]
    fn test_modulo_follows_divisor_sign() {
        assert_eq!(eval_num("7 % 3"), 1.0);
        assert_eq!(eval_num("-7 % 3"), 2.0);
        assert_eq!(eval_num("7 % -3"), -2.0);
    }

    #[test]
    fn test_division_by_zero_is_an_error() {
        assert!(matches!(eval("1 / 0", Value::None), Err(ExprError::DivisionByZero)));
        assert!(matches!(eval("1 % 0", Value::None), Err(ExprError::DivisionByZero)));
        assert!(matches!(eval("0 ** -1", Value::None), Err(ExprError::DivisionByZero)));
    }

    #[test]
    fn test_negative_base_fractional_exponent() {
        assert!(matches!(eval("(-8) ** 0.5", Value::None), Err(ExprError::NotReal(_))));
    }

    #[test]
    fn test_subject_binding() {
        assert_eq!(
            eval("value * 2", Value::Number(21.0)).unwrap(),
            Value::Number(42.0)
        );
        assert_eq!(
            eval("value + '!'", Value::Str("go".into())).unwrap(),
            Value::Str("go!".into())
        );
    }

    #[test]
    fn test_chained_comparison_short_circuits() {
        assert_eq!(eval("1 < value < 3", Value::Number(2.0)).unwrap(), Value::Bool(true));
        assert_eq!(eval("1 < value < 3", Value::Number(3.0)).unwrap(), Value::Bool(false));
        // The failing first link stops evaluation before the division by zero.
        assert_eq!(
            eval("5 < value < 1 / 0", Value::Number(1.0)).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_bools_behave_as_numbers() {
        assert_eq!(eval("True + 1", Value::None).unwrap(), Value::Number(2.0));
        assert_eq!(eval("value == 1", Value::Bool(true)).unwrap(), Value::Bool(true));
        assert_eq!(eval("value > 0", Value::Bool(false)).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_ordering_across_types_is_a_type_mismatch() {
        let err = eval("value > 10", Value::Str("abc".into())).unwrap_err();
        assert!(matches!(err, ExprError::TypeMismatch { op: ">", .. }));
        assert!(err.to_string().contains("string 'abc'"));
        assert!(eval("None < 1", Value::None).is_err());
        assert!(eval("'a' - 'b'", Value::None).is_err());
        assert!(eval("-'a'", Value::None).is_err());
    }

    #[test]
    fn test_equality_across_types_is_false() {
        assert_eq!(eval("value == 10", Value::Str("10".into())).unwrap(), Value::Bool(false));
        assert_eq!(eval("value != 10", Value::Str("10".into())).unwrap(), Value::Bool(true));
        assert_eq!(eval("value == None", Value::None).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_string_ordering() {
        assert_eq!(eval("'abc' < 'abd'", Value::None).unwrap(), Value::Bool(true));
    }
}
