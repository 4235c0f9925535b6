//! The per-operator, per-kind-pair dispatch table from `spec.md` §4.4,
//! grounded in the original `NumericValue`/`StringValue`/`BooleanValue`/
//! `FunctionValue` operator overloads: each kind pair is a pattern-matched
//! arm instead of a virtual dispatch table, per `spec.md` §9.

use crate::error::Error;
use crate::expression::OperatorKind;
use crate::position::Position;
use crate::value::Value;

/// Apply a binary or unary operator to already-evaluated operand(s).
/// `operands` holds one value for [`OperatorKind::Not`] and exactly two
/// for everything else — the evaluator folds longer argument lists down
/// to repeated binary applications (`spec.md` §4.5).
pub fn apply(kind: OperatorKind, left: Value, right: Value, position: Position) -> Result<Value, Error> {
    use OperatorKind::*;

    // The "lift" rule (spec.md §4.4 glossary): an operator applied where
    // either side is a function yields a new function that applies the
    // inner function(s) first, then the operator, once actually called.
    // Both-function is its own case: the original combines the *results*
    // of calling each side with the same argument list, rather than
    // lifting twice.
    match (&left, &right) {
        (Value::Function(_), Value::Function(_)) => return Ok(lift_both(kind, left, right)),
        (Value::Function(_), _) => return Ok(lift_left(kind, left, right)),
        (_, Value::Function(_)) => return Ok(lift_right(kind, left, right)),
        _ => {}
    }

    match kind {
        Add => add(left, right, position),
        Subtract => subtract(left, right, position),
        Multiply => multiply(left, right, position),
        Divide => divide(left, right, position),
        Less => compare(left, right, position, |o| o == std::cmp::Ordering::Less, "<"),
        LessOrEqual => compare(left, right, position, |o| o != std::cmp::Ordering::Greater, "<="),
        Greater => compare(left, right, position, |o| o == std::cmp::Ordering::Greater, ">"),
        GreaterOrEqual => compare(left, right, position, |o| o != std::cmp::Ordering::Less, ">="),
        And => Ok(Value::Boolean(left.truthy() && right.truthy())),
        Or => Ok(Value::Boolean(left.truthy() || right.truthy())),
        Not => unreachable!("Not is unary and handled by the caller before reaching apply"),
    }
}

pub fn apply_not(operand: Value) -> Value {
    if let Value::Function(_) = &operand {
        let inner = operand.clone();
        return Value::function(move |arguments, position| {
            let result = inner.call(arguments, position)?;
            Ok(Value::Boolean(!result.truthy()))
        });
    }
    Value::Boolean(!operand.truthy())
}

fn lift_left(kind: OperatorKind, left: Value, right: Value) -> Value {
    Value::function(move |arguments, position| {
        let left_result = left.call(arguments, position)?;
        apply(kind, left_result, right.clone(), position)
    })
}

fn lift_right(kind: OperatorKind, left: Value, right: Value) -> Value {
    Value::function(move |arguments, position| {
        let right_result = right.call(arguments, position)?;
        apply(kind, left.clone(), right_result, position)
    })
}

fn lift_both(kind: OperatorKind, left: Value, right: Value) -> Value {
    Value::function(move |arguments, position| {
        let left_result = left.call(arguments.clone(), position)?;
        let right_result = right.call(arguments, position)?;
        apply(kind, left_result, right_result, position)
    })
}

fn not_implemented(message: impl Into<String>, position: Position) -> Error {
    Error::not_implemented(message, position)
}

fn add(left: Value, right: Value, position: Position) -> Result<Value, Error> {
    match (&left, &right) {
        (Value::Numeric(a), Value::Numeric(b)) => Ok(Value::Numeric(a + b)),
        (Value::Numeric(_), Value::Text(_)) | (Value::Text(_), _) => {
            Ok(Value::Text(left.stringify() + &right.stringify()))
        }
        (Value::Numeric(a), Value::Boolean(b)) => {
            Ok(Value::Boolean((*a != 0.0) ^ *b))
        }
        (Value::Boolean(a), Value::Numeric(b)) => {
            Ok(Value::Boolean(*a ^ (*b != 0.0)))
        }
        (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a ^ b)),
        _ => Err(not_implemented(
            format!("unable to add {} and {}", left.kind_name(), right.kind_name()),
            position,
        )),
    }
}

fn subtract(left: Value, right: Value, position: Position) -> Result<Value, Error> {
    match (&left, &right) {
        (Value::Numeric(a), Value::Numeric(b)) => Ok(Value::Numeric(a - b)),
        (Value::Numeric(a), Value::Boolean(b)) => {
            let base = *a != 0.0;
            Ok(Value::Boolean(if *b { !base } else { base }))
        }
        (Value::Boolean(a), Value::Numeric(b)) => {
            Ok(Value::Boolean(if *b != 0.0 { !*a } else { *a }))
        }
        (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(if *b { !*a } else { *a })),
        _ => Err(not_implemented(
            format!(
                "unable to subtract {} from {}",
                right.kind_name(),
                left.kind_name()
            ),
            position,
        )),
    }
}

fn multiply(left: Value, right: Value, position: Position) -> Result<Value, Error> {
    match (&left, &right) {
        (Value::Numeric(a), Value::Numeric(b)) => Ok(Value::Numeric(a * b)),
        (Value::Numeric(n), Value::Text(s)) | (Value::Text(s), Value::Numeric(n)) => {
            let count = n.trunc() as i64;
            let repeated = s.repeat(count.unsigned_abs() as usize);
            let repeated = if count < 0 {
                repeated.chars().rev().collect()
            } else {
                repeated
            };
            Ok(Value::Text(repeated))
        }
        (Value::Numeric(a), Value::Boolean(b)) => {
            Ok(Value::Numeric(if *b { *a } else { 0.0 }))
        }
        (Value::Boolean(a), Value::Numeric(b)) => {
            Ok(Value::Numeric(if *a { *b } else { 0.0 }))
        }
        (Value::Boolean(a), Value::Text(s)) | (Value::Text(s), Value::Boolean(a)) => {
            Ok(Value::Text(if *a { s.clone() } else { String::new() }))
        }
        (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(*a && *b)),
        _ => Err(not_implemented(
            format!(
                "unable to multiply {} by {}",
                left.kind_name(),
                right.kind_name()
            ),
            position,
        )),
    }
}

fn divide(left: Value, right: Value, position: Position) -> Result<Value, Error> {
    match (&left, &right) {
        (Value::Numeric(a), Value::Numeric(b)) => Ok(Value::Numeric(a / b)),
        _ => Err(not_implemented(
            format!(
                "unable to divide {} by {}",
                left.kind_name(),
                right.kind_name()
            ),
            position,
        )),
    }
}

fn compare(
    left: Value,
    right: Value,
    position: Position,
    accept: impl Fn(std::cmp::Ordering) -> bool,
    symbol: &str,
) -> Result<Value, Error> {
    match (&left, &right) {
        (Value::Numeric(a), Value::Numeric(b)) => match a.partial_cmp(b) {
            Some(order) => Ok(Value::Boolean(accept(order))),
            None => Ok(Value::Boolean(false)), // NaN comparisons: IEEE semantics, never true
        },
        (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(accept(a.cmp(b)))),
        (Value::Numeric(_), Value::Boolean(_)) | (Value::Boolean(_), Value::Numeric(_)) => {
            Ok(Value::Boolean(accept(left.truthy().cmp(&right.truthy()))))
        }
        _ => Err(not_implemented(
            format!(
                "unable to compare {} {} {}",
                left.kind_name(),
                symbol,
                right.kind_name()
            ),
            position,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::START
    }

    #[test]
    fn numeric_addition() {
        let result = apply(OperatorKind::Add, Value::Numeric(1.0), Value::Numeric(2.0), pos()).unwrap();
        assert!(matches!(result, Value::Numeric(n) if n == 3.0));
    }

    #[test]
    fn numeric_plus_string_concatenates() {
        let result = apply(
            OperatorKind::Add,
            Value::Numeric(5.0),
            Value::Text("!".into()),
            pos(),
        )
        .unwrap();
        assert!(matches!(result, Value::Text(s) if s == "5!"));
    }

    #[test]
    fn string_times_negative_number_reverses() {
        let result = apply(
            OperatorKind::Multiply,
            Value::Numeric(-2.0),
            Value::Text("ab".into()),
            pos(),
        )
        .unwrap();
        assert!(matches!(result, Value::Text(s) if s == "baba"));
    }

    #[test]
    fn string_minus_string_is_not_implemented() {
        let err = apply(
            OperatorKind::Subtract,
            Value::Text("a".into()),
            Value::Text("b".into()),
            pos(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotImplemented { .. }));
    }

    #[test]
    fn division_by_zero_is_ieee_not_error() {
        let result = apply(OperatorKind::Divide, Value::Numeric(1.0), Value::Numeric(0.0), pos()).unwrap();
        assert!(matches!(result, Value::Numeric(n) if n.is_infinite()));
    }

    #[test]
    fn numeric_compared_against_boolean_uses_truthy_coercion() {
        // spec.md §4.4 cmp row: num x bool -> bool-of-self cmp bool-of-other.
        let result = apply(OperatorKind::Less, Value::Numeric(1.0), Value::Boolean(true), pos()).unwrap();
        assert!(matches!(result, Value::Boolean(false))); // true.cmp(true) is not Less

        let result = apply(OperatorKind::Less, Value::Numeric(0.0), Value::Boolean(true), pos()).unwrap();
        assert!(matches!(result, Value::Boolean(true))); // false.cmp(true) is Less
    }

    #[test]
    fn lifting_a_function_produces_a_new_function() {
        let inner = Value::function(|_, _| Ok(Value::Numeric(10.0)));
        let lifted = apply(OperatorKind::Add, inner, Value::Numeric(5.0), pos()).unwrap();
        let result = lifted.call(vec![], pos()).unwrap();
        assert!(matches!(result, Value::Numeric(n) if n == 15.0));
    }

    #[test]
    fn not_negates_boolean_coercion() {
        let result = apply_not(Value::Numeric(0.0));
        assert!(matches!(result, Value::Boolean(true)));
    }
}
