//! The `evaluate(expr, scope) -> value` operation (`spec.md` §4.5).
//!
//! Dispatch is structural on [`Expr`]; no expression variant is ever
//! mutated during evaluation. The evaluator owns nothing: it borrows the
//! AST (shared via `Rc`, so a lambda body outlives the top-level
//! expression that introduced it) and a [`Scope`] handle.

use log::trace;

use crate::error::Error;
use crate::expression::{Atom, Expr, OperatorKind};
use crate::position::Position;
use crate::scope::Scope;
use crate::value::{self, Value};

/// Evaluate one top-level (or nested) expression against `scope`.
pub fn evaluate(expr: &Expr, scope: &Scope) -> Result<Value, Error> {
    match expr {
        Expr::Atomic { atom, position } => evaluate_atomic(atom, scope, *position),
        Expr::Self_ { inner, position } => evaluate_self(inner, scope, *position),
        Expr::Define { name, value, .. } => evaluate_define(name, value, scope),
        Expr::Conditional {
            condition,
            then_branch,
            else_branch,
            ..
        } => evaluate_conditional(condition, then_branch, else_branch, scope),
        Expr::Lambda {
            parameters, body, ..
        } => Ok(make_lambda(parameters.clone(), body.clone(), scope.clone())),
        Expr::Operator {
            kind,
            operands,
            position,
        } => evaluate_operator(*kind, operands, scope, *position),
        Expr::Call {
            callee,
            arguments,
            position,
        } => evaluate_call(callee, arguments, scope, *position),
    }
}

fn evaluate_atomic(atom: &Atom, scope: &Scope, position: Position) -> Result<Value, Error> {
    let value = match atom {
        Atom::Numeric(n) => Value::Numeric(*n),
        Atom::Text(s) => Value::Text(s.clone()),
        Atom::Boolean(b) => Value::Boolean(*b),
        Atom::Reference(name) => return scope.get(name, position),
    };
    Ok(value)
}

fn evaluate_self(inner: &Expr, scope: &Scope, position: Position) -> Result<Value, Error> {
    let value = evaluate(inner, scope)?;
    if matches!(value, Value::Function(_)) {
        value.call(Vec::new(), position)
    } else {
        Ok(value)
    }
}

fn evaluate_define(name: &str, value_expr: &Expr, scope: &Scope) -> Result<Value, Error> {
    let value = evaluate(value_expr, scope)?;
    trace!("define '{name}' = {value:?}");
    Ok(scope.set(name, value))
}

fn evaluate_conditional(
    condition: &Expr,
    then_branch: &Expr,
    else_branch: &Expr,
    scope: &Scope,
) -> Result<Value, Error> {
    let condition = evaluate(condition, scope)?;
    if condition.truthy() {
        evaluate(then_branch, scope)
    } else {
        evaluate(else_branch, scope)
    }
}

/// Build the function value a [`Expr::Lambda`] evaluates to. The closure
/// holds `scope` by (reference-counted) identity, not a snapshot — see
/// `spec.md` §9 and [`crate::scope::Scope`]'s doc comment.
fn make_lambda(parameters: Vec<String>, body: std::rc::Rc<Expr>, scope: Scope) -> Value {
    Value::function(move |arguments, position| {
        if arguments.len() != parameters.len() {
            return Err(Error::not_implemented(
                format!(
                    "lambda expects {} argument(s), got {}",
                    parameters.len(),
                    arguments.len()
                ),
                position,
            ));
        }

        scope.push();
        for (name, value) in parameters.iter().zip(arguments.into_iter()) {
            scope.set(name, value);
        }
        let result = evaluate(&body, &scope);
        scope.pop();
        result
    })
}

fn evaluate_operator(
    kind: OperatorKind,
    operands: &[Expr],
    scope: &Scope,
    position: Position,
) -> Result<Value, Error> {
    if kind.is_unary() {
        let operand = evaluate(&operands[0], scope)?;
        return Ok(value::apply_not(operand));
    }

    let mut values = operands.iter().map(|e| evaluate(e, scope));
    let mut accumulator = values.next().expect("operator has at least one operand")?;
    for next in values {
        accumulator = value::apply(kind, accumulator, next?, position)?;
    }
    Ok(accumulator)
}

fn evaluate_call(
    callee: &Expr,
    arguments: &[Expr],
    scope: &Scope,
    position: Position,
) -> Result<Value, Error> {
    let callee_value = evaluate(callee, scope)?;
    if !matches!(callee_value, Value::Function(_)) {
        return Err(Error::invalid_expression(
            format!(
                "expected a function at the start of a function call, found {}",
                callee_value.kind_name()
            ),
            position,
        ));
    }

    let mut values = Vec::with_capacity(arguments.len());
    for argument in arguments {
        values.push(evaluate(argument, scope)?);
    }

    callee_value.call(values, position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockStream;
    use crate::expression::ExpressionStream;
    use crate::lexer::LexStream;
    use crate::scope::Scope;

    fn run_all(source: &str, scope: &Scope) -> Result<Vec<Value>, Error> {
        let lex = LexStream::new(source, "<test>");
        let blocks = BlockStream::new(lex.tokens()?);
        let exprs = ExpressionStream::new(blocks);
        exprs
            .map(|expr| evaluate(&expr?, scope))
            .collect::<Result<Vec<_>, _>>()
    }

    #[test]
    fn evaluates_arithmetic() {
        let scope = Scope::new();
        let values = run_all("(+ 1 2)", &scope).unwrap();
        assert!(matches!(values[0], Value::Numeric(n) if n == 3.0));
    }

    #[test]
    fn define_then_reference() {
        let scope = Scope::new();
        let values = run_all("(define x 5) x", &scope).unwrap();
        assert!(matches!(values[0], Value::Numeric(n) if n == 5.0));
        assert!(matches!(values[1], Value::Numeric(n) if n == 5.0));
    }

    #[test]
    fn recursive_factorial() {
        let scope = Scope::new();
        let values = run_all(
            "(define fact (lambda (n) (if (<= n 1) 1 (* n (fact (- n 1)))))) (fact 5)",
            &scope,
        )
        .unwrap();
        assert!(matches!(values[1], Value::Numeric(n) if n == 120.0));
    }

    #[test]
    fn identity_lambda_returns_argument_unchanged() {
        let scope = Scope::new();
        let values = run_all("(define id (lambda (x) x)) (id 42)", &scope).unwrap();
        assert!(matches!(values[1], Value::Numeric(n) if n == 42.0));
    }

    #[test]
    fn conditional_only_evaluates_taken_branch() {
        let scope = Scope::new();
        run_all(
            "(define flag false) \
             (if true (define flag true) (define flag \"should not run\"))",
            &scope,
        )
        .unwrap();
        assert!(matches!(
            scope.get("flag", Position::START).unwrap(),
            Value::Boolean(true)
        ));
    }

    #[test]
    fn conditional_else_branch() {
        let scope = Scope::new();
        run_all(
            "(define flag true) \
             (if false (define flag \"should not run\") (define flag false))",
            &scope,
        )
        .unwrap();
        assert!(matches!(
            scope.get("flag", Position::START).unwrap(),
            Value::Boolean(false)
        ));
    }

    #[test]
    fn binary_operator_with_one_operand_returns_it_unchanged() {
        let scope = Scope::new();
        let values = run_all("(+ 7)", &scope).unwrap();
        assert!(matches!(values[0], Value::Numeric(n) if n == 7.0));
    }

    #[test]
    fn undefined_reference_is_invalid_state() {
        let scope = Scope::new();
        let err = run_all("(foo)", &scope).unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
    }

    #[test]
    fn calling_a_non_function_is_invalid_expression() {
        let scope = Scope::new();
        let err = run_all("(define x 5) (x 1)", &scope).unwrap_err();
        assert!(matches!(err, Error::InvalidExpression { .. }));
    }

    #[test]
    fn lambda_arity_mismatch_is_not_implemented() {
        let scope = Scope::new();
        let err = run_all("(define f (lambda (a b) a)) (f 1)", &scope).unwrap_err();
        assert!(matches!(err, Error::NotImplemented { .. }));
    }

    #[test]
    fn string_concatenation_via_greet() {
        let scope = Scope::new();
        let values = run_all(
            "(define greet (lambda (who) (+ \"hi \" who))) (greet \"world\")",
            &scope,
        )
        .unwrap();
        assert!(matches!(&values[1], Value::Text(s) if s == "hi world"));
    }

    #[test]
    fn lambda_sees_mutations_between_definition_and_call() {
        // spec.md §9: closures capture scope by reference identity.
        let scope = Scope::new();
        let values = run_all(
            "(define x 1) (define f (lambda () x)) (define x 2) (f)",
            &scope,
        )
        .unwrap();
        assert!(matches!(values[3], Value::Numeric(n) if n == 2.0));
    }
}
