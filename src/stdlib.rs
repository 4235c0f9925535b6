//! The pre-registered standard library (`spec.md` §6), grounded in
//! `utility/standardlibrary.cpp` of the original source: `print` and
//! `println` concatenate the string-coercion of every argument and
//! return that concatenation as a value, in addition to the side effect
//! of writing it to stdout. `readline`/`readnumeric` are this core's
//! only blocking I/O points besides the initial file read (`spec.md`
//! §5).

use std::io::{self, BufRead, Write};

use crate::error::Error;
use crate::position::Position;
use crate::scope::Scope;
use crate::value::Value;

fn reject_arguments(name: &str, arguments: &[Value], position: Position) -> Result<(), Error> {
    if arguments.is_empty() {
        Ok(())
    } else {
        Err(Error::not_implemented(
            format!("'{name}' takes no arguments, got {}", arguments.len()),
            position,
        ))
    }
}

fn print(arguments: Vec<Value>, _position: Position) -> Result<Value, Error> {
    let output: String = arguments.iter().map(Value::stringify).collect();
    print!("{output}");
    io::stdout().flush().ok();
    Ok(Value::Text(output))
}

fn println(arguments: Vec<Value>, _position: Position) -> Result<Value, Error> {
    // spec.md §8 scenario 2: the written side effect gets a trailing
    // newline, but the returned value is the bare concatenation (the
    // original C++ folds the newline into the return value too; this
    // implementation follows the distilled spec's concrete scenario
    // instead, see DESIGN.md).
    let output: String = arguments.iter().map(Value::stringify).collect();
    println!("{output}");
    Ok(Value::Text(output))
}

fn readline(arguments: Vec<Value>, position: Position) -> Result<Value, Error> {
    reject_arguments("readline", &arguments, position)?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| Error::Io {
            message: format!("failed to read a line from stdin: {e}"),
        })?;
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Value::Text(line))
}

/// Read lines from stdin until one is a valid numeric lexeme, per the
/// same `{digits}(.{digits})?` rule the lexer uses (`spec.md` §4.1).
fn readnumeric(arguments: Vec<Value>, position: Position) -> Result<Value, Error> {
    reject_arguments("readnumeric", &arguments, position)?;
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|e| Error::Io {
            message: format!("failed to read a line from stdin: {e}"),
        })?;
        let candidate = line.trim();
        if is_numeric_lexeme(candidate) {
            return Ok(Value::Numeric(candidate.parse().expect(
                "is_numeric_lexeme guarantees this parses",
            )));
        }
    }
    Err(Error::Io {
        message: "reached end of input while waiting for a numeric value".into(),
    })
}

fn is_numeric_lexeme(text: &str) -> bool {
    !text.is_empty()
        && text.starts_with(|c: char| c.is_ascii_digit())
        && text.chars().all(|c| c.is_ascii_digit() || c == '.')
        && text.chars().filter(|&c| c == '.').count() <= 1
}

/// Populate `scope`'s global frame with the standard library, before any
/// expression is evaluated (`spec.md` §4.4).
pub fn register(scope: &Scope) {
    scope.set("print", Value::function(print));
    scope.set("println", Value::function(println));
    scope.set("readline", Value::function(readline));
    scope.set("readnumeric", Value::function(readnumeric));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_concatenates_and_returns_string() {
        let result = print(
            vec![Value::Numeric(5.0), Value::Text(" apples".into())],
            Position::START,
        )
        .unwrap();
        assert!(matches!(result, Value::Text(s) if s == "5 apples"));
    }

    #[test]
    fn println_return_value_has_no_trailing_newline() {
        let result = println(vec![Value::Text("hi".into())], Position::START).unwrap();
        assert!(matches!(result, Value::Text(s) if s == "hi"));
    }

    #[test]
    fn readline_rejects_arguments() {
        let err = readline(vec![Value::Numeric(1.0)], Position::START).unwrap_err();
        assert!(matches!(err, Error::NotImplemented { .. }));
    }

    #[test]
    fn recognizes_numeric_lexemes() {
        assert!(is_numeric_lexeme("42"));
        assert!(is_numeric_lexeme("3.14"));
        assert!(!is_numeric_lexeme("3.1.4"));
        assert!(!is_numeric_lexeme("abc"));
        assert!(!is_numeric_lexeme(""));
    }

    #[test]
    fn register_populates_global_scope() {
        let scope = Scope::new();
        register(&scope);
        assert!(matches!(
            scope.get("print", Position::START).unwrap(),
            Value::Function(_)
        ));
        assert!(matches!(
            scope.get("readnumeric", Position::START).unwrap(),
            Value::Function(_)
        ));
    }
}
