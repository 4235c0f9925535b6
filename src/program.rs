//! Pipeline glue: wires `LexStream -> BlockStream -> ExpressionStream ->
//! evaluate` together for one source file, the way the teacher's
//! `Interpreter::from_ast` / `run` (`src/interpreter/mod.rs`) and
//! `src/bin/why.rs`'s driver wire parser, type checker, and compiler.

use crate::block::BlockStream;
use crate::error::Error;
use crate::evaluator;
use crate::expression::ExpressionStream;
use crate::lexer::LexStream;
use crate::scope::Scope;
use crate::stdlib;
use crate::value::Value;

/// One interpreter run: a [`Scope`] (global frame pre-populated with the
/// standard library) plus the pipeline needed to evaluate source text
/// against it.
pub struct Program {
    scope: Scope,
}

impl Program {
    /// A fresh program with a new global scope, standard library already
    /// registered (`spec.md` §4.4: "the standard-library registration
    /// step happens before evaluation begins").
    pub fn new() -> Self {
        let scope = Scope::new();
        stdlib::register(&scope);
        Program { scope }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Evaluate every top-level expression in `source` in source order,
    /// against this program's scope, and return the value each one
    /// produced. Propagates the first error encountered unchanged
    /// (`spec.md` §7: no recovery inside the core).
    pub fn run_source(&self, source: &str, file_name: &str) -> Result<Vec<Value>, Error> {
        let lex = LexStream::new(source, file_name);
        let blocks = BlockStream::new(lex.tokens()?);
        let expressions = ExpressionStream::new(blocks);

        let mut values = Vec::new();
        for expression in expressions {
            values.push(evaluator::evaluate(&expression?, &self.scope)?);
        }
        Ok(values)
    }
}

impl Default for Program {
    fn default() -> Self {
        Program::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_define_then_println() {
        let program = Program::new();
        let values = program
            .run_source("(define x 5) (println x)", "<test>")
            .unwrap();
        assert!(matches!(values[0], Value::Numeric(n) if n == 5.0));
        assert!(matches!(&values[1], Value::Text(s) if s == "5"));
    }

    #[test]
    fn scenario_addition() {
        let program = Program::new();
        let values = program.run_source("(+ 1 2)", "<test>").unwrap();
        assert_eq!(values.len(), 1);
        assert!(matches!(values[0], Value::Numeric(n) if n == 3.0));
    }

    #[test]
    fn scenario_undefined_reference() {
        let program = Program::new();
        let err = program.run_source("(foo)", "<test>").unwrap_err();
        assert_eq!(err.kind(), "invalid_state");
        assert!(err.message().contains("foo"));
    }

    #[test]
    fn scenario_unclosed_block() {
        let program = Program::new();
        let err = program.run_source("(+ 1", "<test>").unwrap_err();
        assert_eq!(err.kind(), "invalid_block");
    }

    #[test]
    fn empty_source_yields_no_values() {
        let program = Program::new();
        let values = program.run_source("", "<test>").unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn reuses_scope_across_multiple_run_source_calls() {
        let program = Program::new();
        program.run_source("(define x 7)", "<test>").unwrap();
        let values = program.run_source("(+ x 1)", "<test>").unwrap();
        assert!(matches!(values[0], Value::Numeric(n) if n == 8.0));
    }
}
