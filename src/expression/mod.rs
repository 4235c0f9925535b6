//! Block tree sequence → expression (AST) sequence.
//!
//! Grammar (dispatched on block size, then on the first item of a block):
//!
//! - a size-1 block `(<expr>)` — a [`Expr::Self_`] expression: evaluates
//!   its one child, and if that is a function, calls it with no
//!   arguments, otherwise yields the value unchanged. This is how a
//!   zero-argument call like `(foo)` is spelled.
//! - `(define <reference> <expr>)`
//! - `(lambda (<reference>...) <expr>)`
//! - `(if <expr> <expr> <expr>)`
//! - `(<operator> <expr> <expr>...)` — `!` takes exactly one operand
//! - `(<expr> <expr>...)` — function call, at least one argument
//! - a bare token: a literal or a reference
//!
//! `()` is a syntactically valid empty [`crate::block::Block`] but never a
//! valid expression — every alternative above requires at least one item.

mod operator;

pub use operator::OperatorKind;

use std::rc::Rc;

use log::trace;

use crate::block::{Block, Item};
use crate::error::Error;
use crate::lexer::TokenKind;
use crate::position::Position;

/// A literal or reference leaf, the base case of [`Expr`].
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Numeric(f64),
    Text(String),
    Boolean(bool),
    Reference(String),
}

/// The AST produced from one top-level block.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Atomic {
        atom: Atom,
        position: Position,
    },
    Define {
        name: String,
        value: Rc<Expr>,
        position: Position,
    },
    Lambda {
        parameters: Vec<String>,
        body: Rc<Expr>,
        position: Position,
    },
    Conditional {
        condition: Rc<Expr>,
        then_branch: Rc<Expr>,
        else_branch: Rc<Expr>,
        position: Position,
    },
    /// The one-element block form: evaluates `inner`, and if the result
    /// is a function, calls it with no arguments; otherwise returns it
    /// unchanged. Disambiguates `(foo)` as "invoke `foo` if callable,
    /// else yield it".
    Self_ {
        inner: Rc<Expr>,
        position: Position,
    },
    Operator {
        kind: OperatorKind,
        operands: Vec<Expr>,
        position: Position,
    },
    Call {
        callee: Rc<Expr>,
        arguments: Vec<Expr>,
        position: Position,
    },
}

impl Expr {
    pub fn position(&self) -> Position {
        match self {
            Expr::Atomic { position, .. }
            | Expr::Define { position, .. }
            | Expr::Lambda { position, .. }
            | Expr::Conditional { position, .. }
            | Expr::Self_ { position, .. }
            | Expr::Operator { position, .. }
            | Expr::Call { position, .. } => *position,
        }
    }

    pub fn from_item(item: &Item) -> Result<Expr, Error> {
        match item {
            Item::Token(token) => Expr::from_token(token),
            Item::Block(block) => Expr::from_block(block),
        }
    }

    fn from_token(token: &crate::lexer::Token) -> Result<Expr, Error> {
        let position = token.position;
        let atom = match token.kind {
            TokenKind::Numeric => Atom::Numeric(token.value.parse().map_err(|_| {
                Error::invalid_expression(
                    format!("'{}' is not a valid numeric literal", token.value),
                    position,
                )
            })?),
            TokenKind::StringLiteral => Atom::Text(token.value.clone()),
            TokenKind::Boolean => Atom::Boolean(token.value == "true"),
            TokenKind::Reference => Atom::Reference(token.value.clone()),
            _ => {
                return Err(Error::invalid_expression(
                    format!("unexpected {} token in expression position", token.kind),
                    position,
                ))
            }
        };
        Ok(Expr::Atomic { atom, position })
    }

    fn from_block(block: &Block) -> Result<Expr, Error> {
        let position = block.position;

        if block.items.is_empty() {
            return Err(Error::invalid_expression(
                "empty block is not a valid expression",
                position,
            ));
        }

        if block.items.len() == 1 {
            return Expr::parse_self(block, position);
        }

        let head = &block.items[0];

        if let Item::Token(token) = head {
            if token.kind == TokenKind::Keyword {
                return match token.value.as_str() {
                    "define" => Expr::parse_define(block, position),
                    "lambda" => Expr::parse_lambda(block, position),
                    "if" => Expr::parse_conditional(block, position),
                    other => Err(Error::invalid_expression(
                        format!("'{other}' is not a recognized keyword"),
                        position,
                    )),
                };
            }

            if token.kind == TokenKind::Operation {
                return Expr::parse_operator(block, position);
            }
        }

        Expr::parse_call(block, position)
    }

    fn parse_define(block: &Block, position: Position) -> Result<Expr, Error> {
        if block.items.len() != 3 {
            return Err(Error::invalid_expression(
                "define requires exactly a name and a value: (define <reference> <expr>)",
                position,
            ));
        }

        let name = reference_name(&block.items[1])?;
        let value = Rc::new(Expr::from_item(&block.items[2])?);

        Ok(Expr::Define {
            name,
            value,
            position,
        })
    }

    fn parse_lambda(block: &Block, position: Position) -> Result<Expr, Error> {
        if block.items.len() != 3 {
            return Err(Error::invalid_expression(
                "lambda requires a parameter list and a body: (lambda (<reference>...) <expr>)",
                position,
            ));
        }

        let parameters = match &block.items[1] {
            Item::Block(param_block) => param_block
                .items
                .iter()
                .map(reference_name)
                .collect::<Result<Vec<_>, _>>()?,
            Item::Token(_) => {
                return Err(Error::invalid_expression(
                    "lambda parameter list must be parenthesized, e.g. (lambda (x y) ...)",
                    position,
                ))
            }
        };

        let body = Rc::new(Expr::from_item(&block.items[2])?);

        Ok(Expr::Lambda {
            parameters,
            body,
            position,
        })
    }

    fn parse_conditional(block: &Block, position: Position) -> Result<Expr, Error> {
        if block.items.len() != 4 {
            return Err(Error::invalid_expression(
                "if requires a condition and two branches: (if <expr> <expr> <expr>)",
                position,
            ));
        }

        let condition = Rc::new(Expr::from_item(&block.items[1])?);
        let then_branch = Rc::new(Expr::from_item(&block.items[2])?);
        let else_branch = Rc::new(Expr::from_item(&block.items[3])?);

        Ok(Expr::Conditional {
            condition,
            then_branch,
            else_branch,
            position,
        })
    }

    fn parse_self(block: &Block, position: Position) -> Result<Expr, Error> {
        let inner = Rc::new(Expr::from_item(&block.items[0])?);

        Ok(Expr::Self_ { inner, position })
    }

    fn parse_operator(block: &Block, position: Position) -> Result<Expr, Error> {
        let symbol = match &block.items[0] {
            Item::Token(token) => token.value.as_str(),
            Item::Block(_) => unreachable!("caller already matched a Token head"),
        };
        let kind = OperatorKind::from_symbol(symbol, position)?;

        let operands = block.items[1..]
            .iter()
            .map(Expr::from_item)
            .collect::<Result<Vec<_>, _>>()?;

        // Every operator form requires at least one operand, which is
        // already guaranteed here (the caller only reaches this branch
        // for blocks of size >= 2). `!` is additionally constrained to
        // exactly one (spec.md §4.3).
        if kind.is_unary() && operands.len() != 1 {
            return Err(Error::invalid_expression(
                format!(
                    "operator '{kind}' requires exactly one operand, found {}",
                    operands.len()
                ),
                position,
            ));
        }

        Ok(Expr::Operator {
            kind,
            operands,
            position,
        })
    }

    fn parse_call(block: &Block, position: Position) -> Result<Expr, Error> {
        let callee = Rc::new(Expr::from_item(&block.items[0])?);
        let arguments = block.items[1..]
            .iter()
            .map(Expr::from_item)
            .collect::<Result<Vec<_>, _>>()?;

        if arguments.is_empty() {
            return Err(Error::invalid_expression(
                "function call requires at least one argument",
                position,
            ));
        }

        Ok(Expr::Call {
            callee,
            arguments,
            position,
        })
    }
}

fn reference_name(item: &Item) -> Result<String, Error> {
    match item {
        Item::Token(token) if token.kind == TokenKind::Reference => Ok(token.value.clone()),
        Item::Token(token) => Err(Error::invalid_expression(
            format!("expected a reference name, found {}", token.kind),
            token.position,
        )),
        Item::Block(block) => Err(Error::invalid_expression(
            "expected a reference name, found a nested block",
            block.position,
        )),
    }
}

/// Consumes a block stream and produces one [`Expr`] per top-level block,
/// stopping (without yielding anything) once the stream's sentinel block
/// is reached.
pub struct ExpressionStream<I> {
    blocks: I,
    done: bool,
}

impl<I> ExpressionStream<I>
where
    I: Iterator<Item = Result<Block, Error>>,
{
    pub fn new(blocks: I) -> Self {
        Self {
            blocks,
            done: false,
        }
    }
}

impl<I> Iterator for ExpressionStream<I>
where
    I: Iterator<Item = Result<Block, Error>>,
{
    type Item = Result<Expr, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            match self.blocks.next()? {
                Ok(block) if block.is_sentinel() => {
                    self.done = true;
                    return None;
                }
                Ok(block) => {
                    return Some(Expr::from_block(&block).map(|expr| {
                        trace!("parsed expression at {}", expr.position());
                        expr
                    }));
                }
                Err(error) => {
                    self.done = true;
                    return Some(Err(error));
                }
            }
        }
    }
}
