//! Token sequence → block tree sequence.
//!
//! A [`Block`] is one parenthesized form: an ordered, heterogeneous list of
//! [`Token`]s and nested [`Block`]s, plus the position of its first inner
//! element (`spec.md` §3 — the opening/closing delimiters themselves are
//! never stored in the list).

use log::trace;

use crate::error::Error;
use crate::lexer::{Token, TokenKind};
use crate::position::Position;

/// One element inside a [`Block`]'s body: either a leaf token or a nested
/// block.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Token(Token),
    Block(Block),
}

/// A parenthesized form: the (possibly empty) ordered list of tokens and
/// sub-blocks between one matching pair of `(` `)`, plus the position the
/// block is reported at.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub position: Position,
    pub items: Vec<Item>,
}

impl Block {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The sentinel block that terminates a [`BlockStream`]: a single
    /// `end_of_file` token and nothing else.
    pub fn sentinel(position: Position) -> Self {
        Block {
            position,
            items: vec![Item::Token(Token::end_of_file(position))],
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self.items.as_slice(), [Item::Token(t)] if t.is_end_of_file())
    }
}

/// Consumes a token stream and produces a finite lazy sequence of
/// top-level [`Block`]s, followed by one [`Block::sentinel`].
pub struct BlockStream<I> {
    tokens: I,
    done: bool,
}

impl<I> BlockStream<I>
where
    I: Iterator<Item = Result<Token, Error>>,
{
    pub fn new(tokens: I) -> Self {
        Self {
            tokens,
            done: false,
        }
    }

    fn next_token(&mut self) -> Result<Token, Error> {
        match self.tokens.next() {
            Some(result) => result,
            // The token stream is itself required to terminate with an
            // explicit end_of_file token, so running out first is only
            // possible if the underlying stream is misbehaving; treat it
            // the same as reaching end of file.
            None => Ok(Token::end_of_file(Position::INVALID)),
        }
    }

    /// Read one non-comment token, skipping `%%` comments transparently.
    fn next_significant_token(&mut self) -> Result<Token, Error> {
        loop {
            let token = self.next_token()?;
            if token.kind != TokenKind::Comment {
                return Ok(token);
            }
        }
    }

    fn read_block_body(&mut self, position: Position) -> Result<Block, Error> {
        let mut items = Vec::new();

        loop {
            let token = self.next_significant_token()?;

            if token.is_delimiter(")") {
                return Ok(Block { position, items });
            }

            if token.is_end_of_file() {
                return Err(Error::invalid_block(
                    "unexpected end of file: unclosed expression block scope",
                    position,
                ));
            }

            if token.is_delimiter("(") {
                let sub_position = token.position;
                let sub_block = self.read_block_body(sub_position)?;
                items.push(Item::Block(sub_block));
            } else {
                items.push(Item::Token(token));
            }
        }
    }

    fn read_top_level_block(&mut self) -> Result<Block, Error> {
        let token = self.next_significant_token()?;

        if token.is_end_of_file() {
            return Ok(Block::sentinel(token.position));
        }

        if !token.is_delimiter("(") {
            return Err(Error::invalid_block(
                "top-level expressions must begin with '('",
                token.position,
            ));
        }

        self.read_block_body(token.position)
    }
}

impl<I> Iterator for BlockStream<I>
where
    I: Iterator<Item = Result<Token, Error>>,
{
    type Item = Result<Block, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.read_top_level_block() {
            Ok(block) => {
                if block.is_sentinel() {
                    self.done = true;
                }
                trace!("parsed block of size {} at {}", block.len(), block.position);
                Some(Ok(block))
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}
