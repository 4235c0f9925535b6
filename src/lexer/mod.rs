//! Byte source → token sequence.
//!
//! [`LexStream`] owns the source text and hands out a single
//! [`TokenStream`] iterator; asking for a second one is a `double_read`
//! error (`spec.md` §4.1), mirroring how the original C++ `LexStream`
//! moves ownership of its `FILE*` into the first iterator it creates.

mod token;

pub use token::{Token, TokenKind};

use std::cell::Cell;
use std::iter::Peekable;
use std::str::Chars;

use log::trace;

use crate::error::Error;
use crate::position::Position;

use token::{KEYWORDS, OPERATIONS};

/// Read-once source of [`Token`]s for a single source file.
pub struct LexStream<'a> {
    source: &'a str,
    file: String,
    consumed: Cell<bool>,
}

impl<'a> LexStream<'a> {
    pub fn new(source: &'a str, file: impl Into<String>) -> Self {
        Self {
            source,
            file: file.into(),
            consumed: Cell::new(false),
        }
    }

    /// Create the single lazy token sequence this stream can ever produce.
    ///
    /// # Errors
    /// Returns [`Error::DoubleRead`] if called more than once on the same
    /// `LexStream`.
    pub fn tokens(&self) -> Result<TokenStream<'a>, Error> {
        if self.consumed.replace(true) {
            return Err(Error::DoubleRead);
        }

        Ok(TokenStream {
            chars: self.source.chars().peekable(),
            file: self.file.clone(),
            line: 1,
            column: 1,
            done: false,
        })
    }
}

/// The lazy, single-pass sequence of [`Token`]s produced by a
/// [`LexStream`]. Terminated by exactly one [`TokenKind::EndOfFile`]
/// token.
pub struct TokenStream<'a> {
    chars: Peekable<Chars<'a>>,
    file: String,
    line: i64,
    column: i64,
    done: bool,
}

impl<'a> TokenStream<'a> {
    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn advance(&mut self) -> Option<char> {
        let next = self.chars.next()?;
        if next == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(next)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn lex_string_literal(&mut self) -> Result<Token, Error> {
        let position = self.position();
        let mut value = String::new();

        self.advance(); // opening quote
        loop {
            match self.advance() {
                Some('"') => {
                    let token = Token::new(value, position, TokenKind::StringLiteral);
                    trace!("lexed {token}");
                    return Ok(token);
                }
                Some(c) => value.push(c),
                None => {
                    return Err(Error::invalid_lexeme(
                        "unterminated string literal",
                        position,
                    ))
                }
            }
        }
    }

    fn read_lexeme(&mut self) -> (Position, String) {
        let position = self.position();
        let mut value = String::new();

        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || c == '(' || c == ')' {
                break;
            }
            value.push(c);
            self.advance();
        }

        (position, value)
    }

    /// `%%` starts a comment that runs to the end of the physical line
    /// (`spec.md` §4.1's remark on comment placement).
    fn lex_comment(&mut self, position: Position) -> Token {
        let mut value = String::new();
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            value.push(c);
            self.advance();
        }
        Token::new(value, position, TokenKind::Comment)
    }

    fn classify(&self, position: Position, value: String) -> Result<Token, Error> {
        let kind = if value.starts_with(|c: char| c.is_ascii_digit()) {
            let digits_and_dots = value.chars().all(|c| c.is_ascii_digit() || c == '.');
            let at_most_one_dot = value.chars().filter(|&c| c == '.').count() <= 1;
            if !digits_and_dots || !at_most_one_dot {
                return Err(Error::invalid_lexeme(
                    format!("'{value}' is not a valid numeric lexeme"),
                    position,
                ));
            }
            TokenKind::Numeric
        } else if value == "true" || value == "false" {
            TokenKind::Boolean
        } else if KEYWORDS.contains(&value.as_str()) {
            TokenKind::Keyword
        } else if OPERATIONS.contains(&value.as_str()) {
            TokenKind::Operation
        } else {
            TokenKind::Reference
        };

        Ok(Token::new(value, position, kind))
    }

    fn next_token(&mut self) -> Result<Token, Error> {
        self.skip_whitespace();

        let position = self.position();

        match self.chars.peek() {
            None => Ok(Token::end_of_file(position)),
            Some('(') => {
                self.advance();
                Ok(Token::new("(", position, TokenKind::Delimiter))
            }
            Some(')') => {
                self.advance();
                Ok(Token::new(")", position, TokenKind::Delimiter))
            }
            Some('"') => self.lex_string_literal(),
            Some('%') if self.chars.clone().nth(1) == Some('%') => {
                self.advance();
                self.advance();
                Ok(self.lex_comment(position))
            }
            _ => {
                let (position, value) = self.read_lexeme();
                self.classify(position, value)
            }
        }
    }
}

impl<'a> Iterator for TokenStream<'a> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_token() {
            Ok(token) => {
                if token.is_end_of_file() {
                    self.done = true;
                }
                trace!("lexed {token}");
                Some(Ok(token))
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}
