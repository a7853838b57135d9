//! CFI parser
//!
//! Parses CFI strings, bare or `epubcfi(...)`-wrapped, into structured
//! [`Cfi`] values.
//!
//! Grammar (simplified):
//! ```text
//! cfi     = ["epubcfi("] path [")"]
//! path    = segment ("!" segment)* ["," segment "," segment]
//! segment = step+
//! step    = "/" number [id] [":" number] ["~" float] ["@" float ":" float] [assertion]
//! id      = "[" text "]"
//! assertion = "[" text "]"
//! ```
//!
//! Inside brackets, `^` escapes the following character; bracket content is
//! exposed unescaped. Odd step indices, index `0`, empty assertions, and
//! offset `0` are all grammatical and parse without error.

use thiserror::Error;

use crate::types::{Cfi, CfiRange, Segment, Step};

/// CFI parsing errors
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Empty CFI string")]
    Empty,

    #[error("CFI must end with ')'")]
    MissingClosingParen,

    #[error("Expected '/' at position {0}")]
    ExpectedStep(usize),

    #[error("Expected number at position {0}")]
    ExpectedNumber(usize),

    #[error("Unclosed bracket at position {0}")]
    UnclosedBracket(usize),

    #[error("Unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
}

/// Parser state
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        if self.skip_if(expected) {
            Ok(())
        } else {
            Err(ParseError::UnexpectedChar(
                self.peek().unwrap_or('\0'),
                self.pos,
            ))
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Parse a sequence of digits as u32
    fn parse_number(&mut self) -> Result<u32, ParseError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(ParseError::ExpectedNumber(start));
        }

        self.input[start..self.pos]
            .parse()
            .map_err(|_| ParseError::ExpectedNumber(start))
    }

    /// Parse a non-negative decimal number
    fn parse_float(&mut self) -> Result<f64, ParseError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
        if self.skip_if('.') {
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if self.pos == start {
            return Err(ParseError::ExpectedNumber(start));
        }

        self.input[start..self.pos]
            .parse()
            .map_err(|_| ParseError::ExpectedNumber(start))
    }

    /// Parse `[...]` content, handling `^` escapes. Returns the unescaped
    /// text; `!`, `/`, `:` and `,` are literal inside brackets.
    fn parse_bracket(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        self.expect('[')?;
        let mut value = String::new();
        loop {
            match self.advance() {
                None => return Err(ParseError::UnclosedBracket(start)),
                Some('^') => match self.advance() {
                    Some(ch) => value.push(ch),
                    None => return Err(ParseError::UnclosedBracket(start)),
                },
                Some(']') => return Ok(value),
                Some(ch) => value.push(ch),
            }
        }
    }

    /// Parse a single `/index[id]:offset~t@x:y[assertion]` step
    fn parse_step(&mut self) -> Result<Step, ParseError> {
        self.expect('/')?;
        let mut step = Step::new(self.parse_number()?);

        if self.peek() == Some('[') {
            step.id = Some(self.parse_bracket()?);
        }
        if self.skip_if(':') {
            step.offset = Some(self.parse_number()?);
        }
        if self.skip_if('~') {
            step.temporal = Some(self.parse_float()?);
        }
        if self.skip_if('@') {
            let x = self.parse_float()?;
            self.expect(':')?;
            let y = self.parse_float()?;
            step.spatial = Some((x, y));
        }
        if self.peek() == Some('[') {
            step.assertion = Some(self.parse_bracket()?);
        }

        Ok(step)
    }

    /// Parse a run of steps; every segment must contain at least one
    fn parse_steps(&mut self) -> Result<Segment, ParseError> {
        let mut steps = Vec::new();
        while self.peek() == Some('/') {
            steps.push(self.parse_step()?);
        }
        if steps.is_empty() {
            return Err(ParseError::ExpectedStep(self.pos));
        }
        Ok(Segment::with_steps(steps))
    }

    /// Parse a complete path: segments separated by `!`, with optional
    /// comma-separated range tails on the last segment
    fn parse_cfi(&mut self) -> Result<Cfi, ParseError> {
        let mut segments = vec![self.parse_steps()?];
        while self.skip_if('!') {
            segments.push(self.parse_steps()?);
        }

        let range = if self.skip_if(',') {
            let start = self.parse_steps()?;
            self.expect(',')?;
            let end = self.parse_steps()?;
            Some(CfiRange { start, end })
        } else {
            None
        };

        Ok(Cfi { segments, range })
    }
}

/// Parse a CFI string into a [`Cfi`]
///
/// Accepts both bare paths (`/6/4!/2`) and wrapped ones
/// (`epubcfi(/6/4!/2)`). Surrounding whitespace is ignored.
pub fn parse(input: &str) -> Result<Cfi, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseError::Empty);
    }

    let inner = match input.strip_prefix("epubcfi(") {
        Some(rest) => rest
            .strip_suffix(')')
            .ok_or(ParseError::MissingClosingParen)?,
        None => input,
    };

    let mut parser = Parser::new(inner);
    let cfi = parser.parse_cfi()?;

    // Ensure we consumed all input
    if !parser.at_end() {
        return Err(ParseError::UnexpectedChar(
            parser.peek().unwrap_or('\0'),
            parser.pos,
        ));
    }

    Ok(cfi)
}

/// Parse a CFI string, discarding the error on failure
pub fn try_parse(input: &str) -> Option<Cfi> {
    parse(input).ok()
}
