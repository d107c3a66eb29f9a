//! Safe reader for numeric literals.
//!
//! Accepts signed integers, decimals (with optional exponent), `(...)` tuples
//! and `[...]` lists, nested to any depth. Anything else is rejected, so
//! clause text is never evaluated as an expression.

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// A numeric scalar, keeping the integer/float distinction of the source.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Value as a float.
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Value as an integer, if it was written as one.
    pub fn as_int(self) -> Option<i64> {
        match self {
            Number::Int(i) => Some(i),
            Number::Float(_) => None,
        }
    }
}

/// Numeric equality: `5` and `5.0` are the same number.
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Number::Float(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Number::Int(i) => serializer.serialize_i64(*i),
            Number::Float(f) => serializer.serialize_f64(*f),
        }
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::Int(v)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

/// A parsed literal: a number or a (possibly nested) sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(Number),
    Seq(Vec<Literal>),
}

/// Literal text that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct LiteralError {
    pub message: String,
    pub offset: usize,
}

impl LiteralError {
    fn shape(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offset: 0,
        }
    }
}

impl Literal {
    /// Expect a single number.
    pub fn into_number(self) -> Result<Number, LiteralError> {
        match self {
            Literal::Number(n) => Ok(n),
            Literal::Seq(_) => Err(LiteralError::shape("expected a number, found a sequence")),
        }
    }

    /// Expect a flat sequence of numbers.
    pub fn into_numbers(self) -> Result<Vec<Number>, LiteralError> {
        match self {
            Literal::Seq(items) => items.into_iter().map(Literal::into_number).collect(),
            Literal::Number(_) => Err(LiteralError::shape("expected a sequence, found a number")),
        }
    }

    /// Expect exactly two integers, e.g. `(0, 4)`.
    pub fn into_bounds(self) -> Result<(i64, i64), LiteralError> {
        let numbers = self.into_numbers()?;
        match numbers.as_slice() {
            [low, high] => match (low.as_int(), high.as_int()) {
                (Some(low), Some(high)) => Ok((low, high)),
                _ => Err(LiteralError::shape("bounds must be integers")),
            },
            other => Err(LiteralError::shape(format!(
                "expected 2 bounds, found {}",
                other.len()
            ))),
        }
    }
}

/// Parse literal text.
///
/// A bare top-level `a, b` reads as a tuple; `(a)` without a comma is just `a`.
pub fn parse_literal(text: &str) -> Result<Literal, LiteralError> {
    let mut reader = Reader { src: text, pos: 0 };
    reader.skip_ws();
    if reader.peek().is_none() {
        return Err(reader.error("empty literal"));
    }

    let (mut items, saw_comma) = reader.items(None)?;
    if items.len() == 1 && !saw_comma {
        Ok(items.remove(0))
    } else {
        Ok(Literal::Seq(items))
    }
}

struct Reader<'a> {
    src: &'a str,
    pos: usize,
}

impl Reader<'_> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            message: message.into(),
            offset: self.pos,
        }
    }

    fn unexpected(&self) -> LiteralError {
        match self.src[self.pos..].chars().next() {
            Some(c) => self.error(format!("unexpected character `{c}`")),
            None => self.error("unexpected end of input"),
        }
    }

    /// Comma separated values up to `close`, or to the end of input when `None`.
    fn items(&mut self, close: Option<u8>) -> Result<(Vec<Literal>, bool), LiteralError> {
        let mut items = Vec::new();
        let mut saw_comma = false;

        loop {
            self.skip_ws();
            match (self.peek(), close) {
                (None, None) => break,
                (None, Some(c)) => {
                    return Err(self.error(format!("expected `{}`", c as char)));
                }
                (Some(b), Some(c)) if b == c => {
                    self.pos += 1;
                    break;
                }
                _ => {}
            }

            items.push(self.value()?);

            self.skip_ws();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    saw_comma = true;
                }
                Some(b) if Some(b) == close => {
                    self.pos += 1;
                    break;
                }
                None if close.is_none() => break,
                None => {
                    let c = close.map(char::from).unwrap_or(')');
                    return Err(self.error(format!("expected `{c}`")));
                }
                Some(_) => return Err(self.unexpected()),
            }
        }

        Ok((items, saw_comma))
    }

    fn value(&mut self) -> Result<Literal, LiteralError> {
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let (mut items, saw_comma) = self.items(Some(b')'))?;
                if items.len() == 1 && !saw_comma {
                    Ok(items.remove(0))
                } else {
                    Ok(Literal::Seq(items))
                }
            }
            Some(b'[') => {
                self.pos += 1;
                let (items, _) = self.items(Some(b']'))?;
                Ok(Literal::Seq(items))
            }
            Some(b) if b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.') => {
                self.number().map(Literal::Number)
            }
            _ => Err(self.unexpected()),
        }
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn number(&mut self) -> Result<Number, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }

        let mut is_float = false;
        let mut digit_count = self.digits();
        if self.peek() == Some(b'.') {
            self.pos += 1;
            is_float = true;
            digit_count += self.digits();
        }
        if digit_count == 0 {
            self.pos = start;
            return Err(self.error("expected a number"));
        }

        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'-' | b'+')) {
                self.pos += 1;
            }
            if self.digits() == 0 {
                return Err(self.error("expected exponent digits"));
            }
            is_float = true;
        }

        let text = &self.src[start..self.pos];
        if is_float {
            text.parse::<f64>()
                .map(Number::Float)
                .map_err(|e| LiteralError {
                    message: format!("invalid float `{text}`: {e}"),
                    offset: start,
                })
        } else {
            text.parse::<i64>()
                .map(Number::Int)
                .map_err(|e| LiteralError {
                    message: format!("invalid integer `{text}`: {e}"),
                    offset: start,
                })
        }
    }
}
