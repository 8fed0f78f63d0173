//! Key literal syntax
//!
//! `Display` and `FromStr` for [`Key`], each the inverse of the other.
//!
//! ```text
//! 42   -2.5   inf        number
//! @1700000000000         date (millis since epoch)
//! "a \"quoted\" \\ str"  string
//! 0x00ff                 binary
//! [1,"a",[0x01]]         array
//! ```
//!
//! The rendering is self-delimiting, which is what lets cache addresses
//! embed a key and a value side by side without ambiguity.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ShelfError};

use super::Key;

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // -0 and 0 are the same key, so they render the same
            Key::Number(n) if *n == 0.0 => f.write_str("0"),
            Key::Number(n) => write!(f, "{}", n),
            Key::Date(d) if *d == 0.0 => f.write_str("@0"),
            Key::Date(d) => write!(f, "@{}", d),
            Key::Text(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                f.write_str("\"")
            }
            Key::Binary(bytes) => {
                f.write_str("0x")?;
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Key::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl FromStr for Key {
    type Err = ShelfError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parser = Parser::new(s);
        let key = parser.parse_key()?;
        parser.skip_whitespace();
        if parser.pos < s.len() {
            return Err(invalid(format!(
                "unexpected trailing input at offset {}: {:?}",
                parser.pos,
                parser.rest()
            )));
        }
        Ok(key)
    }
}

fn invalid(message: impl Into<String>) -> ShelfError {
    ShelfError::InvalidKey(message.into())
}

/// Recursive-descent parser over the literal syntax
struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn parse_key(&mut self) -> Result<Key> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(invalid("unexpected end of input")),
            Some('[') => self.parse_array(),
            Some('"') => self.parse_text(),
            Some('@') => {
                self.bump();
                let millis = self.parse_number()?;
                Key::date(millis)
            }
            Some(_) if self.rest().starts_with("0x") => self.parse_binary(),
            Some(_) => {
                let value = self.parse_number()?;
                Key::number(value)
            }
        }
    }

    fn parse_array(&mut self) -> Result<Key> {
        self.bump(); // '['
        let mut items = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(Key::Array(items));
        }

        loop {
            items.push(self.parse_key()?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(Key::Array(items)),
                Some(c) => {
                    return Err(invalid(format!("expected ',' or ']' in array, got {:?}", c)))
                }
                None => return Err(invalid("unterminated array")),
            }
        }
    }

    fn parse_text(&mut self) -> Result<Key> {
        self.bump(); // '"'
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(invalid("unterminated string")),
                Some('"') => return Ok(Key::Text(out)),
                Some('\\') => match self.bump() {
                    Some(c @ ('"' | '\\')) => out.push(c),
                    Some(c) => return Err(invalid(format!("unknown escape \\{}", c))),
                    None => return Err(invalid("unterminated escape")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_binary(&mut self) -> Result<Key> {
        self.pos += 2; // "0x"
        let digits = self.token();
        if !digits.is_ascii() || digits.len() % 2 != 0 {
            return Err(invalid(format!("malformed hex literal 0x{}", digits)));
        }

        let bytes = (0..digits.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&digits[i..i + 2], 16))
            .collect::<std::result::Result<Vec<u8>, _>>()
            .map_err(|_| invalid(format!("malformed hex literal 0x{}", digits)))?;

        Ok(Key::Binary(bytes))
    }

    fn parse_number(&mut self) -> Result<f64> {
        let token = self.token();
        token
            .parse::<f64>()
            .map_err(|_| invalid(format!("not a number: {:?}", token)))
    }

    /// Consume up to the next delimiter
    fn token(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ',' || c == ']' || c.is_whitespace() {
                break;
            }
            self.bump();
        }
        &self.src[start..self.pos]
    }
}
