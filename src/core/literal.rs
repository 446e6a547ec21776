// File: src/core/literal.rs
//! Textual dictionary literals for persisted frequency columns.
//!
//! A map renders as `{'DIABETES': 3, 'COPD': 1}` and parses back to the same
//! keys, counts and order.

use crate::core::freq_map::FrequencyMap;
use crate::error::{PipelineError, Result};
use std::fmt;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

impl fmt::Display for FrequencyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (term, count)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_quoted(f, term)?;
            write!(f, ": {}", count)?;
        }
        f.write_str("}")
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    write!(f, "{}", quote)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c if c == quote => write!(f, "\\{}", c)?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "{}", quote)
}

impl FromStr for FrequencyMap {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        LiteralParser::new(s).parse()
    }
}

struct LiteralParser<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> LiteralParser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, chars: src.char_indices().peekable() }
    }

    fn parse(mut self) -> Result<FrequencyMap> {
        let mut map = FrequencyMap::new();
        self.skip_ws();
        self.expect('{')?;
        self.skip_ws();
        if self.eat('}') {
            return self.finish(map);
        }
        loop {
            self.skip_ws();
            if self.eat('}') {
                // trailing comma
                return self.finish(map);
            }
            let key = self.string()?;
            self.skip_ws();
            self.expect(':')?;
            self.skip_ws();
            let count = self.count()?;
            map.insert(key, count);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            self.expect('}')?;
            return self.finish(map);
        }
    }

    fn finish(mut self, map: FrequencyMap) -> Result<FrequencyMap> {
        self.skip_ws();
        match self.chars.peek() {
            None => Ok(map),
            Some(&(pos, _)) => Err(self.error(pos, "trailing characters after literal")),
        }
    }

    fn string(&mut self) -> Result<String> {
        let (start, quote) = match self.chars.next() {
            Some((pos, c)) if c == '\'' || c == '"' => (pos, c),
            Some((pos, c)) => return Err(self.error(pos, &format!("expected quoted key, found {:?}", c))),
            None => return Err(self.error(self.src.len(), "expected quoted key, found end of input")),
        };
        let mut out = String::new();
        loop {
            match self.chars.next() {
                None => return Err(self.error(start, "unterminated string")),
                Some((_, c)) if c == quote => return Ok(out),
                Some((pos, '\\')) => match self.chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, c @ ('\\' | '\'' | '"'))) => out.push(c),
                    Some((_, c)) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => return Err(self.error(pos, "dangling escape")),
                },
                Some((_, c)) => out.push(c),
            }
        }
    }

    fn count(&mut self) -> Result<u32> {
        let start = self.position();
        let mut digits = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() || (digits.is_empty() && c == '-') {
                digits.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return Err(self.error(start, "expected integer count"));
        }
        digits
            .parse::<u32>()
            .map_err(|e| self.error(start, &format!("invalid count {:?}: {}", digits, e)))
    }

    fn skip_ws(&mut self) {
        while matches!(self.chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some(&(_, c)) if c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        let pos = self.position();
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(pos, &format!("expected {:?}", expected)))
        }
    }

    fn position(&mut self) -> usize {
        self.chars.peek().map(|&(pos, _)| pos).unwrap_or(self.src.len())
    }

    fn error(&self, position: usize, reason: &str) -> PipelineError {
        PipelineError::MalformedLiteral { position, reason: reason.to_string() }
    }
}
