//! Tokenizer for the jxi format.

use std::borrow::Cow;

use crate::{LexError, LexErrorKind, Span, Token, TokenKind, TokenValue};
use tracing::trace;

/// A tokenizer that produces tokens from jxi source text.
///
/// Whitespace (including commas) is skipped; every call to
/// [`next_token`](Tokenizer::next_token) yields one significant token, ending
/// with [`TokenKind::Eof`].
#[derive(Clone)]
pub struct Tokenizer<'src> {
    /// The source text being tokenized.
    source: &'src str,
    /// The remaining source text (suffix of `source`).
    remaining: &'src str,
    /// Current byte position in `source`.
    pos: u32,
    /// Current 1-based line.
    line: u32,
    /// Byte position where the current line starts.
    line_start: u32,
    /// Reject integer parts with leading zeros.
    strict_numbers: bool,
    /// Recognize `(` and `)` as set delimiters.
    sets: bool,
    /// Set once the iterator has yielded EOF or an error.
    finished: bool,
}

/// A saved source position, used as the anchor of tokens and errors.
#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: u32,
    line: u32,
    line_start: u32,
}

impl<'src> Tokenizer<'src> {
    /// Create a new tokenizer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            remaining: source,
            pos: 0,
            line: 1,
            line_start: 0,
            strict_numbers: false,
            sets: true,
            finished: false,
        }
    }

    /// Reject multi-digit integer parts that start with `0`.
    pub fn strict_numbers(mut self, strict: bool) -> Self {
        self.strict_numbers = strict;
        self
    }

    /// Enable or disable the `(` `)` set delimiters.
    pub fn sets(mut self, enabled: bool) -> Self {
        self.sets = enabled;
        self
    }

    /// Get the current byte position.
    #[inline]
    pub fn position(&self) -> u32 {
        self.pos
    }

    /// Get the current 1-based line.
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Check if we're at the end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Peek at the next character without consuming it.
    #[inline]
    fn peek(&self) -> Option<char> {
        self.remaining.chars().next()
    }

    /// Advance by one character and return it. Tracks line starts.
    #[inline]
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8() as u32;
        self.remaining = &self.remaining[c.len_utf8()..];
        if c == '\n' {
            self.line += 1;
            self.line_start = self.pos;
        }
        Some(c)
    }

    /// Check if the remaining text starts with the given prefix.
    #[inline]
    fn starts_with(&self, prefix: &str) -> bool {
        self.remaining.starts_with(prefix)
    }

    #[inline]
    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            line_start: self.line_start,
        }
    }

    /// Create a token from the given start mark to the current position.
    fn token(&self, kind: TokenKind, start: Mark, value: TokenValue<'src>) -> Token<'src> {
        let span = Span::new(start.pos, self.pos);
        let text = &self.source[start.pos as usize..self.pos as usize];
        trace!("Token {:?} at {:?} (line {}): {:?}", kind, span, start.line, text);
        Token::new(kind, span, start.line, text, value)
    }

    /// Build an error anchored at `at`, covering up to `end`.
    fn error(&self, kind: LexErrorKind, at: Mark, end: u32) -> LexError {
        let column = self.source[at.line_start as usize..at.pos as usize]
            .chars()
            .count() as u32
            + 1;
        LexError::new(kind, Span::new(at.pos, end.max(at.pos)), at.line, column)
    }

    /// Build an error covering the character under the cursor.
    fn error_here(&self, kind: LexErrorKind) -> LexError {
        let end = self.pos + self.peek().map_or(0, |c| c.len_utf8() as u32);
        self.error(kind, self.mark(), end)
    }

    fn malformed_number(&self, msg: &str) -> LexError {
        self.error_here(LexErrorKind::MalformedNumber(msg.to_string()))
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if is_whitespace(c) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token<'src>, LexError> {
        self.skip_whitespace();

        let start = self.mark();
        let Some(c) = self.peek() else {
            return Ok(self.token(TokenKind::Eof, start, TokenValue::None));
        };

        let kind = match c {
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' if self.sets => TokenKind::LParen,
            ')' if self.sets => TokenKind::RParen,
            ':' => TokenKind::Colon,
            '/' => TokenKind::Slash,
            '=' => TokenKind::Eq,
            '@' => TokenKind::At,
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semi,

            '"' | '\'' => return self.lex_string(c),
            '`' => return self.lex_raw_string(),
            '-' | '0'..='9' => return self.lex_number(),
            c if c.is_ascii_alphabetic() => return Ok(self.lex_word()),

            c => return Err(self.error_here(LexErrorKind::IllegalCharacter(c))),
        };

        self.advance();
        Ok(self.token(kind, start, TokenValue::None))
    }

    /// Lex an identifier or one of the reserved words `true`, `false`, `null`.
    fn lex_word(&mut self) -> Token<'src> {
        let start = self.mark();
        self.advance();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = &self.source[start.pos as usize..self.pos as usize];
        let (kind, value) = match text {
            "true" => (TokenKind::Bool, TokenValue::Bool(true)),
            "false" => (TokenKind::Bool, TokenValue::Bool(false)),
            "null" => (TokenKind::Null, TokenValue::None),
            _ => (TokenKind::Ident, TokenValue::Text(Cow::Borrowed(text))),
        };
        self.token(kind, start, value)
    }

    /// Lex a quoted string delimited by `delim` (`"` or `'`).
    fn lex_string(&mut self, delim: char) -> Result<Token<'src>, LexError> {
        let start = self.mark();
        self.advance();

        let content_start = self.pos as usize;
        // Only allocated once the first escape shows up.
        let mut owned: Option<String> = None;

        loop {
            let Some(c) = self.peek() else {
                return Err(self.error(LexErrorKind::UnterminatedString, start, self.pos));
            };
            match c {
                c if c == delim => {
                    let content_end = self.pos as usize;
                    self.advance();
                    let text = match owned {
                        Some(text) => Cow::Owned(text),
                        None => Cow::Borrowed(&self.source[content_start..content_end]),
                    };
                    return Ok(self.token(TokenKind::String, start, TokenValue::Text(text)));
                }
                '\\' => {
                    let buf = owned
                        .get_or_insert_with(|| self.source[content_start..self.pos as usize].to_string());
                    let escaped = self.lex_escape(delim)?;
                    buf.push(escaped);
                }
                c if (c as u32) < 0x20 => {
                    return Err(self.error_here(LexErrorKind::UnescapedControl(c)));
                }
                c => {
                    self.advance();
                    if let Some(buf) = owned.as_mut() {
                        buf.push(c);
                    }
                }
            }
        }
    }

    /// Lex one escape sequence; the cursor is on the backslash.
    fn lex_escape(&mut self, delim: char) -> Result<char, LexError> {
        let backslash = self.mark();
        self.advance();

        let Some(c) = self.peek() else {
            return Err(self.error(LexErrorKind::UnterminatedString, backslash, self.pos));
        };
        let unescaped = match c {
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '\\' => '\\',
            '/' => '/',
            c if c == delim => c,
            'u' => {
                self.advance();
                return self.lex_unicode_escape(backslash);
            }
            c => {
                let end = self.pos + c.len_utf8() as u32;
                return Err(self.error(LexErrorKind::InvalidEscape(c), backslash, end));
            }
        };
        self.advance();
        Ok(unescaped)
    }

    /// Lex the hex digits of `\uXXXX`, joining UTF-16 surrogate pairs.
    fn lex_unicode_escape(&mut self, backslash: Mark) -> Result<char, LexError> {
        let high = self.hex4(backslash)?;
        if (0xD800..0xDC00).contains(&high) {
            if self.starts_with("\\u") {
                self.advance();
                self.advance();
                let low = self.hex4(backslash)?;
                if (0xDC00..0xE000).contains(&low) {
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    if let Some(c) = char::from_u32(code) {
                        return Ok(c);
                    }
                }
            }
            return Err(self.error(LexErrorKind::InvalidUnicodeEscape, backslash, self.pos));
        }
        char::from_u32(high)
            .ok_or_else(|| self.error(LexErrorKind::InvalidUnicodeEscape, backslash, self.pos))
    }

    fn hex4(&mut self, backslash: Mark) -> Result<u32, LexError> {
        let mut code = 0u32;
        for _ in 0..4 {
            match self.peek().and_then(|c| c.to_digit(16)) {
                Some(digit) => {
                    code = code * 16 + digit;
                    self.advance();
                }
                None => {
                    return Err(self.error(
                        LexErrorKind::InvalidUnicodeEscape,
                        backslash,
                        self.pos,
                    ));
                }
            }
        }
        Ok(code)
    }

    /// Lex a backtick raw string. A backslash only escapes a following
    /// backtick; anywhere else it is kept verbatim.
    fn lex_raw_string(&mut self) -> Result<Token<'src>, LexError> {
        let start = self.mark();
        self.advance();

        let mut text = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(self.error(LexErrorKind::UnterminatedString, start, self.pos));
                }
                Some('`') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if self.peek() == Some('`') {
                        self.advance();
                        text.push('`');
                    } else {
                        text.push('\\');
                    }
                }
                Some(c) => {
                    self.advance();
                    text.push(c);
                }
            }
        }

        Ok(self.token(
            TokenKind::RawString,
            start,
            TokenValue::Text(Cow::Owned(text)),
        ))
    }

    /// Consume a run of ASCII digits, returning how many were eaten.
    fn eat_digits(&mut self) -> usize {
        let mut count = 0;
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
            count += 1;
        }
        count
    }

    /// Lex `-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?`.
    fn lex_number(&mut self) -> Result<Token<'src>, LexError> {
        let start = self.mark();
        if self.peek() == Some('-') {
            self.advance();
        }

        let int_start = self.mark();
        let int_digits = self.eat_digits();
        if int_digits == 0 {
            return Err(self.malformed_number("expected digit after '-'"));
        }
        if self.strict_numbers
            && int_digits > 1
            && self.source.as_bytes()[int_start.pos as usize] == b'0'
        {
            return Err(self.error(
                LexErrorKind::MalformedNumber("leading zero in integer part".to_string()),
                int_start,
                self.pos,
            ));
        }

        let mut is_float = false;
        if self.peek() == Some('.') {
            self.advance();
            if self.eat_digits() == 0 {
                return Err(self.malformed_number("expected digit after '.'"));
            }
            is_float = true;
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            if self.eat_digits() == 0 {
                return Err(self.malformed_number("expected exponent digits"));
            }
            is_float = true;
        }

        let text = &self.source[start.pos as usize..self.pos as usize];
        if is_float {
            match text.parse::<f64>() {
                Ok(value) if value.is_finite() => {
                    Ok(self.token(TokenKind::Float, start, TokenValue::Float(value)))
                }
                _ => Err(self.error(
                    LexErrorKind::MalformedNumber("float literal out of range".to_string()),
                    start,
                    self.pos,
                )),
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => Ok(self.token(TokenKind::Int, start, TokenValue::Int(value))),
                Err(_) => Err(self.error(
                    LexErrorKind::MalformedNumber("integer literal out of range".to_string()),
                    start,
                    self.pos,
                )),
            }
        }
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = Result<Token<'src>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(token) if token.kind == TokenKind::Eof => {
                self.finished = true;
                None
            }
            Ok(token) => Some(Ok(token)),
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

/// Insignificant characters. Commas are optional separators.
fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0b' | '\x0c' | ',')
}
