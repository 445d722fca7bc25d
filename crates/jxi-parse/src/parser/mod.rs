//! Recursive-descent parser producing a document and its pending links.

use jxi_tokenizer::{Span, Token, TokenKind, TokenValue, Tokenizer};
use jxi_tree::{Dict, Document, Entity, Key, Set, Slot, Step, SymbolicLink, Value};
use tracing::trace;

use crate::resolve::PendingLink;
use crate::{Error, LinkError, LinkErrorKind, ParseError, ParseErrorKind, ParseOptions};

/// Parser for one source buffer.
///
/// Holds the current token plus at most one token of lookahead. Every link
/// placeholder is recorded with the slot path it was parsed into, so the
/// resolver can write its target back in place.
pub struct Parser<'src> {
    tokenizer: Tokenizer<'src>,
    current: Token<'src>,
    lookahead: Option<Token<'src>>,
    /// End of the last consumed token.
    last_end: u32,
    /// Location of the element being parsed.
    slots: Vec<Slot>,
    pending: Vec<PendingLink>,
    next_link_id: u32,
}

impl<'src> Parser<'src> {
    /// Create a parser with default options.
    pub fn new(source: &'src str) -> Self {
        Self::with_options(source, &ParseOptions::default())
    }

    /// Create a parser with the given options.
    pub fn with_options(source: &'src str, options: &ParseOptions) -> Self {
        let tokenizer = Tokenizer::new(source)
            .strict_numbers(options.strict_numbers)
            .sets(options.sets);
        Self {
            tokenizer,
            current: Token::new(TokenKind::Eof, Span::empty(0), 1, "", TokenValue::None),
            lookahead: None,
            last_end: 0,
            slots: Vec::new(),
            pending: Vec::new(),
            next_link_id: 0,
        }
    }

    /// Parse the whole buffer.
    ///
    /// Links are left as [`Value::Link`] placeholders and returned alongside
    /// the document, in source order.
    pub fn parse(mut self) -> Result<(Document, Vec<PendingLink>), Error> {
        self.current = self.tokenizer.next_token()?;
        let mut document = Document::new();
        while self.current.kind != TokenKind::Eof {
            self.slots.push(Slot::Index(document.len()));
            let element = self.parse_element()?;
            self.slots.pop();
            document.push(element);
        }
        trace!(
            elements = document.len(),
            links = self.pending.len(),
            "parsed document"
        );
        Ok((document, self.pending))
    }

    // Token plumbing

    /// Move to the next token, returning the one just consumed.
    fn advance(&mut self) -> Result<Token<'src>, Error> {
        let next = match self.lookahead.take() {
            Some(token) => token,
            None => self.tokenizer.next_token()?,
        };
        let consumed = std::mem::replace(&mut self.current, next);
        self.last_end = consumed.span.end;
        Ok(consumed)
    }

    /// The token after the current one.
    fn peek(&mut self) -> Result<&Token<'src>, Error> {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.tokenizer.next_token()?,
        };
        Ok(self.lookahead.insert(token))
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Consume a token of `kind` or fail naming what was expected.
    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token<'src>, Error> {
        if self.at(kind) {
            return self.advance();
        }
        Err(self.unexpected(expected))
    }

    fn unexpected(&self, expected: &str) -> Error {
        let kind = if self.at(TokenKind::Eof) {
            ParseErrorKind::UnexpectedEof
        } else {
            ParseErrorKind::UnexpectedToken {
                expected: expected.to_owned(),
                found: self.current.to_string(),
            }
        };
        self.error(kind)
    }

    fn error(&self, kind: ParseErrorKind) -> Error {
        ParseError::new(kind, self.current.span, self.current.line).into()
    }

    fn text(token: &Token<'src>) -> String {
        token.as_text().unwrap_or(token.text).to_owned()
    }

    // Grammar

    fn parse_element(&mut self) -> Result<Value, Error> {
        match self.current.kind {
            TokenKind::Lt => self.parse_tag().map(Value::Entity),
            TokenKind::LBracket => self.parse_list(),
            TokenKind::LBrace => self.parse_dict(),
            TokenKind::LParen => self.parse_set(),
            TokenKind::At => self.parse_link(),
            kind if kind.is_literal() => {
                let token = self.advance()?;
                Ok(literal(token))
            }
            TokenKind::Eof => Err(self.error(ParseErrorKind::UnexpectedEof)),
            _ => Err(self.error(ParseErrorKind::ExpectedValue {
                found: self.current.to_string(),
            })),
        }
    }

    fn parse_tag(&mut self) -> Result<Entity, Error> {
        self.expect(TokenKind::Lt, "'<'")?;
        let name_token = self.expect(TokenKind::Ident, "tag name")?;
        let name = Self::text(&name_token);
        trace!(name = %name, line = name_token.line, "open tag");
        let mut entity = Entity::new(name.clone());

        if self.at(TokenKind::Eq) {
            self.advance()?;
            let value = self.parse_attribute_value(&name)?;
            entity.set_attr(name.clone(), value);
        }

        while self.at(TokenKind::Ident) {
            let attr = Self::text(&self.advance()?);
            self.expect(TokenKind::Eq, "'=' after attribute name")?;
            let value = self.parse_attribute_value(&attr)?;
            entity.set_attr(attr, value);
        }

        match self.current.kind {
            TokenKind::Slash => {
                self.advance()?;
                self.expect(TokenKind::Gt, "'>' to close the tag")?;
            }
            TokenKind::Gt => {
                self.advance()?;
                self.parse_children(&mut entity)?;
            }
            _ => return Err(self.unexpected("attribute, '/>' or '>'")),
        }
        trace!(name = %name, children = entity.len(), "close tag");
        Ok(entity)
    }

    fn parse_attribute_value(&mut self, name: &str) -> Result<Value, Error> {
        self.slots.push(Slot::Attr(name.to_owned()));
        let value = self.parse_element();
        self.slots.pop();
        value
    }

    /// Children up to and including the closing tag.
    fn parse_children(&mut self, entity: &mut Entity) -> Result<(), Error> {
        loop {
            if self.at(TokenKind::Lt) && self.peek()?.kind == TokenKind::Slash {
                self.advance()?;
                self.advance()?;
                let close = self.expect(TokenKind::Ident, "closing tag name")?;
                let close_name = Self::text(&close);
                if close_name != entity.name() {
                    return Err(ParseError::new(
                        ParseErrorKind::MismatchedClosingTag {
                            open: entity.name().to_owned(),
                            close: close_name,
                        },
                        close.span,
                        close.line,
                    )
                    .into());
                }
                self.expect(TokenKind::Gt, "'>'")?;
                return Ok(());
            }
            self.slots.push(Slot::Index(entity.len()));
            let child = self.parse_element()?;
            self.slots.pop();
            entity.append(child);
        }
    }

    fn parse_list(&mut self) -> Result<Value, Error> {
        self.expect(TokenKind::LBracket, "'['")?;
        let mut items = Vec::new();
        while !self.at(TokenKind::RBracket) {
            self.slots.push(Slot::Index(items.len()));
            let item = self.parse_element()?;
            self.slots.pop();
            items.push(item);
        }
        self.advance()?;
        Ok(Value::List(items))
    }

    fn parse_dict(&mut self) -> Result<Value, Error> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut dict = Dict::new();
        while !self.at(TokenKind::RBrace) {
            let key = match (&self.current.kind, &self.current.value) {
                (TokenKind::Int, TokenValue::Int(n)) => Key::Int(*n),
                (TokenKind::Ident | TokenKind::String | TokenKind::RawString, _) => {
                    Key::String(Self::text(&self.current))
                }
                (TokenKind::Eof, _) => return Err(self.error(ParseErrorKind::UnexpectedEof)),
                _ => {
                    return Err(self.error(ParseErrorKind::InvalidDictKey {
                        found: self.current.to_string(),
                    }));
                }
            };
            self.advance()?;
            self.expect(TokenKind::Colon, "':' after dict key")?;
            self.slots.push(Slot::Key(key.clone()));
            let value = self.parse_element()?;
            self.slots.pop();
            dict.insert(key, value);
        }
        self.advance()?;
        Ok(Value::Dict(dict))
    }

    fn parse_set(&mut self) -> Result<Value, Error> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut set = Set::new();
        while !self.at(TokenKind::RParen) {
            let start = self.current.span;
            let line = self.current.line;
            // A link member takes the next id.
            self.slots.push(Slot::Member(self.next_link_id));
            let member = self.parse_element()?;
            self.slots.pop();
            if let Err(member) = set.insert(member) {
                return Err(ParseError::new(
                    ParseErrorKind::UnhashableSetMember(member.type_name()),
                    start.to(Span::empty(self.last_end)),
                    line,
                )
                .into());
            }
        }
        self.advance()?;
        Ok(Value::Set(set))
    }

    fn parse_link(&mut self) -> Result<Value, Error> {
        let at = self.expect(TokenKind::At, "'@'")?;
        let mut steps = Vec::new();
        loop {
            match self.current.kind {
                TokenKind::Gt => {
                    self.advance()?;
                    let name = self.link_ident(at.line, "tag name after '>'")?;
                    let index = if self.at(TokenKind::LBracket) {
                        Some(self.link_index(at.line)?)
                    } else {
                        None
                    };
                    steps.push(Step::Tag { name, index });
                }
                TokenKind::Dot => {
                    self.advance()?;
                    let name = self.link_ident(at.line, "attribute name after '.'")?;
                    steps.push(Step::Attr(name));
                }
                TokenKind::LBracket => {
                    let key = self.link_index(at.line)?;
                    steps.push(Step::Index(key));
                }
                TokenKind::Semi if !steps.is_empty() => break,
                _ if steps.is_empty() => {
                    return Err(self.malformed_link(at.line, "expected '>', '.' or '[' after '@'"));
                }
                _ => {
                    let msg = format!("expected ';' to end the link, found {}", self.current);
                    return Err(self.malformed_link(at.line, &msg));
                }
            }
        }
        let semi = self.advance()?;

        let link = SymbolicLink {
            id: self.next_link_id,
            steps,
            line: at.line,
        };
        self.next_link_id += 1;
        trace!(link = %link, line = link.line, "scheduled link");
        self.pending.push(PendingLink {
            link: link.clone(),
            span: at.span.to(semi.span),
            slots: self.slots.clone(),
        });
        Ok(Value::Link(link))
    }

    fn link_ident(&mut self, line: u32, expected: &str) -> Result<String, Error> {
        if !self.at(TokenKind::Ident) {
            let msg = format!("expected {expected}, found {}", self.current);
            return Err(self.malformed_link(line, &msg));
        }
        let token = self.advance()?;
        Ok(Self::text(&token))
    }

    /// `[ index ]`
    fn link_index(&mut self, line: u32) -> Result<Key, Error> {
        self.advance()?;
        let key = match (&self.current.kind, &self.current.value) {
            (TokenKind::Int, TokenValue::Int(n)) => Key::Int(*n),
            (TokenKind::Ident | TokenKind::String | TokenKind::RawString, _) => {
                Key::String(Self::text(&self.current))
            }
            _ => {
                let msg = format!(
                    "expected an identifier, integer or string index, found {}",
                    self.current
                );
                return Err(self.malformed_link(line, &msg));
            }
        };
        self.advance()?;
        if !self.at(TokenKind::RBracket) {
            let msg = format!("expected ']' after link index, found {}", self.current);
            return Err(self.malformed_link(line, &msg));
        }
        self.advance()?;
        Ok(key)
    }

    fn malformed_link(&self, line: u32, msg: &str) -> Error {
        LinkError::new(
            LinkErrorKind::MalformedSyntax(msg.to_owned()),
            self.current.span,
            line,
        )
        .into()
    }
}

fn literal(token: Token<'_>) -> Value {
    match (token.kind, token.value) {
        (TokenKind::Int, TokenValue::Int(n)) => Value::Int(n),
        (TokenKind::Float, TokenValue::Float(n)) => Value::Float(n),
        (TokenKind::Bool, TokenValue::Bool(b)) => Value::Bool(b),
        (TokenKind::String, TokenValue::Text(text)) => Value::String(text.into_owned()),
        (TokenKind::RawString, TokenValue::Text(text)) => Value::RawString(text.into_owned()),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests;
